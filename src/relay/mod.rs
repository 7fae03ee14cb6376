//! Participant connections
//!
//! - `messages` - JSON wire format in both directions
//! - `connection` - connection ids, outbound handles and per-connection context
//! - `router` - dispatches inbound messages into sessions
//! - `reconciler` - cleanup when a connection drops
//! - `socket` - the WebSocket read/write loop

pub mod connection;
pub mod messages;
pub mod reconciler;
pub mod router;
pub mod socket;

pub use connection::{ConnectionContext, ConnectionHandle, ConnectionId};
pub use messages::{Action, InboundMessage, OutboundMessage};
pub use reconciler::DisconnectReconciler;
pub use router::ConnectionRouter;
pub use socket::run_connection;
