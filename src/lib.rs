pub mod config;
pub mod error;
pub mod http;
pub mod recording;
pub mod relay;
pub mod session;

pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use http::{create_router, AppState};
pub use recording::{SinkState, StreamManager, WriteOutcome};
pub use relay::{
    ConnectionContext, ConnectionHandle, ConnectionId, ConnectionRouter, DisconnectReconciler,
    InboundMessage, OutboundMessage,
};
pub use session::{Role, Session, SessionRegistry, SessionSnapshot, SessionState};
