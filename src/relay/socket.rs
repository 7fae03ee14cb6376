use super::connection::{ConnectionContext, ConnectionHandle};
use super::messages::OutboundMessage;
use super::reconciler::DisconnectReconciler;
use super::router::ConnectionRouter;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

/// Drive one WebSocket connection until it closes, then reconcile.
///
/// Inbound frames are handled one at a time, so every sink write from this
/// connection is serialized. Outbound notifications go through a queue
/// drained by a separate writer task.
pub async fn run_connection(
    socket: WebSocket,
    router: ConnectionRouter,
    reconciler: DisconnectReconciler,
    send_queue: usize,
) {
    let (handle, mut outbound_rx) = ConnectionHandle::channel(send_queue);
    let mut ctx = ConnectionContext::new(handle);
    info!("Client connected: {}", ctx.id());

    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => router.handle_text(&mut ctx, &text).await,
            Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                Ok(text) => router.handle_text(&mut ctx, text).await,
                Err(_) => {
                    ctx.handle()
                        .send(&OutboundMessage::error("Invalid message: binary frame is not UTF-8"));
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // Ping/Pong handled by axum
            Err(e) => {
                debug!("Connection {} errored: {}", ctx.id(), e);
                break;
            }
        }
    }

    info!("Client disconnected: {}", ctx.id());
    reconciler.reconcile(&ctx).await;

    writer.abort();
}
