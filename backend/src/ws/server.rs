//! WebSocket endpoint for market summary subscribers.
//!
//! Each connection registers a [`ChannelSubscriber`] with the notifier and
//! gets a writer task that drains it into the socket. The read half answers
//! explicit client requests. The subscriber is disconnected when the client
//! closes, the socket errors or the server shuts down.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{Instrument, debug, info, warn};

use common::logger::{TraceId, root_span};
use scheduler::CancellationToken;
use session::{ChannelSubscriber, Payload, SubscriberId};

use crate::app::App;
use crate::error::AppError;
use crate::ws::action::{Action, decode_action};

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, AppError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })
}

/// Accepts connections until `cancel` fires.
pub async fn serve(listener: TcpListener, app: Arc<App>, cancel: CancellationToken) -> anyhow::Result<()> {
    info!(addr = ?listener.local_addr().ok(), "market summary endpoint listening");

    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            },
        };

        let app = Arc::clone(&app);
        let cancel = cancel.clone();
        let span = root_span("ws_connection", &TraceId::default());
        tokio::spawn(
            async move {
                if let Err(e) = handle_connection(stream, peer, app, cancel).await {
                    warn!(error = ?e, %peer, "websocket connection ended with error");
                }
            }
            .instrument(span),
        );
    }

    info!("market summary endpoint stopped");
    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    app: Arc<App>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let ws = accept_async(stream)
        .await
        .with_context(|| format!("websocket handshake with {peer} failed"))?;
    let (mut write, mut read) = ws.split();

    let (subscriber, mut outbound) = ChannelSubscriber::new(app.config.subscriber_queue_capacity);
    let id = app.notifier.connect(subscriber.clone());
    tracing::Span::current().record("subscriber_id", tracing::field::display(id));
    info!(%peer, "subscriber session opened");

    let writer = tokio::spawn(
        async move {
            while let Some(payload) = outbound.recv().await {
                let msg = match payload {
                    Payload::Text(text) => Message::Text(text.to_string().into()),
                    Payload::Binary(bytes) => Message::Binary(bytes.to_vec().into()),
                };
                if let Err(e) = write.send(msg).await {
                    warn!(error = %e, "websocket write failed");
                    break;
                }
            }
            if let Err(e) = write.close().await {
                debug!(error = %e, "websocket close failed");
            }
        }
        .in_current_span(),
    );

    let read_result = loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            next = read.next() => next,
        };

        match next {
            Some(Ok(Message::Text(text))) => handle_action(&app, id, text.as_str()).await,
            Some(Ok(Message::Close(_))) | None => break Ok(()),
            Some(Ok(_)) => {}
            Some(Err(e)) => break Err(e),
        }
    };

    // Removal only happens here, on an explicit disconnect.
    subscriber.close();
    app.notifier.disconnect(id);
    drop(subscriber);

    // Every sender is gone now, so the writer drains and closes the socket.
    if let Err(e) = writer.await {
        warn!(error = %e, "writer task failed");
    }

    info!(%peer, "subscriber session closed");
    read_result.context("websocket read failed")
}

async fn handle_action(app: &App, id: SubscriberId, text: &str) {
    let action = match decode_action(text) {
        Ok(a) => a,
        Err(e) => {
            debug!(error = %e, "ignoring unrecognised client message");
            return;
        }
    };
    debug!(?action, "client action received");

    let sent = match action {
        Action::UpdateMarketSummary => match app.refresher.market_summary().await {
            Some(summary) => app.notifier.send_summary_to(id, &summary),
            None => {
                debug!("no market summary available yet");
                return;
            }
        },
        Action::UpdateRecentQuotePriceChange => {
            let recent = app.feed.recent();
            if recent.is_empty() {
                return;
            }
            app.notifier.send_quote_changes_to(id, &recent)
        }
    };

    if let Err(e) = sent {
        warn!(error = %e, ?action, "reply to subscriber failed");
    }
}
