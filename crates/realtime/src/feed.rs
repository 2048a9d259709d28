//! Realtime channel connection loop.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use tradepulse_core::events::RealtimeEvent;

/// Default initial reconnect backoff.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Default backoff ceiling.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Connection settings for the realtime channel.
#[derive(Debug, Clone)]
pub struct RealtimeChannelConfig {
    /// WebSocket endpoint (e.g., "wss://stream.tradepulse.app/ws")
    pub url: String,
    /// Bearer token presented on the handshake request
    pub access_token: String,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RealtimeChannelConfig {
    pub fn new(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: access_token.into(),
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

/// One logical connection per authenticated user.
pub struct RealtimeChannel;

impl RealtimeChannel {
    /// Spawn the connection task.
    ///
    /// Returns the event receiver (hand it to the session's event router)
    /// and the task handle (hand it to `SyncSession::adopt_task` so logout
    /// cancels the connection loop with the rest of the session).
    pub fn connect(
        config: RealtimeChannelConfig,
    ) -> (mpsc::UnboundedReceiver<RealtimeEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(config, tx));
        (rx, task)
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn run(config: RealtimeChannelConfig, tx: mpsc::UnboundedSender<RealtimeEvent>) {
    let mut backoff = config.initial_backoff;

    loop {
        if tx.is_closed() {
            break;
        }

        match open_connection(&config).await {
            Ok(stream) => {
                info!("Realtime channel connected to {}", config.url);
                backoff = config.initial_backoff;
                if tx.send(RealtimeEvent::Connected).is_err() {
                    break;
                }

                read_until_closed(stream, &tx).await;

                if tx.send(RealtimeEvent::Disconnected).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Realtime channel connect failed: {}", e);
                let report = tx.send(RealtimeEvent::Error {
                    message: format!("connect failed: {}", e),
                });
                if report.is_err() {
                    break;
                }
            }
        }

        debug!("Reconnecting realtime channel in {:?}", backoff);
        tokio::time::sleep(backoff).await;
        backoff = next_backoff(backoff, config.max_backoff);
    }

    info!("Realtime channel task stopped");
}

/// Errors raised while opening a connection. Internal: the run loop folds
/// them into `Error` events and keeps retrying.
#[derive(Debug, Error)]
enum ChannelError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid access token format")]
    InvalidToken,
}

async fn open_connection(config: &RealtimeChannelConfig) -> Result<WsStream, ChannelError> {
    let mut request = config.url.as_str().into_client_request()?;
    let auth_value = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
        .map_err(|_| ChannelError::InvalidToken)?;
    request.headers_mut().insert(AUTHORIZATION, auth_value);

    let (stream, _) = connect_async(request).await?;
    Ok(stream)
}

/// Pump frames until the server closes or the read errors.
async fn read_until_closed(stream: WsStream, tx: &mpsc::UnboundedSender<RealtimeEvent>) {
    let (mut write, mut read) = stream.split();

    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if tx.send(decode_frame(&text)).is_err() {
                    return;
                }
            }
            Ok(Message::Ping(payload)) => {
                if let Err(e) = write.send(Message::Pong(payload)).await {
                    warn!("Failed to answer ping: {}", e);
                    return;
                }
            }
            Ok(Message::Close(frame)) => {
                debug!("Realtime channel closed by server: {:?}", frame);
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Realtime channel read error: {}", e);
                return;
            }
        }
    }
}

/// Decode one wire envelope.
///
/// An undecodable frame becomes an `Error` event rather than being dropped,
/// so it still reaches observability downstream.
fn decode_frame(text: &str) -> RealtimeEvent {
    match serde_json::from_str::<RealtimeEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            warn!("Undecodable realtime frame: {} ({})", text, e);
            RealtimeEvent::Error {
                message: format!("undecodable frame: {}", e),
            }
        }
    }
}

fn next_backoff(current: Duration, max: Duration) -> Duration {
    (current * 2).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepulse_core::events::Source;
    use tradepulse_core::preferences::Exchange;

    #[test]
    fn test_decode_frame_maps_envelope_to_event() {
        let event =
            decode_frame(r#"{"type":"exchange_switch","source":"webapp","exchange":"hyperliquid"}"#);

        assert_eq!(
            event,
            RealtimeEvent::ExchangeSwitch {
                source: Source::Webapp,
                exchange: Exchange::Hyperliquid,
            }
        );
    }

    #[test]
    fn test_decode_frame_parses_price_ticks() {
        let event = decode_frame(r#"{"type":"price_update","symbol":"BTCUSDT","price":"64000.5"}"#);

        match event {
            RealtimeEvent::PriceUpdate { symbol, price } => {
                assert_eq!(symbol, "BTCUSDT");
                assert_eq!(price.to_string(), "64000.5");
            }
            other => panic!("Expected PriceUpdate, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_surfaces_unknown_types_as_error() {
        let event = decode_frame(r#"{"type":"margin_call"}"#);
        match event {
            RealtimeEvent::Error { message } => {
                assert!(message.contains("undecodable frame"));
            }
            other => panic!("Expected Error event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_surfaces_malformed_json_as_error() {
        let event = decode_frame("not json at all");
        assert!(matches!(event, RealtimeEvent::Error { .. }));
    }

    #[test]
    fn test_backoff_doubles_up_to_the_ceiling() {
        let max = Duration::from_secs(30);
        let mut backoff = Duration::from_secs(1);

        backoff = next_backoff(backoff, max);
        assert_eq!(backoff, Duration::from_secs(2));
        backoff = next_backoff(backoff, max);
        assert_eq!(backoff, Duration::from_secs(4));

        for _ in 0..10 {
            backoff = next_backoff(backoff, max);
        }
        assert_eq!(backoff, max);
    }
}
