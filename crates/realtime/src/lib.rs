//! TradePulse Realtime - WebSocket transport for the sync engine.
//!
//! Maintains one persistent connection per logged-in session, decodes wire
//! envelopes into [`RealtimeEvent`]s, and forwards them into the channel the
//! core event router consumes. Reconnection with capped backoff lives here;
//! the router only ever sees `Connected`/`Disconnected` markers and heals by
//! resyncing, not by replaying.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tradepulse_realtime::{RealtimeChannel, RealtimeChannelConfig};
//!
//! let (events, task) = RealtimeChannel::connect(RealtimeChannelConfig::new(
//!     "wss://stream.tradepulse.app/ws",
//!     "access_token",
//! ));
//! let session = SyncSession::start(user_id, source, config, handles, events);
//! session.adopt_task(task);
//! ```

mod feed;

pub use feed::{RealtimeChannel, RealtimeChannelConfig};

pub use tradepulse_core::events::RealtimeEvent;
