//! Realtime channel event types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;
use crate::preferences::{AccountType, Exchange};
use crate::trading::Balance;

/// Originating device/platform of a broadcast.
///
/// Used for echo suppression: a device must ignore broadcasts whose source
/// names itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Android,
    Ios,
    Webapp,
    Telegram,
    Api,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Android => "android",
            Source::Ios => "ios",
            Source::Webapp => "webapp",
            Source::Telegram => "telegram",
            Source::Api => "api",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Source::Android),
            "ios" => Ok(Source::Ios),
            "webapp" => Ok(Source::Webapp),
            "telegram" => Ok(Source::Telegram),
            "api" => Ok(Source::Api),
            other => Err(Error::Validation(format!("Unknown source: {}", other))),
        }
    }
}

/// Events pushed over the realtime channel.
///
/// The wire envelope carries a discriminated `type` field that maps directly
/// onto these variants. Adding an event kind means adding a variant here;
/// the router matches exhaustively, so every consumer is checked at compile
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// A position changed upstream; the cached positions are stale.
    PositionUpdate,

    /// Authoritative balance push; applied to the cache without a fetch.
    BalanceUpdate { payload: Balance },

    /// Price tick, forwarded to the UI layer only.
    PriceUpdate { symbol: String, price: Decimal },

    /// Trading signal, forwarded to the notification subsystem.
    SignalReceived { payload: serde_json::Value },

    /// Another device changed a setting; recorded in the activity log.
    SettingsSync {
        source: Source,
        value: serde_json::Value,
    },

    /// Another device switched the active exchange.
    ExchangeSwitch { source: Source, exchange: Exchange },

    /// Another device switched the active account type.
    AccountSwitch {
        source: Source,
        account_type: AccountType,
    },

    /// The channel (re)connected; caches may have missed events.
    Connected,

    /// The channel dropped; reconnection is the transport's concern.
    Disconnected,

    /// Channel-level error, surfaced for observability.
    Error { message: String },
}

impl RealtimeEvent {
    /// The originating source for settings-mutating broadcasts.
    pub fn source(&self) -> Option<Source> {
        match self {
            RealtimeEvent::SettingsSync { source, .. }
            | RealtimeEvent::ExchangeSwitch { source, .. }
            | RealtimeEvent::AccountSwitch { source, .. } => Some(*source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_switch_serialization() {
        let event = RealtimeEvent::ExchangeSwitch {
            source: Source::Webapp,
            exchange: Exchange::Hyperliquid,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"exchange_switch\""));
        assert!(json.contains("\"source\":\"webapp\""));

        let parsed: RealtimeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_account_switch_deserializes_from_wire_envelope() {
        let parsed: RealtimeEvent = serde_json::from_str(
            r#"{"type":"account_switch","source":"telegram","account_type":"mainnet"}"#,
        )
        .unwrap();

        match parsed {
            RealtimeEvent::AccountSwitch {
                source,
                account_type,
            } => {
                assert_eq!(source, Source::Telegram);
                assert_eq!(account_type, AccountType::Mainnet);
            }
            other => panic!("Expected AccountSwitch, got {:?}", other),
        }
    }

    #[test]
    fn test_balance_update_carries_typed_payload() {
        let parsed: RealtimeEvent = serde_json::from_str(
            r#"{"type":"balance_update","payload":{"totalEquity":"1250.5","available":"1000","unrealizedPnl":"-12.25","currency":"USDT"}}"#,
        )
        .unwrap();

        match parsed {
            RealtimeEvent::BalanceUpdate { payload } => {
                assert_eq!(payload.currency, "USDT");
                assert_eq!(payload.total_equity.to_string(), "1250.5");
            }
            other => panic!("Expected BalanceUpdate, got {:?}", other),
        }
    }

    #[test]
    fn test_unit_variants_deserialize() {
        let connected: RealtimeEvent = serde_json::from_str(r#"{"type":"connected"}"#).unwrap();
        assert_eq!(connected, RealtimeEvent::Connected);

        let disconnected: RealtimeEvent =
            serde_json::from_str(r#"{"type":"disconnected"}"#).unwrap();
        assert_eq!(disconnected, RealtimeEvent::Disconnected);
    }

    #[test]
    fn test_source_accessor_covers_settings_variants() {
        let event = RealtimeEvent::SettingsSync {
            source: Source::Api,
            value: serde_json::json!({"theme": "dark"}),
        };
        assert_eq!(event.source(), Some(Source::Api));

        assert_eq!(RealtimeEvent::Connected.source(), None);
        assert_eq!(RealtimeEvent::PositionUpdate.source(), None);
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result: Result<RealtimeEvent, _> =
            serde_json::from_str(r#"{"type":"margin_call","source":"api"}"#);
        assert!(result.is_err());
    }
}
