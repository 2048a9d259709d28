//! Types for trading API requests and responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Trading Data
// ─────────────────────────────────────────────────────────────────────────────

/// An open position as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    /// Instrument symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Position side ("long" or "short")
    pub side: String,
    /// Position size in base units
    pub size: Decimal,
    /// Average entry price
    pub entry_price: Decimal,
    /// Current mark price
    pub mark_price: Decimal,
    /// Unrealized profit and loss
    pub unrealized_pnl: Decimal,
    /// Position leverage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<Decimal>,
}

/// Account balance as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDto {
    /// Total account equity
    pub total_equity: Decimal,
    /// Balance available for new orders
    pub available: Decimal,
    /// Unrealized profit and loss across open positions
    pub unrealized_pnl: Decimal,
    /// Settlement currency (e.g., "USDT")
    pub currency: String,
}

/// An open or historical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    /// Platform-assigned order ID
    pub order_id: String,
    /// Instrument symbol
    pub symbol: String,
    /// Order side ("buy" or "sell")
    pub side: String,
    /// Order type ("market" or "limit")
    pub order_type: String,
    /// Order quantity
    pub qty: Decimal,
    /// Limit price (absent for market orders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Order status (e.g., "new", "filled", "cancelled")
    pub status: String,
    /// When the order was created
    pub created_at: DateTime<Utc>,
}

/// An executed trade (fill).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDto {
    /// Platform-assigned trade ID
    pub trade_id: String,
    /// Order this fill belongs to
    pub order_id: String,
    /// Instrument symbol
    pub symbol: String,
    /// Trade side ("buy" or "sell")
    pub side: String,
    /// Filled quantity
    pub qty: Decimal,
    /// Fill price
    pub price: Decimal,
    /// Fee charged for the fill
    pub fee: Decimal,
    /// When the trade executed
    pub executed_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Request to switch the user's active exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchExchangeRequest {
    /// Exchange identifier ("bybit" or "hyperliquid")
    pub exchange: String,
}

/// Request to switch the user's active account type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchAccountTypeRequest {
    /// Account type identifier ("demo", "real", "testnet", "mainnet")
    pub account_type: String,
}

/// Request to upload one activity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUploadRequest {
    /// Client-generated entry ID (stable across retries)
    pub id: String,
    /// Action performed (e.g., "exchange_switch")
    pub action_type: String,
    /// Action category (e.g., "SETTINGS")
    pub action_category: String,
    /// Originating device/platform identifier
    pub source: String,
    /// Entity the action touched, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Value before the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    /// Value after the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// When the action happened on the device
    pub timestamp: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response Envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// Standard response envelope used by most endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body shape (enveloped or bare).
///
/// Endpoints are inconsistent: some wrap the payload in a `success` envelope,
/// others return the payload directly and signal failure via HTTP status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ResponseBody<T> {
    Enveloped(ApiEnvelope<T>),
    Bare(T),
}

/// Error body returned by some endpoints on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enveloped_body_deserializes() {
        let body: ResponseBody<BalanceDto> = serde_json::from_str(
            r#"{"success":true,"data":{"totalEquity":"1250.5","available":"1000","unrealizedPnl":"-12.25","currency":"USDT"}}"#,
        )
        .unwrap();

        match body {
            ResponseBody::Enveloped(envelope) => {
                assert!(envelope.success);
                let balance = envelope.data.unwrap();
                assert_eq!(balance.currency, "USDT");
            }
            ResponseBody::Bare(_) => panic!("Expected enveloped body"),
        }
    }

    #[test]
    fn test_bare_body_deserializes() {
        let body: ResponseBody<Vec<PositionDto>> = serde_json::from_str(
            r#"[{"symbol":"BTCUSDT","side":"long","size":"0.5","entryPrice":"64000","markPrice":"64100","unrealizedPnl":"50"}]"#,
        )
        .unwrap();

        match body {
            ResponseBody::Bare(positions) => {
                assert_eq!(positions.len(), 1);
                assert_eq!(positions[0].symbol, "BTCUSDT");
            }
            ResponseBody::Enveloped(_) => panic!("Expected bare body"),
        }
    }

    #[test]
    fn test_failure_envelope_deserializes() {
        let body: ResponseBody<BalanceDto> =
            serde_json::from_str(r#"{"success":false,"message":"account not found"}"#).unwrap();

        match body {
            ResponseBody::Enveloped(envelope) => {
                assert!(!envelope.success);
                assert!(envelope.data.is_none());
                assert_eq!(envelope.message.as_deref(), Some("account not found"));
            }
            ResponseBody::Bare(_) => panic!("Expected enveloped body"),
        }
    }
}
