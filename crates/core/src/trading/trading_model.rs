//! Trading domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::preferences::{AccountType, Exchange};
use tradepulse_trading_api::{BalanceDto, OrderDto, PositionDto, TradeDto};

/// Identifies which account's data a cache entry or API request refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeKey {
    pub user_id: String,
    pub exchange: Exchange,
    pub account_type: AccountType,
}

impl ScopeKey {
    pub fn new(user_id: impl Into<String>, exchange: Exchange, account_type: AccountType) -> Self {
        Self {
            user_id: user_id.into(),
            exchange,
            account_type,
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.user_id, self.exchange, self.account_type
        )
    }
}

/// An open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    /// "long" or "short" as reported by the platform
    pub side: String,
    pub size: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealized_pnl: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<Decimal>,
}

impl From<PositionDto> for Position {
    fn from(dto: PositionDto) -> Self {
        Self {
            symbol: dto.symbol,
            side: dto.side,
            size: dto.size,
            entry_price: dto.entry_price,
            mark_price: dto.mark_price,
            unrealized_pnl: dto.unrealized_pnl,
            leverage: dto.leverage,
        }
    }
}

/// Account balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub total_equity: Decimal,
    pub available: Decimal,
    pub unrealized_pnl: Decimal,
    pub currency: String,
}

impl From<BalanceDto> for Balance {
    fn from(dto: BalanceDto) -> Self {
        Self {
            total_equity: dto.total_equity,
            available: dto.available,
            unrealized_pnl: dto.unrealized_pnl,
            currency: dto.currency,
        }
    }
}

/// An open or historical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    /// "buy" or "sell" as reported by the platform
    pub side: String,
    /// "market" or "limit" as reported by the platform
    pub order_type: String,
    pub qty: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<OrderDto> for Order {
    fn from(dto: OrderDto) -> Self {
        Self {
            order_id: dto.order_id,
            symbol: dto.symbol,
            side: dto.side,
            order_type: dto.order_type,
            qty: dto.qty,
            price: dto.price,
            status: dto.status,
            created_at: dto.created_at,
        }
    }
}

/// An executed trade (fill).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub trade_id: String,
    pub order_id: String,
    pub symbol: String,
    pub side: String,
    pub qty: Decimal,
    pub price: Decimal,
    pub fee: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl From<TradeDto> for Trade {
    fn from(dto: TradeDto) -> Self {
        Self {
            trade_id: dto.trade_id,
            order_id: dto.order_id,
            symbol: dto.symbol,
            side: dto.side,
            qty: dto.qty,
            price: dto.price,
            fee: dto.fee,
            executed_at: dto.executed_at,
        }
    }
}
