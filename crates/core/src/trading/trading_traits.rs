//! Traits the sync engine fetches and pushes through.
//!
//! The coordinator and services depend on these seams rather than on the
//! HTTP client directly, so tests can substitute in-memory fakes.

use async_trait::async_trait;

use crate::errors::Result;
use crate::preferences::{AccountType, Exchange};
use crate::trading::{Balance, Order, Position, ScopeKey, Trade};

/// Scoped reads of trading data from the platform API.
#[async_trait]
pub trait TradingDataProviderTrait: Send + Sync {
    async fn fetch_positions(&self, scope: &ScopeKey) -> Result<Vec<Position>>;

    async fn fetch_balance(&self, scope: &ScopeKey) -> Result<Balance>;

    async fn fetch_orders(&self, scope: &ScopeKey) -> Result<Vec<Order>>;

    async fn fetch_trades(&self, scope: &ScopeKey) -> Result<Vec<Trade>>;
}

/// Writes that inform the server of record about account-level switches.
///
/// The server fans each switch out to the user's other devices over the
/// realtime channel.
#[async_trait]
pub trait AccountGatewayTrait: Send + Sync {
    async fn push_exchange(&self, exchange: Exchange) -> Result<()>;

    async fn push_account_type(&self, account_type: AccountType) -> Result<()>;
}
