//! Gateway adapting the trading platform HTTP client to the core traits.

use async_trait::async_trait;

use crate::activity::{ActivityLogEntry, ActivityUploaderTrait};
use crate::errors::Result;
use crate::preferences::{AccountType, Exchange};
use crate::trading::{
    AccountGatewayTrait, Balance, Order, Position, ScopeKey, Trade, TradingDataProviderTrait,
};
use tradepulse_trading_api::{
    ActivityUploadRequest, SwitchAccountTypeRequest, SwitchExchangeRequest, TradingApiClient,
};

/// Session-scoped gateway to the platform API.
///
/// Holds the access token for the logged-in user; token refresh happens
/// outside the engine and a new gateway is constructed on re-login.
pub struct ApiGateway {
    client: TradingApiClient,
    access_token: String,
}

impl ApiGateway {
    pub fn new(client: TradingApiClient, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl TradingDataProviderTrait for ApiGateway {
    async fn fetch_positions(&self, scope: &ScopeKey) -> Result<Vec<Position>> {
        let positions = self
            .client
            .get_positions(
                &self.access_token,
                scope.exchange.as_str(),
                scope.account_type.as_str(),
            )
            .await?;
        Ok(positions.into_iter().map(Position::from).collect())
    }

    async fn fetch_balance(&self, scope: &ScopeKey) -> Result<Balance> {
        let balance = self
            .client
            .get_balance(
                &self.access_token,
                scope.exchange.as_str(),
                scope.account_type.as_str(),
            )
            .await?;
        Ok(Balance::from(balance))
    }

    async fn fetch_orders(&self, scope: &ScopeKey) -> Result<Vec<Order>> {
        let orders = self
            .client
            .get_orders(
                &self.access_token,
                scope.exchange.as_str(),
                scope.account_type.as_str(),
            )
            .await?;
        Ok(orders.into_iter().map(Order::from).collect())
    }

    async fn fetch_trades(&self, scope: &ScopeKey) -> Result<Vec<Trade>> {
        let trades = self
            .client
            .get_trades(
                &self.access_token,
                scope.exchange.as_str(),
                scope.account_type.as_str(),
            )
            .await?;
        Ok(trades.into_iter().map(Trade::from).collect())
    }
}

#[async_trait]
impl AccountGatewayTrait for ApiGateway {
    async fn push_exchange(&self, exchange: Exchange) -> Result<()> {
        self.client
            .switch_exchange(
                &self.access_token,
                SwitchExchangeRequest {
                    exchange: exchange.as_str().to_string(),
                },
            )
            .await?;
        Ok(())
    }

    async fn push_account_type(&self, account_type: AccountType) -> Result<()> {
        self.client
            .switch_account_type(
                &self.access_token,
                SwitchAccountTypeRequest {
                    account_type: account_type.as_str().to_string(),
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityUploaderTrait for ApiGateway {
    async fn upload(&self, entry: &ActivityLogEntry) -> Result<()> {
        let request = ActivityUploadRequest {
            id: entry.id.clone(),
            action_type: entry.action_type.clone(),
            action_category: entry.action_category.as_str().to_string(),
            source: entry.source.as_str().to_string(),
            entity_type: entry.entity_type.clone(),
            old_value: entry.old_value.clone(),
            new_value: entry.new_value.clone(),
            timestamp: entry.timestamp,
        };
        self.client
            .upload_activity(&self.access_token, &request)
            .await?;
        Ok(())
    }
}
