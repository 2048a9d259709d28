//! Trading API client for communicating with the TradePulse platform backend.
//!
//! All trading-data reads are scoped by `exchange` and `account_type` query
//! parameters. Failures arrive either as a non-2xx status or as a 2xx body
//! with `success: false`; both are mapped to [`ApiError`].

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::types::*;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the TradePulse trading platform REST API.
#[derive(Debug, Clone)]
pub struct TradingApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl TradingApiClient {
    /// Create a new trading API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the platform API (e.g., "https://api.tradepulse.app")
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create headers for an API request.
    fn headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Map a non-2xx response body to an error, preferring the structured
    /// error shape some endpoints return.
    fn error_from_status(status: reqwest::StatusCode, body: &str) -> ApiError {
        if let Ok(error) = serde_json::from_str::<ApiErrorBody>(body) {
            let message = match error.code {
                Some(code) => format!("{}: {}", code, error.message),
                None => error.message,
            };
            return ApiError::api(status.as_u16(), message);
        }
        ApiError::api(status.as_u16(), format!("Request failed: {}", body))
    }

    /// Parse a JSON response body, handling both failure conventions.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            return Err(Self::error_from_status(status, &body));
        }

        let parsed: ResponseBody<T> = serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            ApiError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })?;

        match parsed {
            ResponseBody::Bare(value) => Ok(value),
            ResponseBody::Enveloped(envelope) => {
                if !envelope.success {
                    return Err(ApiError::rejected(
                        envelope
                            .message
                            .unwrap_or_else(|| "request unsuccessful".to_string()),
                    ));
                }
                envelope.data.ok_or(ApiError::MissingData)
            }
        }
    }

    /// Parse a response where only the acknowledgment matters.
    ///
    /// Ack endpoints are the least consistent: some return an empty body,
    /// some an envelope without data. A 2xx status is the acknowledgment
    /// unless an envelope explicitly says `success: false`.
    async fn parse_ack(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            return Err(Self::error_from_status(status, &body));
        }

        match serde_json::from_str::<ResponseBody<serde_json::Value>>(&body) {
            Ok(ResponseBody::Enveloped(envelope)) if !envelope.success => {
                Err(ApiError::rejected(
                    envelope
                        .message
                        .unwrap_or_else(|| "request unsuccessful".to_string()),
                ))
            }
            _ => Ok(()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Trading Data
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch open positions for the scoped account.
    ///
    /// GET /trading/positions?exchange=..&account_type=..
    pub async fn get_positions(
        &self,
        token: &str,
        exchange: &str,
        account_type: &str,
    ) -> Result<Vec<PositionDto>> {
        let url = format!("{}/trading/positions", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("exchange", exchange), ("account_type", account_type)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the account balance for the scoped account.
    ///
    /// GET /trading/balance?exchange=..&account_type=..
    pub async fn get_balance(
        &self,
        token: &str,
        exchange: &str,
        account_type: &str,
    ) -> Result<BalanceDto> {
        let url = format!("{}/trading/balance", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("exchange", exchange), ("account_type", account_type)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch open and recent orders for the scoped account.
    ///
    /// GET /trading/orders?exchange=..&account_type=..
    pub async fn get_orders(
        &self,
        token: &str,
        exchange: &str,
        account_type: &str,
    ) -> Result<Vec<OrderDto>> {
        let url = format!("{}/trading/orders", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("exchange", exchange), ("account_type", account_type)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch recent trades for the scoped account.
    ///
    /// GET /trading/trades?exchange=..&account_type=..
    pub async fn get_trades(
        &self,
        token: &str,
        exchange: &str,
        account_type: &str,
    ) -> Result<Vec<TradeDto>> {
        let url = format!("{}/trading/trades", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("exchange", exchange), ("account_type", account_type)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Account Settings
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the user's exchange switch with the server of record.
    ///
    /// The server broadcasts the switch to the user's other devices over the
    /// realtime channel.
    ///
    /// POST /users/exchange
    pub async fn switch_exchange(&self, token: &str, req: SwitchExchangeRequest) -> Result<()> {
        let url = format!("{}/users/exchange", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(&req)
            .send()
            .await?;

        Self::parse_ack(response).await
    }

    /// Record the user's account-type switch with the server of record.
    ///
    /// POST /users/switch-account-type
    pub async fn switch_account_type(
        &self,
        token: &str,
        req: SwitchAccountTypeRequest,
    ) -> Result<()> {
        let url = format!("{}/users/switch-account-type", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(&req)
            .send()
            .await?;

        Self::parse_ack(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activity
    // ─────────────────────────────────────────────────────────────────────────

    /// Upload one activity record.
    ///
    /// POST /activity
    pub async fn upload_activity(&self, token: &str, req: &ActivityUploadRequest) -> Result<()> {
        let url = format!("{}/activity", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(req)
            .send()
            .await?;

        Self::parse_ack(response).await
    }
}
