//! TradePulse Trading API - REST client for the trading platform backend.
//!
//! This crate provides the typed HTTP client used by the sync engine to fetch
//! account data (positions, balance, orders, trades), push account switches,
//! and upload activity records.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tradepulse_trading_api::TradingApiClient;
//!
//! let client = TradingApiClient::new("https://api.tradepulse.app");
//! let positions = client
//!     .get_positions("access_token", "bybit", "demo")
//!     .await?;
//! ```

mod client;
mod error;
mod types;

pub use client::TradingApiClient;
pub use error::{ApiError, Result};
pub use types::*;
