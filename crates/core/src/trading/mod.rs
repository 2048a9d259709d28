pub mod client;
pub mod trading_model;
pub mod trading_traits;

pub use client::ApiGateway;
pub use trading_model::*;
pub use trading_traits::{AccountGatewayTrait, TradingDataProviderTrait};
