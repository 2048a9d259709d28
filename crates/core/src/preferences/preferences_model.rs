//! Preference domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_LANGUAGE;
use crate::errors::Error;

/// Supported exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    #[default]
    Bybit,
    Hyperliquid,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Bybit => "bybit",
            Exchange::Hyperliquid => "hyperliquid",
        }
    }

    /// Account types that are valid on this exchange.
    pub fn valid_account_types(&self) -> &'static [AccountType] {
        match self {
            Exchange::Bybit => &[AccountType::Demo, AccountType::Real],
            Exchange::Hyperliquid => &[AccountType::Testnet, AccountType::Mainnet],
        }
    }

    /// The account type a device falls back to when switching to this
    /// exchange with an account type the exchange does not support.
    pub fn default_account_type(&self) -> AccountType {
        match self {
            Exchange::Bybit => AccountType::Demo,
            Exchange::Hyperliquid => AccountType::Testnet,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bybit" => Ok(Exchange::Bybit),
            "hyperliquid" => Ok(Exchange::Hyperliquid),
            other => Err(Error::Validation(format!("Unknown exchange: {}", other))),
        }
    }
}

/// Account types across all supported exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Demo,
    Real,
    Testnet,
    Mainnet,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Demo => "demo",
            AccountType::Real => "real",
            AccountType::Testnet => "testnet",
            AccountType::Mainnet => "mainnet",
        }
    }

    /// Whether this account type is a member of the exchange's valid set.
    pub fn is_valid_for(&self, exchange: Exchange) -> bool {
        exchange.valid_account_types().contains(self)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "demo" => Ok(AccountType::Demo),
            "real" => Ok(AccountType::Real),
            "testnet" => Ok(AccountType::Testnet),
            "mainnet" => Ok(AccountType::Mainnet),
            other => Err(Error::Validation(format!("Unknown account type: {}", other))),
        }
    }
}

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "system" => Ok(Theme::System),
            other => Err(Error::Validation(format!("Unknown theme: {}", other))),
        }
    }
}

/// The user's last-known settings on this device.
///
/// One snapshot exists per logged-in user per device. It is read at startup,
/// mutated by local user actions or accepted remote broadcasts, and persisted
/// on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSnapshot {
    pub exchange: Exchange,
    pub account_type: AccountType,
    pub language: String,
    pub theme: Theme,
}

impl Default for PreferenceSnapshot {
    fn default() -> Self {
        Self {
            exchange: Exchange::default(),
            account_type: Exchange::default().default_account_type(),
            language: DEFAULT_LANGUAGE.to_string(),
            theme: Theme::default(),
        }
    }
}

impl PreferenceSnapshot {
    /// Whether the account type is valid for the current exchange.
    pub fn is_consistent(&self) -> bool {
        self.account_type.is_valid_for(self.exchange)
    }

    /// Switch to a new exchange, resetting the account type to the new
    /// exchange's default if the current one is invalid there.
    ///
    /// Returns `true` if the account type had to be reset.
    pub fn switch_exchange(&mut self, exchange: Exchange) -> bool {
        self.exchange = exchange;
        if !self.account_type.is_valid_for(exchange) {
            self.account_type = exchange.default_account_type();
            return true;
        }
        false
    }

    /// Switch the account type. An account type invalid for the current
    /// exchange is corrected to the exchange default; the correction is
    /// local and never surfaced as an error.
    ///
    /// Returns `true` if the requested type was accepted as-is.
    pub fn switch_account_type(&mut self, account_type: AccountType) -> bool {
        if account_type.is_valid_for(self.exchange) {
            self.account_type = account_type;
            true
        } else {
            self.account_type = self.exchange.default_account_type();
            false
        }
    }
}
