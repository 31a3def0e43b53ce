//! # Configuration State
//!
//! Venue settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line (`--db` only)
//! 2. Environment variables (`LANHOUSE_*`)
//! 3. Defaults (this file)
//!
//! ## Environment Variables
//! ```text
//! LANHOUSE_DB_PATH               database file
//! LANHOUSE_VENUE_NAME            header on listings
//! LANHOUSE_UTC_OFFSET_MINUTES    drawer calendar day, e.g. -180
//! LANHOUSE_CARD_COMMISSION_BPS   card/wallet fee, 418 = 4.18%
//! LANHOUSE_TICK_MILLIS           watch loop period
//! LANHOUSE_SOUND                 ring the bell on expiry (true/false)
//! ```
//!
//! Configuration is read-only after initialization.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use serde::Serialize;
use thiserror::Error;

use lanhouse_core::CommissionRate;

/// Largest offset chrono accepts, in minutes (just under a day).
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// 100%: an absorbed commission can never exceed the sale.
const MAX_COMMISSION_BPS: u32 = 10_000;

/// Configuration error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Console configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Venue name (listing header)
    pub venue_name: String,

    /// Offset used to decide which calendar day a drawer entry belongs to.
    pub utc_offset_minutes: i32,

    /// Processor fee on card and wallet payments, in basis points.
    pub card_commission_bps: u32,

    /// Watch loop period.
    pub tick_millis: u64,

    /// Ring the terminal bell when a countdown expires.
    pub sound_enabled: bool,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Database: platform data dir, `lanhouse.db`
    /// - Offset: UTC
    /// - Commission: 4.18%
    /// - Tick: 1 second
    /// - Sound: enabled
    fn default() -> Self {
        ConfigState {
            db_path: default_db_path(),
            venue_name: "Lanhouse".to_string(),
            utc_offset_minutes: 0,
            card_commission_bps: CommissionRate::CARD.bps(),
            tick_millis: 1000,
            sound_enabled: true,
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
        }
    }
}

impl ConfigState {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from any key/value source.
    ///
    /// Unset keys keep their default; set keys must parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ConfigState::default();

        if let Some(path) = lookup("LANHOUSE_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(name) = lookup("LANHOUSE_VENUE_NAME") {
            config.venue_name = name;
        }

        if let Some(raw) = lookup("LANHOUSE_UTC_OFFSET_MINUTES") {
            let minutes: i32 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("LANHOUSE_UTC_OFFSET_MINUTES", &raw))?;
            if minutes.abs() > MAX_OFFSET_MINUTES {
                return Err(ConfigError::invalid("LANHOUSE_UTC_OFFSET_MINUTES", &raw));
            }
            config.utc_offset_minutes = minutes;
        }

        if let Some(raw) = lookup("LANHOUSE_CARD_COMMISSION_BPS") {
            let bps: u32 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("LANHOUSE_CARD_COMMISSION_BPS", &raw))?;
            if bps > MAX_COMMISSION_BPS {
                return Err(ConfigError::invalid("LANHOUSE_CARD_COMMISSION_BPS", &raw));
            }
            config.card_commission_bps = bps;
        }

        if let Some(raw) = lookup("LANHOUSE_TICK_MILLIS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("LANHOUSE_TICK_MILLIS", &raw))?;
            if millis == 0 {
                return Err(ConfigError::invalid("LANHOUSE_TICK_MILLIS", &raw));
            }
            config.tick_millis = millis;
        }

        if let Some(raw) = lookup("LANHOUSE_SOUND") {
            config.sound_enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(ConfigError::invalid("LANHOUSE_SOUND", &raw)),
            };
        }

        Ok(config)
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn commission_rate(&self) -> CommissionRate {
        CommissionRate::from_bps(self.card_commission_bps)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

/// Platform data directory, falling back to the working directory.
///
/// - **macOS**: `~/Library/Application Support/com.lanhouse.console/lanhouse.db`
/// - **Windows**: `%APPDATA%\lanhouse\console\data\lanhouse.db`
/// - **Linux**: `~/.local/share/console/lanhouse.db`
fn default_db_path() -> PathBuf {
    ProjectDirs::from("com", "lanhouse", "console")
        .map(|dirs| dirs.data_dir().join("lanhouse.db"))
        .unwrap_or_else(|| PathBuf::from("lanhouse.db"))
}
