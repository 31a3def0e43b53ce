//! # State Module
//!
//! Console state, split by concern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────┐   ┌──────────────────────────┐    │
//! │  │   FloorState                     │   │   ConfigState            │    │
//! │  │                                  │   │                          │    │
//! │  │  Database (SQLite pool)          │   │  db_path                 │    │
//! │  │  Venue (stations + rates)        │   │  utc_offset_minutes      │    │
//! │  │  ClientBook / StockBook          │   │  card_commission_bps     │    │
//! │  │  CashDrawer                      │   │  tick_millis, sound      │    │
//! │  └──────────────────────────────────┘   └──────────────────────────┘    │
//! │                                                                         │
//! │  • FloorState: mutated through &mut, one command at a time             │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod floor;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{ConfigError, ConfigState};
pub use floor::FloorState;
