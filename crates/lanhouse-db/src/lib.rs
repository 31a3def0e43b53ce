//! # lanhouse-db: Venue Persistence
//!
//! SQLite storage for the floor: rates, stations with their running
//! sessions, clients, the product catalog, sales and the cash drawer log.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lanhouse-core types ◄──── repositories ────► lanhouse.db               │
//! │                                                                         │
//! │  Database (pool.rs)        StationRepository   stations                 │
//! │    open + migrate          RateRepository      rate_tiers               │
//! │                            ClientRepository    clients                  │
//! │                            ProductRepository   products                 │
//! │                            SaleRepository      sales                    │
//! │                            CashFlowRepository  cash_flow                │
//! │                            FloorRepository     several, one transaction │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust,ignore
//! use lanhouse_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("lanhouse.db")).await?;
//! let stations = db.stations().list().await?;
//! ```

pub mod error;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cash_flow::CashFlowRepository;
pub use repository::client::ClientRepository;
pub use repository::floor::FloorRepository;
pub use repository::product::ProductRepository;
pub use repository::rate::RateRepository;
pub use repository::sale::SaleRepository;
pub use repository::station::StationRepository;
