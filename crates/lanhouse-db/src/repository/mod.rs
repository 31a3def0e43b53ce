//! # Repository Module
//!
//! Database repository implementations for lanhouse.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Console command                                                       │
//! │       │                                                                 │
//! │       │  db.stations().get("PC-01")                                    │
//! │       ▼                                                                 │
//! │  StationRepository                                                     │
//! │  ├── list(&self)                                                       │
//! │  ├── get(&self, id)                                                    │
//! │  ├── insert(&self, station)                                            │
//! │  └── save(&self, station)                                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Writes that must land together (checkout) go through                  │
//! │  FloorRepository, which reuses the same statements inside one          │
//! │  transaction.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`station::StationRepository`] - Station rows and session state
//! - [`rate::RateRepository`] - Rate types and their tiers
//! - [`client::ClientRepository`] - Clients and point balances
//! - [`product::ProductRepository`] - Catalog and stock
//! - [`sale::SaleRepository`] - Append-only sale records
//! - [`cash_flow::CashFlowRepository`] - Append-only drawer ledger
//! - [`floor::FloorRepository`] - Transactional session start and checkout

pub mod cash_flow;
pub mod client;
pub mod floor;
pub mod product;
pub mod rate;
pub mod sale;
pub mod station;
