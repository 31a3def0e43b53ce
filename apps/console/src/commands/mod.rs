//! # Console Commands Module
//!
//! One module per command family.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (Report trait, shared formatting)
//! ├── station.rs  ◄─── stations, start, add-item, checkout
//! ├── drawer.rs   ◄─── drawer open | movement | status | close
//! ├── client.rs   ◄─── clients
//! └── watch.rs    ◄─── watch loop + expiry bell
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  lanhouse start PC-03 --fixed 60                                        │
//! │         │                                                               │
//! │         │ (clap)                                                        │
//! │         ▼                                                               │
//! │  station::start(&mut FloorState, &StartArgs, now)                       │
//! │         │                                                               │
//! │         │ Result<SessionStarted, CliError>                              │
//! │         ▼                                                               │
//! │  Report::render (text)  or  serde_json (--json)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands never print; they return a report so tests can inspect it.

pub mod client;
pub mod drawer;
pub mod station;
pub mod watch;

use serde::Serialize;

use crate::state::ConfigState;

/// Output of a command, printable as text or JSON.
pub trait Report: Serialize {
    fn render(&self, config: &ConfigState) -> String;
}

/// `HH:MM:SS`; hours grow past 99 rather than wrap.
pub fn clock_face(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
