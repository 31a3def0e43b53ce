//! # Watch Command
//!
//! Drives the floor's tick from a `tokio::time::interval` until ctrl-c.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  interval (LANHOUSE_TICK_MILLIS) ──► FloorState::tick_all(now)          │
//! │                                         │                               │
//! │                                         ├──► board line on stdout       │
//! │                                         └──► BellNotifier (once per     │
//! │                                              expired countdown)         │
//! │  ctrl-c ──► stop                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Missed ticks are skipped, not replayed: every tick recomputes from the
//! clock, so nothing is lost.

use std::io::Write;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::commands::clock_face;
use crate::error::CliResult;
use crate::state::{ConfigState, FloorState};
use lanhouse_core::{Clock, ExpiryAlert, ExpiryNotifier, SessionSnapshot};

const BELL: &[u8] = b"\x07";

/// Rings the terminal bell and logs a warning when a countdown expires.
pub struct BellNotifier<W: Write> {
    out: W,
    sound: bool,
}

impl<W: Write> BellNotifier<W> {
    pub fn new(out: W, sound: bool) -> Self {
        BellNotifier { out, sound }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ExpiryNotifier for BellNotifier<W> {
    fn notify(&mut self, alert: &ExpiryAlert) {
        warn!(station = %alert.station_id, at = %alert.at, "Time is up on {}", alert.station_name);

        let mut line = Vec::new();
        if self.sound {
            line.extend_from_slice(BELL);
        }
        line.extend_from_slice(format!("TIME UP: {}\n", alert.station_name).as_bytes());

        if let Err(e) = self.out.write_all(&line).and_then(|_| self.out.flush()) {
            warn!("Could not write expiry alert: {}", e);
        }
    }
}

/// One compact line for the whole floor.
pub fn board_line(snapshots: &[SessionSnapshot], config: &ConfigState) -> String {
    if snapshots.is_empty() {
        return "all stations free".to_string();
    }

    snapshots
        .iter()
        .map(|s| {
            format!(
                "{} {}{} {}",
                s.station_id,
                if s.remaining_secs.is_some() { "▼" } else { "▲" },
                clock_face(s.display_secs()),
                config.format_currency(s.total_cents)
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub async fn run(floor: &mut FloorState, config: &ConfigState, clock: &dyn Clock) -> CliResult<()> {
    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut bell = BellNotifier::new(std::io::stderr(), config.sound_enabled);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(tick_ms = config.tick_millis, "Watching floor, ctrl-c to stop");

    loop {
        tokio::select! {
            res = &mut shutdown => {
                res?;
                info!("Watch stopped");
                break;
            }
            _ = ticker.tick() => {
                let snapshots = floor.tick_all(clock.now(), &mut bell).await?;
                let mut stdout = std::io::stdout();
                write!(stdout, "\r\x1b[2K{}", board_line(&snapshots, config))?;
                stdout.flush()?;
            }
        }
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::{config, seeded_floor, t0};
    use chrono::TimeDelta;
    use lanhouse_core::{ManualClock, SessionRequest};

    #[tokio::test]
    async fn test_bell_rings_once_per_expiry() {
        let mut floor = seeded_floor().await;
        floor
            .start_session("PC-01", None, SessionRequest::Fixed { minutes: 30 }, t0())
            .await
            .unwrap();
        floor
            .start_session("XB-01", None, SessionRequest::Free, t0())
            .await
            .unwrap();

        let clock = ManualClock::new(t0());
        let mut bell = BellNotifier::new(Vec::new(), true);

        for _ in 0..40 {
            clock.advance(TimeDelta::minutes(1));
            floor.tick_all(clock.now(), &mut bell).await.unwrap();
        }

        let out = String::from_utf8(bell.into_inner()).unwrap();
        assert_eq!(out, "\x07TIME UP: PC 01\n");
    }

    #[tokio::test]
    async fn test_silent_bell_still_prints() {
        let mut bell = BellNotifier::new(Vec::new(), false);
        bell.notify(&ExpiryAlert {
            station_id: "XB-01".to_string(),
            station_name: "Console 1".to_string(),
            at: t0(),
        });
        assert_eq!(bell.into_inner(), b"TIME UP: Console 1\n");
    }

    #[tokio::test]
    async fn test_board_line() {
        let mut floor = seeded_floor().await;
        assert_eq!(board_line(&[], &config()), "all stations free");

        floor
            .start_session("PC-01", None, SessionRequest::Fixed { minutes: 60 }, t0())
            .await
            .unwrap();
        let mut bell = BellNotifier::new(Vec::new(), false);
        let snapshots = floor
            .tick_all(t0() + TimeDelta::minutes(15), &mut bell)
            .await
            .unwrap();

        assert_eq!(board_line(&snapshots, &config()), "PC-01 ▼00:45:00 $15.00");
    }
}
