//! # Drawer Commands
//!
//! ```text
//! drawer open 500            Opening   +$500.00
//! drawer movement income ..  Income    (manual)
//! drawer movement outcome .. Outcome   (manual)
//! drawer status              opening / income / outcome / balance
//! drawer close               expected balance only
//! drawer close --counted 640 Closing   counted vs expected
//! ```

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::DrawerAction;
use crate::commands::Report;
use crate::error::CliResult;
use crate::state::{ConfigState, FloorState};
use lanhouse_core::{CashFlowEntry, CashFlowKind, DrawerSummary};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawerReport {
    Recorded { entry: CashFlowEntry },
    Status {
        summary: DrawerSummary,
        daily_income_cents: i64,
        last_counted_cents: Option<i64>,
    },
    ExpectedClose { expected_cents: i64 },
}

pub async fn run(
    floor: &mut FloorState,
    action: &DrawerAction,
    now: DateTime<Utc>,
) -> CliResult<DrawerReport> {
    match action {
        DrawerAction::Open { amount } => {
            let entry = floor.open_drawer(*amount, now).await?;
            Ok(DrawerReport::Recorded { entry })
        }
        DrawerAction::Movement {
            kind,
            amount,
            description,
        } => {
            let entry = floor
                .record_movement((*kind).into(), *amount, description, now)
                .await?;
            Ok(DrawerReport::Recorded { entry })
        }
        DrawerAction::Status => Ok(status(floor, now)),
        DrawerAction::Close { counted: None } => Ok(DrawerReport::ExpectedClose {
            expected_cents: floor.expected_close(now)?.cents(),
        }),
        DrawerAction::Close {
            counted: Some(counted),
        } => {
            let entry = floor.close_drawer(*counted, now).await?;
            Ok(DrawerReport::Recorded { entry })
        }
    }
}

fn status(floor: &FloorState, now: DateTime<Utc>) -> DrawerReport {
    let drawer = floor.drawer();
    DrawerReport::Status {
        summary: drawer.summary(now),
        daily_income_cents: drawer.daily_income(now).cents(),
        last_counted_cents: drawer.last_counted_balance().map(|m| m.cents()),
    }
}

impl Report for DrawerReport {
    fn render(&self, config: &ConfigState) -> String {
        let money = |cents: i64| config.format_currency(cents);

        match self {
            DrawerReport::Recorded { entry } => {
                let mut out = format!(
                    "{:?} {}  {}\n",
                    entry.kind,
                    money(entry.amount_cents),
                    entry.description
                );
                if let (CashFlowKind::Closing, Some(rec)) = (entry.kind, entry.reconciliation) {
                    let _ = writeln!(
                        out,
                        "expected {}  counted {}  difference {}",
                        money(rec.expected_cents),
                        money(rec.counted_cents),
                        money(rec.difference_cents)
                    );
                }
                out
            }
            DrawerReport::Status {
                summary,
                daily_income_cents,
                last_counted_cents,
            } => {
                let mut out = String::new();
                if summary.is_open {
                    let _ = writeln!(out, "Drawer open");
                    let _ = writeln!(out, "  opening  {:>12}", money(summary.opening_cents));
                    let _ = writeln!(out, "  income   {:>12}", money(summary.income_cents));
                    let _ = writeln!(out, "  outcome  {:>12}", money(summary.outcome_cents));
                    let _ = writeln!(out, "  balance  {:>12}", money(summary.balance_cents));
                    let _ = writeln!(out, "  today    {:>12}", money(*daily_income_cents));
                } else {
                    let _ = writeln!(out, "Drawer closed");
                }
                if let Some(counted) = last_counted_cents {
                    let _ = writeln!(out, "  last count {}", money(*counted));
                }
                out
            }
            DrawerReport::ExpectedClose { expected_cents } => {
                format!(
                    "Expected in drawer: {}\nRun `drawer close --counted <AMOUNT>` to close.\n",
                    money(*expected_cents)
                )
            }
        }
    }
}
