//! # Station Commands
//!
//! `stations`, `start`, `add-item` and `checkout`.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{AddItemArgs, CheckoutArgs, StartArgs};
use crate::commands::{clock_face, Report};
use crate::error::{CliError, CliResult, ErrorCode};
use crate::state::{ConfigState, FloorState};
use lanhouse_core::loyalty::redeemable_hours;
use lanhouse_core::{
    AccountItem, Checkout, Inventory, LoyaltyLedger, PaymentMethod, SessionMode, SessionRequest,
    SessionSnapshot, StationKind, StationStatus,
};

// =============================================================================
// stations
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRow {
    pub id: String,
    pub name: String,
    pub kind: StationKind,
    pub status: StationStatus,
    pub client_id: Option<String>,
    /// Present while the station is occupied.
    pub session: Option<SessionSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationsReport {
    pub venue_name: String,
    pub stations: Vec<StationRow>,
}

pub fn list(floor: &FloorState, config: &ConfigState, now: DateTime<Utc>) -> CliResult<StationsReport> {
    let mut stations = Vec::new();

    for station in floor.venue().stations() {
        stations.push(StationRow {
            id: station.id.clone(),
            name: station.name.clone(),
            kind: station.kind,
            status: station.status,
            client_id: station.client_id.clone(),
            session: floor.venue().snapshot(&station.id, now)?,
        });
    }

    Ok(StationsReport {
        venue_name: config.venue_name.clone(),
        stations,
    })
}

impl Report for StationsReport {
    fn render(&self, config: &ConfigState) -> String {
        let mut out = format!("{}\n", self.venue_name);

        for row in &self.stations {
            let _ = write!(out, "{:<8} {:<14}", row.id, row.name);
            match &row.session {
                None => {
                    let _ = writeln!(out, " free");
                }
                Some(s) => {
                    let timer = match s.mode {
                        SessionMode::Free => format!("▲ {}", clock_face(s.display_secs())),
                        SessionMode::Fixed | SessionMode::Redeem => {
                            format!("▼ {}", clock_face(s.display_secs()))
                        }
                    };
                    let _ = writeln!(
                        out,
                        " {:<8} {}  {:>10}{}{}",
                        format!("{:?}", s.mode).to_lowercase(),
                        timer,
                        config.format_currency(s.total_cents),
                        row.client_id
                            .as_deref()
                            .map(|c| format!("  [{}]", c))
                            .unwrap_or_default(),
                        if s.expired { "  TIME UP" } else { "" }
                    );
                }
            }
        }

        out
    }
}

// =============================================================================
// start
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStarted {
    pub station_id: String,
    pub station_name: String,
    pub mode: SessionMode,
    pub end_time: Option<DateTime<Utc>>,
    pub fixed_cost_cents: Option<i64>,
    pub client_id: Option<String>,
    /// Balance after a Redeem debit.
    pub client_points: Option<i64>,
}

pub async fn start(floor: &mut FloorState, args: &StartArgs, now: DateTime<Utc>) -> CliResult<SessionStarted> {
    let request = args.request();

    if let (SessionRequest::Redeem { hours }, Some(client_id)) = (request, args.client.as_deref()) {
        let client = floor
            .clients()
            .client(client_id)
            .ok_or_else(|| CliError::not_found("Client", client_id))?;
        let available = redeemable_hours(client.points);
        if hours > available {
            return Err(CliError::new(
                ErrorCode::InsufficientPoints,
                format!(
                    "{} has {} points, enough for {} hour(s), not {}",
                    client.name, client.points, available, hours
                ),
            ));
        }
    }

    let station = floor
        .start_session(&args.station, args.client.clone(), request, now)
        .await?;

    let client_points = match (request, station.client_id.as_deref()) {
        (SessionRequest::Redeem { .. }, Some(id)) => floor.clients().client(id).map(|c| c.points),
        _ => None,
    };

    Ok(SessionStarted {
        station_id: station.id.clone(),
        station_name: station.name.clone(),
        mode: request.mode(),
        end_time: station.end_time,
        fixed_cost_cents: station.fixed_cost_cents,
        client_id: station.client_id.clone(),
        client_points,
    })
}

impl Report for SessionStarted {
    fn render(&self, config: &ConfigState) -> String {
        let mut out = format!(
            "{} started ({})",
            self.station_name,
            format!("{:?}", self.mode).to_lowercase()
        );
        if let Some(end) = self.end_time {
            let local = end.with_timezone(&config.utc_offset());
            let _ = write!(out, ", ends at {}", local.format("%H:%M"));
        }
        if let Some(cost) = self.fixed_cost_cents {
            let _ = write!(out, ", prepaid {}", config.format_currency(cost));
        }
        if let Some(points) = self.client_points {
            let _ = write!(out, ", {} points left", points);
        }
        out.push('\n');
        out
    }
}

// =============================================================================
// add-item
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAdded {
    pub station_id: String,
    pub item: String,
    pub quantity: i64,
    pub lines: Vec<AccountItem>,
    pub items_subtotal_cents: i64,
}

/// Finds a catalog product by id, then by barcode.
fn catalog_item(floor: &FloorState, key: &str) -> CliResult<AccountItem> {
    let product = floor
        .stock()
        .product(key)
        .or_else(|| floor.stock().by_barcode(key))
        .ok_or_else(|| CliError::not_found("Product", key))?;

    Ok(AccountItem::from_product(product))
}

pub async fn add_item(floor: &mut FloorState, args: &AddItemArgs) -> CliResult<ItemAdded> {
    let item = match (&args.product, &args.custom) {
        (Some(key), _) => catalog_item(floor, key)?,
        (None, Some(name)) => {
            let price = args
                .price
                .ok_or_else(|| CliError::validation("A custom item needs --price"))?;
            AccountItem::custom(name, price)?
        }
        (None, None) => return Err(CliError::validation("Give --product or --custom")),
    };
    let name = item.name.clone();

    let station = floor
        .add_account_item(&args.station, item, args.quantity)
        .await?;

    debug!(station = %station.id, item = %name, quantity = args.quantity, "Item charged");

    Ok(ItemAdded {
        station_id: station.id.clone(),
        item: name,
        quantity: args.quantity,
        items_subtotal_cents: lanhouse_core::account::subtotal(&station.account_items).cents(),
        lines: station.account_items,
    })
}

impl Report for ItemAdded {
    fn render(&self, config: &ConfigState) -> String {
        format!(
            "{} × {} added to {} (items {})\n",
            self.quantity,
            self.item,
            self.station_id,
            config.format_currency(self.items_subtotal_cents)
        )
    }
}

// =============================================================================
// checkout
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReport {
    #[serde(flatten)]
    pub checkout: Checkout,
}

pub async fn checkout(
    floor: &mut FloorState,
    args: &CheckoutArgs,
    now: DateTime<Utc>,
) -> CliResult<CheckoutReport> {
    let checkout = floor.checkout(&args.station, args.decision(), now).await?;

    info!(
        folio = %checkout.sale.folio,
        station = %args.station,
        method = ?checkout.sale.payment_method,
        total = %checkout.settlement.total,
        "Station checked out"
    );

    Ok(CheckoutReport { checkout })
}

fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Cash",
        PaymentMethod::Card => "Card",
        PaymentMethod::MercadoPago => "Mercado Pago",
        PaymentMethod::Transfer => "Transfer",
    }
}

impl Report for CheckoutReport {
    fn render(&self, config: &ConfigState) -> String {
        let sale = &self.checkout.sale;
        let mut out = format!(
            "{} {} {} paid {} ({})",
            sale.folio,
            sale.station_id,
            sale.client_label,
            config.format_currency(sale.total_cents),
            method_label(sale.payment_method)
        );
        if sale.net_received_cents != sale.total_cents {
            let _ = write!(out, ", net {}", config.format_currency(sale.net_received_cents));
        }
        if let Some(credit) = &self.checkout.points_credit {
            let _ = write!(out, ", +{} points (balance {})", credit.points, credit.new_balance);
        }
        out.push('\n');
        out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::MethodArg;
    use crate::state::fixtures::{config, seeded_floor, t0};
    use chrono::TimeDelta;
    use lanhouse_core::Money;

    fn start_args(station: &str, client: Option<&str>, fixed: Option<i64>, redeem: Option<i64>) -> StartArgs {
        StartArgs {
            station: station.to_string(),
            client: client.map(str::to_string),
            fixed,
            redeem,
        }
    }

    fn product_args(station: &str, key: &str, quantity: i64) -> AddItemArgs {
        AddItemArgs {
            station: station.to_string(),
            product: Some(key.to_string()),
            custom: None,
            price: None,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_list_shows_live_bill() {
        let mut floor = seeded_floor().await;
        start(&mut floor, &start_args("PC-01", None, None, None), t0())
            .await
            .unwrap();

        let report = list(&floor, &config(), t0() + TimeDelta::minutes(20)).unwrap();
        assert_eq!(report.stations.len(), 2);

        let pc = &report.stations[0];
        assert_eq!(pc.id, "PC-01");
        let session = pc.session.as_ref().unwrap();
        assert_eq!(session.total_cents, 1000);
        assert_eq!(session.elapsed_secs, 20 * 60);
        assert!(report.stations[1].session.is_none());

        let text = report.render(&config());
        assert!(text.contains("PC-01"));
        assert!(text.contains("$10.00"));
        assert!(text.contains("free"));
    }

    #[tokio::test]
    async fn test_redeem_is_checked_against_redeemable_hours() {
        let mut floor = seeded_floor().await;

        let err = start(&mut floor, &start_args("XB-01", Some("c1"), None, Some(3)), t0())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientPoints);
        assert!(err.message.contains("2 hour(s)"));

        let started = start(&mut floor, &start_args("XB-01", Some("c1"), None, Some(2)), t0())
            .await
            .unwrap();
        assert_eq!(started.client_points, Some(5));
        assert_eq!(started.fixed_cost_cents, Some(0));
        assert_eq!(started.end_time, Some(t0() + TimeDelta::hours(2)));
    }

    #[tokio::test]
    async fn test_fixed_start_is_prepaid() {
        let mut floor = seeded_floor().await;
        let started = start(&mut floor, &start_args("PC-01", None, Some(60), None), t0())
            .await
            .unwrap();
        assert_eq!(started.fixed_cost_cents, Some(1500));
        assert!(started.render(&config()).contains("prepaid $15.00"));
    }

    #[tokio::test]
    async fn test_add_item_by_barcode_merges_lines() {
        let mut floor = seeded_floor().await;
        start(&mut floor, &start_args("PC-01", None, None, None), t0())
            .await
            .unwrap();

        add_item(&mut floor, &product_args("PC-01", "soda", 1)).await.unwrap();
        let added = add_item(&mut floor, &product_args("PC-01", "7790000000001", 2))
            .await
            .unwrap();

        assert_eq!(added.lines.len(), 1);
        assert_eq!(added.lines[0].quantity, 3);
        assert_eq!(added.items_subtotal_cents, 5400);

        let stored = floor.db().stations().get("PC-01").await.unwrap().unwrap();
        assert_eq!(stored.account_items, added.lines);
    }

    #[tokio::test]
    async fn test_add_custom_item_and_unknown_product() {
        let mut floor = seeded_floor().await;
        start(&mut floor, &start_args("PC-01", None, None, None), t0())
            .await
            .unwrap();

        let added = add_item(
            &mut floor,
            &AddItemArgs {
                station: "PC-01".to_string(),
                product: None,
                custom: Some("Color print".to_string()),
                price: Some(Money::from_cents(800)),
                quantity: 2,
            },
        )
        .await
        .unwrap();
        assert_eq!(added.items_subtotal_cents, 1600);
        assert!(added.lines[0].is_service);

        let err = add_item(&mut floor, &product_args("PC-01", "nope", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_checkout_with_card_charge() {
        let mut floor = seeded_floor().await;
        start(&mut floor, &start_args("XB-01", Some("c1"), None, None), t0())
            .await
            .unwrap();
        add_item(&mut floor, &product_args("XB-01", "soda", 1)).await.unwrap();

        let report = checkout(
            &mut floor,
            &CheckoutArgs {
                station: "XB-01".to_string(),
                method: MethodArg::Card,
                absorb: false,
            },
            t0() + TimeDelta::minutes(60),
        )
        .await
        .unwrap();

        let sale = &report.checkout.sale;
        // 60 min console = $20, soda $18
        assert_eq!(sale.subtotal_cents, 3800);
        assert_eq!(sale.commission_cents, Money::from_cents(3800).apply_rate(config().commission_rate()).cents());
        assert_eq!(sale.total_cents, sale.subtotal_cents + sale.commission_cents);
        assert_eq!(sale.net_received_cents, 3800);
        assert_eq!(sale.client_label, "Ana Torres");
        assert_eq!(report.checkout.points_credit.as_ref().unwrap().new_balance, 26);

        let text = report.render(&config());
        assert!(text.contains("XB-01 Ana Torres paid"), "{text}");
        assert!(text.contains("(Card), net $38.00"), "{text}");
        assert!(text.contains("+1 points (balance 26)"), "{text}");

        let stored = floor.db().products().get_by_id("soda").await.unwrap().unwrap();
        assert_eq!(stored.stock, 9);
    }

    #[tokio::test]
    async fn test_checkout_idle_station_fails() {
        let mut floor = seeded_floor().await;
        let err = checkout(
            &mut floor,
            &CheckoutArgs {
                station: "PC-01".to_string(),
                method: MethodArg::Cash,
                absorb: false,
            },
            t0(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }
}
