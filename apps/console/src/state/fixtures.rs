//! Shared setup for console tests: a two-station floor on an in-memory
//! database, or on a temp file when a test needs two console processes.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};

use crate::state::{ConfigState, FloorState};
use lanhouse_core::{Client, Product, RateTier, RateType, Station, StationKind};
use lanhouse_db::{Database, DbConfig};

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap()
}

pub(crate) fn config() -> ConfigState {
    ConfigState {
        sound_enabled: false,
        ..ConfigState::default()
    }
}

pub(crate) fn soda() -> Product {
    Product {
        id: "soda".to_string(),
        name: "Soda".to_string(),
        category: Some("Drinks".to_string()),
        barcode: Some("7790000000001".to_string()),
        sale_price_cents: 1800,
        purchase_price_cents: 1200,
        manages_inventory: true,
        stock: 10,
        is_service: false,
    }
}

/// PC-01 on the stepped PC rate, XB-01 on the console rate, client `c1`
/// with 25 points and one stocked product.
pub(crate) async fn seeded_floor() -> FloorState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    seed(&db).await;
    FloorState::load(db, &config()).await.unwrap()
}

/// The seeded floor on a fresh file under the temp dir. Open more floors
/// on the same path with [`open_floor`]; remove it with [`remove_db`].
pub(crate) async fn seeded_file_floor(tag: &str) -> (FloorState, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("lanhouse-{tag}-{}-{nanos}.db", std::process::id()));

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    seed(&db).await;
    (FloorState::load(db, &config()).await.unwrap(), path)
}

/// Another console process on the same database file.
pub(crate) async fn open_floor(path: &Path) -> FloorState {
    let db = Database::new(DbConfig::new(path)).await.unwrap();
    FloorState::load(db, &config()).await.unwrap()
}

pub(crate) fn remove_db(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

async fn seed(db: &Database) {

    db.rates()
        .save(&RateType::new(
            "pc",
            "PC",
            vec![
                RateTier::new(1, 15, 500),
                RateTier::new(16, 30, 1000),
                RateTier::new(31, 60, 1500),
            ],
        ))
        .await
        .unwrap();
    db.rates()
        .save(&RateType::new(
            "console",
            "Console",
            vec![RateTier::new(1, 30, 1000), RateTier::new(31, 60, 2000)],
        ))
        .await
        .unwrap();

    db.stations()
        .insert(&Station::new("PC-01", "PC 01", StationKind::Pc, "pc"))
        .await
        .unwrap();
    db.stations()
        .insert(&Station::new("XB-01", "Console 1", StationKind::Console, "console"))
        .await
        .unwrap();

    db.clients()
        .insert(&Client::new("c1", "Ana Torres", 25))
        .await
        .unwrap();
    db.products().insert(&soda()).await.unwrap();
}
