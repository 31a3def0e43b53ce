//! # Lanhouse Console Library
//!
//! The operator console: parses a command, loads the floor, runs the
//! command and prints its report.
//!
//! ## Module Organization
//! ```text
//! lanhouse_console/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── clock.rs        ◄─── SystemClock
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── floor.rs    ◄─── Venue + books + drawer + database
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── station.rs  ◄─── stations, start, add-item, checkout
//! │   ├── drawer.rs   ◄─── cash drawer
//! │   ├── client.rs   ◄─── clients
//! │   └── watch.rs    ◄─── tick loop + expiry bell
//! └── error.rs        ◄─── CliError for commands
//! ```

pub mod cli;
pub mod clock;
pub mod commands;
pub mod error;
pub mod state;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use clock::SystemClock;
use commands::Report;
use error::CliResult;
use lanhouse_core::Clock;
use lanhouse_db::{Database, DbConfig};
use state::{ConfigState, FloorState};

/// Runs one console command.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load configuration (LANHOUSE_* env, --db override)                 │
/// │  2. Create the database directory if needed                            │
/// │  3. Connect to SQLite, run pending migrations                          │
/// │  4. Load the floor (stations, rates, clients, products, drawer)        │
/// │  5. Run the command and print its report                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> CliResult<()> {
    let mut config = ConfigState::from_env()?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    debug!(db_path = ?config.db_path, "Database path determined");

    let db = Database::new(DbConfig::new(&config.db_path)).await?;
    let mut floor = FloorState::load(db, &config).await?;

    let clock = SystemClock;
    let now = clock.now();
    let json = cli.json;

    match cli.command {
        Command::Stations => emit(&commands::station::list(&floor, &config, now)?, &config, json),
        Command::Start(args) => emit(
            &commands::station::start(&mut floor, &args, now).await?,
            &config,
            json,
        ),
        Command::AddItem(args) => emit(
            &commands::station::add_item(&mut floor, &args).await?,
            &config,
            json,
        ),
        Command::Checkout(args) => emit(
            &commands::station::checkout(&mut floor, &args, now).await?,
            &config,
            json,
        ),
        Command::Drawer { action } => emit(
            &commands::drawer::run(&mut floor, &action, now).await?,
            &config,
            json,
        ),
        Command::Clients { query } => emit(
            &commands::client::list(&floor, query.as_deref()).await?,
            &config,
            json,
        ),
        Command::Watch => {
            info!(venue = %config.venue_name, "Starting watch");
            commands::watch::run(&mut floor, &config, &clock).await
        }
    }?;

    floor.db().close().await;
    Ok(())
}

/// Prints a report as text or pretty JSON.
fn emit<R: Report>(report: &R, config: &ConfigState, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render(config));
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so `--json` output stays clean.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=lanhouse=trace` - Show trace for lanhouse crates only
/// - Default: `info,lanhouse=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lanhouse=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
