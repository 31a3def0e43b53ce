//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use lanhouse_core::{CashFlowKind, CommissionPolicy, Money, PaymentDecision, PaymentMethod, SessionRequest};

#[derive(Debug, Parser)]
#[command(name = "lanhouse")]
#[command(about = "Lanhouse operator console - stations, checkout and cash drawer", long_about = None)]
pub struct Cli {
    /// Database file (overrides LANHOUSE_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every station with its live timer and bill
    Stations,

    /// Open a session on an idle station
    Start(StartArgs),

    /// Charge a product or a custom line to an open session
    AddItem(AddItemArgs),

    /// Bill an open session and free the station
    Checkout(CheckoutArgs),

    /// Cash drawer operations
    Drawer {
        #[command(subcommand)]
        action: DrawerAction,
    },

    /// List clients with their loyalty points
    Clients {
        /// Filter by name, phone or email
        query: Option<String>,
    },

    /// Tick the floor continuously and alert when countdowns expire
    Watch,
}

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Station id, e.g. PC-03
    pub station: String,

    /// Client to attach (earns points, pays Redeem sessions)
    #[arg(long)]
    pub client: Option<String>,

    /// Prepaid block of MINUTES
    #[arg(long, value_name = "MINUTES", conflicts_with = "redeem")]
    pub fixed: Option<i64>,

    /// Pay HOURS with loyalty points
    #[arg(long, value_name = "HOURS")]
    pub redeem: Option<i64>,
}

impl StartArgs {
    /// Free unless a prepaid or redeemed block was asked for.
    pub fn request(&self) -> SessionRequest {
        match (self.fixed, self.redeem) {
            (Some(minutes), _) => SessionRequest::Fixed { minutes },
            (None, Some(hours)) => SessionRequest::Redeem { hours },
            (None, None) => SessionRequest::Free,
        }
    }
}

#[derive(Debug, Args)]
pub struct AddItemArgs {
    /// Station id
    pub station: String,

    /// Catalog product id or barcode
    #[arg(long, required_unless_present = "custom", conflicts_with = "custom")]
    pub product: Option<String>,

    /// Name of an ad-hoc line (requires --price)
    #[arg(long, requires = "price")]
    pub custom: Option<String>,

    /// Unit price of the ad-hoc line, e.g. 12.50
    #[arg(long)]
    pub price: Option<Money>,

    #[arg(long, short = 'q', default_value_t = 1)]
    pub quantity: i64,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Station id
    pub station: String,

    #[arg(long, value_enum, default_value_t = MethodArg::Cash)]
    pub method: MethodArg,

    /// Venue absorbs the card fee instead of adding it to the bill
    #[arg(long)]
    pub absorb: bool,
}

impl CheckoutArgs {
    pub fn decision(&self) -> PaymentDecision {
        let policy = if self.absorb {
            CommissionPolicy::Absorb
        } else {
            CommissionPolicy::Charge
        };
        PaymentDecision::new(self.method.into(), policy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Cash,
    Card,
    MercadoPago,
    Transfer,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Cash => PaymentMethod::Cash,
            MethodArg::Card => PaymentMethod::Card,
            MethodArg::MercadoPago => PaymentMethod::MercadoPago,
            MethodArg::Transfer => PaymentMethod::Transfer,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum DrawerAction {
    /// Start today's drawer with an opening float
    Open { amount: Money },

    /// Record cash put in or taken out by hand
    Movement {
        #[arg(value_enum)]
        kind: MovementArg,
        amount: Money,
        description: String,
    },

    /// Current drawer figures
    Status,

    /// Count the drawer and close it (without --counted, only show the
    /// expected balance)
    Close {
        #[arg(long)]
        counted: Option<Money>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MovementArg {
    Income,
    Outcome,
}

impl From<MovementArg> for CashFlowKind {
    fn from(arg: MovementArg) -> Self {
        match arg {
            MovementArg::Income => CashFlowKind::Income,
            MovementArg::Outcome => CashFlowKind::Outcome,
        }
    }
}
