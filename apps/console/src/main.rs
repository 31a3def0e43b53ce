//! # Lanhouse Console Entry Point
//!
//! ```text
//! lanhouse stations
//! lanhouse start PC-03 --fixed 60
//! lanhouse start XB-01 --client c1 --redeem 2
//! lanhouse add-item PC-03 --product 7790000000001 -q 2
//! lanhouse checkout PC-03 --method card
//! lanhouse drawer open 500
//! lanhouse drawer close --counted 640
//! lanhouse watch
//! ```
//!
//! Exit status is 0 on success, otherwise the [`ErrorCode`] exit code.
//!
//! [`ErrorCode`]: lanhouse_console::error::ErrorCode

use clap::Parser;

use lanhouse_console::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    lanhouse_console::init_tracing();

    let json = cli.json;
    if let Err(err) = lanhouse_console::run(cli).await {
        if json {
            match serde_json::to_string(&err) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("error: {}", err.message),
            }
        } else {
            eprintln!("error: {}", err.message);
        }
        std::process::exit(err.exit_code());
    }
}
