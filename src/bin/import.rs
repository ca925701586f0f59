// src/bin/import.rs
use dotenv::dotenv;
use log::{error, info};
use std::process::ExitCode;

use junkick_service::config::Config;
use junkick_service::import;
use junkick_service::storage::Store;

// Usage: junkick-import [path/to/db.json]
fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let snapshot_path = std::env::args().nth(1).unwrap_or_else(|| "./db.json".to_string());
    let config = Config::from_env();

    let store = match Store::open(&config.storage_path) {
        Ok(store) => store,
        Err(e) => {
            error!("❌ Could not open storage at {}: {}", config.storage_path, e);
            return ExitCode::FAILURE;
        }
    };

    info!("📁 Loading snapshot from {}", snapshot_path);
    let outcome = import::load_snapshot(&snapshot_path)
        .and_then(|snapshot| import::run(&store, snapshot, config.bcrypt_cost));

    match outcome {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ Import failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
