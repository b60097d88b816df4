//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `libris_core` linkage and the configured database.
//! - Keep output deterministic for quick local sanity checks.

use libris_core::db::migrations::current_user_version;
use libris_core::{core_version, open_db, ping, CoreConfig};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("libris_core ping={}", ping());
    println!("libris_core version={}", core_version());

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = config.init_logging() {
        eprintln!("logging disabled: {err}");
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{}`: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };
    match current_user_version(&conn) {
        Ok(version) => {
            info!("event=cli_probe module=cli status=ok schema_version={version}");
            println!("libris_core db={} schema_version={version}", config.db_path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to read schema version: {err}");
            ExitCode::FAILURE
        }
    }
}
