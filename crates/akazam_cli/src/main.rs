//! Process entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and establish the one connection
//!   the process owns.
//! - Treat a failed connection as fatal (non-zero exit).

use akazam_core::{init, init_logging, AppConfig};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("akazam: invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("akazam: logging disabled: {err}");
    }

    let conn = match init(&config.db_uri, &config.connection_options()) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=app_main module=cli status=error error={err}");
            eprintln!("akazam: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("event=app_main module=cli status=ok db_connection=established");
    println!("akazam_core version={}", akazam_core::core_version());
    println!("db connection established");

    if let Err((_, err)) = conn.close() {
        error!("event=db_close module=cli status=error error={err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
