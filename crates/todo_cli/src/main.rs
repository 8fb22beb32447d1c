//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todo_core` linkage, configuration and database bootstrap.
//! - Keep output deterministic for quick local sanity checks.

use log::info;
use std::process::ExitCode;
use todo_core::db::migrations::latest_version;
use todo_core::db::{open_db, open_db_in_memory};
use todo_core::{init_logging, CoreConfig};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("todo_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env()?;

    if let Some(log_dir) = config.log_dir.as_ref() {
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
        init_logging(config.log_level, log_dir)?;
    }

    let conn = match config.db_path.as_ref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    drop(conn);

    let db_mode = if config.db_path.is_some() { "file" } else { "memory" };
    info!("event=cli_probe module=cli status=ok db_mode={db_mode}");

    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());
    println!("todo_core schema_version={} db_mode={db_mode}", latest_version());
    Ok(())
}
