//! Galley print server
//!
//! Kitchen print dispatch for a restaurant back office: renders orders to
//! ESC/POS, keeps the printer registry, and delivers tickets over TCP, USB
//! or a cloud relay.
//!
//! # Module structure
//!
//! ```text
//! galley-server/src/
//! ├── core/          # Config, state, server
//! ├── printing/      # Renderer, registry, dispatch, discovery, drivers, storage
//! ├── services/      # Router assembly and middleware
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Logging, validation, error re-exports
//! ```

pub mod api;
pub mod core;
pub mod printing;
pub mod services;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Days of rotated logs to keep
const LOG_RETENTION_DAYS: u64 = 14;

/// Load `.env`, read the config, prepare the work dir and start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    init_logger_with_file(
        Some(config.log_level.as_str()),
        config.log_json,
        Some(log_dir.as_path()),
    )?;

    match cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "Removed old log files"),
        Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
    }

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ______      ____
  / ____/___ _/ / /__  __  __
 / / __/ __ `/ / / _ \/ / / /
/ /_/ / /_/ / / /  __/ /_/ /
\____/\__,_/_/_/\___/\__, /
                    /____/
    "#
    );
}
