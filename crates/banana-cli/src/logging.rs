//! File logging
//!
//! Off unless BANANA_LOG is set; its value is the level for both crates.

use std::fs::File;

use banana_core::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BANANA_LOG";

/// Initialize file-based logging if BANANA_LOG is set
pub fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&log_level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("banana_core={0},banana={0}", level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_covers_both_crates() {
        let filter = filter_for("debug").to_string();
        assert!(filter.contains("banana_core=debug"));
        assert!(filter.contains("banana=debug"));
    }
}
