//=========================================================================
// Logging
//=========================================================================
//
// Global logger setup backed by `env_logger`.
//
// Engine subsystems log through the `log` facade under fixed targets:
// "scheduler", "history", "input", "registry", "editor", "scene",
// "platform", and "extension::<id>" for extension code.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

use log::{debug, LevelFilter};

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `filter` uses the `env_logger` filter syntax, e.g.
/// `"info,scheduler=debug,extension::spin=trace"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

static INIT: Once = Once::new();

//=== init_logging() ======================================================

/// Installs the global logger once; later calls are ignored.
///
/// Filter precedence: `config.filter`, then `RUST_LOG`, then `info`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.filter_level(LevelFilter::Info);
                }
            },
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            debug!("Logging initialized");
        }
    });
}
