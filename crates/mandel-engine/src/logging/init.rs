use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
/// Filters use the `env_logger` syntax, e.g. `"info,mandel::gl=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global `env_logger` once; later calls are ignored.
///
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }

        builder
            .write_style(config.write_style)
            .format_timestamp_millis()
            .format_target(true);

        // Another logger may already be installed by an embedding host.
        if builder.try_init().is_err() {
            log::debug!("logger already installed; keeping it");
            return;
        }

        log::debug!("logging initialized");
    });
}
