use std::sync::Once;

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;

/// Crates that log per-frame detail at `info` and below; capped at `warn`
/// unless the filter names them.
const NOISY_MODULES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// How the global logger is installed.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter directives, e.g. `"debug"` or
    /// `"prism_engine::frame=trace"`. Falls back to `RUST_LOG`, then `info`.
    pub filter: Option<String>,
    pub style: WriteStyle,
    /// Millisecond timestamps on every record.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            style: WriteStyle::Auto,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }

    fn builder(&self) -> Builder {
        let mut builder = Builder::new();
        builder.filter_level(LevelFilter::Info);
        for module in NOISY_MODULES {
            builder.filter_module(module, LevelFilter::Warn);
        }

        let directives = self.filter.clone().or_else(|| std::env::var("RUST_LOG").ok());
        if let Some(directives) = directives {
            builder.parse_filters(&directives);
        }

        builder.write_style(self.style);
        if self.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }
        builder
    }
}

static INSTALL: Once = Once::new();

/// Installs `env_logger` as the `log` backend. Only the first call has an
/// effect; a logger installed elsewhere (e.g. by a test harness) is kept.
pub fn init_logging(config: LoggingConfig) {
    INSTALL.call_once(|| {
        if config.builder().try_init().is_ok() {
            log::debug!("logger installed (filter: {:?})", config.filter);
        }
    });
}
