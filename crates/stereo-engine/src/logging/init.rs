use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` syntax, e.g. `"stereo_engine=debug,naga=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// GPU stack modules capped at `warn` by the default filter.
const NOISY_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Where the active filter came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterSource {
    Config(String),
    Env(String),
    Default,
}

fn resolve_filter(config: Option<String>, env: Option<String>) -> FilterSource {
    match (config, env) {
        (Some(f), _) => FilterSource::Config(f),
        (None, Some(f)) => FilterSource::Env(f),
        (None, None) => FilterSource::Default,
    }
}

fn apply_filter(builder: &mut env_logger::Builder, source: &FilterSource) {
    match source {
        FilterSource::Config(f) | FilterSource::Env(f) => {
            builder.parse_filters(f);
        }
        FilterSource::Default => {
            builder.filter_level(log::LevelFilter::Info);
            for module in NOISY_MODULES {
                builder.filter_module(module, log::LevelFilter::Warn);
            }
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then `info` with
/// the GPU stack capped at `warn`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let source = resolve_filter(config.env_filter, std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        apply_filter(&mut builder, &source);
        builder.write_style(config.write_style);

        // A host that installed its own logger keeps it.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized ({source:?})");
        }
    });
}
