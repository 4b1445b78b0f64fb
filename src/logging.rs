use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Environment, LogFormat, Settings};

// Filter used when RUST_LOG is not set. The scanner and the persist
// writer log at debug, so dev sees every save and every skipped action.
pub fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "task_board=debug,tower_http=debug,info",
        Environment::Staging => "task_board=debug,tower_http=info,info",
        Environment::Prod => "task_board=info,tower_http=warn,warn",
    }
}

pub fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&settings.env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(settings.env.is_dev())
        .with_line_number(settings.env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
        LogFormat::Pretty => registry.with(fmt_layer.pretty()).init(),
    }

    tracing::info!(
        env = ?settings.env,
        format = ?settings.log_format,
        "logging ready"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_parse() {
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            assert!(EnvFilter::try_new(default_filter(&env)).is_ok());
        }
        assert!(default_filter(&Environment::Dev).starts_with("task_board=debug"));
    }
}
