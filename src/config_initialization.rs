//! Configuration initialization and hierarchy management

use tracing_subscriber::EnvFilter;

use crate::adapters::TomlConfigAdapter;
use crate::cli::Cli;
use crate::config::CutterConfig;
use crate::domain::errors::DomainError;
use crate::error::{CutterError, CutterResult};
use crate::ports::{ConfigPort, LogLevel};

/// Resolve configuration with precedence CLI > env > file > defaults
pub fn initialize_configuration(cli: &Cli) -> CutterResult<CutterConfig> {
    let adapter = TomlConfigAdapter::new();
    let mut config = adapter
        .load_config(cli.config.as_deref())
        .map_err(config_error)?;

    apply_cli_overrides(&mut config, cli).map_err(config_error)?;
    Ok(config)
}

fn apply_cli_overrides(config: &mut CutterConfig, cli: &Cli) -> Result<(), DomainError> {
    if let Some(level) = &cli.log_level {
        LogLevel::parse(level)?;
        config.log_level = level.clone();
    }
    Ok(())
}

fn config_error(err: DomainError) -> CutterError {
    match err {
        DomainError::ConfigError(message) => CutterError::Config { message },
        other => CutterError::Domain(other),
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn initialize_logging(config: &CutterConfig, json: bool) -> CutterResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| CutterError::LoggingInit {
            message: e.to_string(),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| CutterError::LoggingInit {
        message: e.to_string(),
    })
}
