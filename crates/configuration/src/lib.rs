use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::{TRADE_LOG_TARGET, init_tracing};
pub use settings::{
    Config, DayClassifierParams, Execution, InstrumentConfig, LogLevel, LoggingConfig,
    MeanReversionParams, MicrostructureParams, ProbabilityParams, Session, StopLossParams,
    VolumeAnalysisParams,
};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// layers `CONFLUENCE__*` environment overrides on top, deserializes the result into our
/// strongly-typed `Config` struct and validates it.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Same as [`load_config`] but reads from an explicit path.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        // e.g. CONFLUENCE__PROBABILITY__THRESHOLD=80
        .add_source(
            config::Environment::with_prefix("CONFLUENCE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
