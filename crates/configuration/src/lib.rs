//! # Configuration Crate
//!
//! Loads the reporting application's settings from a TOML file and exposes
//! them as a strongly-typed tree. Every section has a built-in default, so a
//! missing file yields the standard reporting scenario rather than an error.

use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ExclusionSettings, ReportSettings, Settings, ValidationSettings};

/// Loads the application configuration.
///
/// This function is the primary entry point for this crate. It reads the
/// given TOML file (or `meridian.toml` in the working directory when no path
/// is supplied), deserializes it into our strongly-typed `Settings` struct,
/// and returns it. The file itself is optional; sections and keys it omits
/// fall back to the defaults.
pub fn load_config(path: Option<&str>) -> Result<Settings, ConfigError> {
    let file = config::File::with_name(path.unwrap_or("meridian")).required(path.is_some());

    let builder = config::Config::builder().add_source(file).build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct.
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
