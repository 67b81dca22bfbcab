//! # Configuration module
//!
//! This module provide utilities and helpers to interact with the configuration

use std::{convert::TryFrom, env, path::PathBuf};

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// -----------------------------------------------------------------------------
// Validation structure

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct Validation {
    /// reject documents whose kind is not served by this crate instead of
    /// skipping them
    #[serde(rename = "strict", default)]
    pub strict: bool,
}

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to load file '{0:?}', {1}")]
    File(PathBuf, ConfigError),
    #[error("failed to build configuration, {0}")]
    Build(ConfigError),
    #[error("failed to load configuration, {0}")]
    Cast(ConfigError),
    #[error("failed to set default for key '{0}', {1}")]
    Default(String, ConfigError),
}

// -----------------------------------------------------------------------------
// Configuration structures

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct Configuration {
    #[serde(rename = "validation", default)]
    pub validation: Validation,
}

impl TryFrom<PathBuf> for Configuration {
    type Error = Error;

    #[cfg_attr(feature = "trace", tracing::instrument)]
    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        builder()?
            .add_source(File::from(path.to_owned()).required(true))
            .build()
            .map_err(|err| Error::File(path, err))?
            .try_deserialize()
            .map_err(Error::Cast)
    }
}

impl Configuration {
    #[cfg_attr(feature = "trace", tracing::instrument)]
    pub fn try_default() -> Result<Self, Error> {
        let mut paths = vec![
            PathBuf::from(format!("/usr/share/{}/config", env!("CARGO_PKG_NAME"))),
            PathBuf::from(format!("/etc/{}/config", env!("CARGO_PKG_NAME"))),
        ];

        if let Ok(home) = env::var("HOME") {
            paths.push(PathBuf::from(format!(
                "{}/.config/{}/config",
                home,
                env!("CARGO_PKG_NAME")
            )));

            paths.push(PathBuf::from(format!(
                "{}/.local/share/{}/config",
                home,
                env!("CARGO_PKG_NAME")
            )));
        }

        paths.push(PathBuf::from("config"));

        let mut builder = builder()?;
        for path in paths {
            debug!(path = path.display().to_string(), "add optional configuration source");
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .build()
            .map_err(Error::Build)?
            .try_deserialize()
            .map_err(Error::Cast)
    }

    /// log the loaded configuration
    pub fn help(&self) {
        trace!(
            validation.strict = self.validation.strict,
            "configuration has been loaded"
        );
    }
}

// -----------------------------------------------------------------------------
// Helper functions

/// returns a configuration builder with defaults and the environment source
fn builder() -> Result<ConfigBuilder<DefaultState>, Error> {
    Config::builder()
        .set_default("validation.strict", false)
        .map_err(|err| Error::Default("validation.strict".into(), err))
        .map(|builder| {
            builder.add_source(
                Environment::with_prefix(&env!("CARGO_PKG_NAME").replace('-', "_"))
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn configuration(content: &str) -> Result<Configuration, Error> {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temporary configuration file");

        file.write_all(content.as_bytes())
            .expect("write temporary configuration file");

        Configuration::try_from(file.path().to_path_buf())
    }

    #[test]
    fn load_strict_validation() {
        let config = configuration("[validation]\nstrict = true\n").expect("load configuration");

        assert!(config.validation.strict);
    }

    #[test]
    fn strict_validation_defaults_to_false() {
        let config = configuration("").expect("load configuration");

        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Configuration::try_from(PathBuf::from("/nonexistent/database-apis.toml"));

        assert!(matches!(result, Err(Error::File(_, _))));
    }

    #[test]
    fn malformed_value_is_an_error() {
        let result = configuration("[validation]\nstrict = \"sometimes\"\n");

        assert!(matches!(result, Err(Error::Cast(_))));
    }
}
