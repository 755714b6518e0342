//! Configuration structures for the catalog client.
//!
//! The configuration holds the credentials of the Supabase project hosting the
//! catalog. It is read from an optional YAML file and from environment
//! variables, environment variables taking precedence.
//!
//! # Configuration File Format
//!
//! ```yaml
//! supabase:
//!   # Base URL of the Supabase project
//!   url: "https://project.supabase.co"
//!   # Public access key of the project
//!   anon_key: "public-anon-key"
//! ```
//!
//! # Environment Variables
//!
//! Every value can be set with the `MIKU_` prefix, sections being separated by `__`:
//!
//! ```bash
//! export MIKU_SUPABASE__URL="https://project.supabase.co"
//! export MIKU_SUPABASE__ANON_KEY="public-anon-key"
//! ```

use std::path::Path;

use anyhow::bail;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Prefix of the environment variables read by [`Config::load`].
const ENV_PREFIX: &str = "MIKU_";

/// Root configuration structure.
#[derive(Deserialize, Debug, Default)]
pub struct Config {
    /// Catalog backend configuration
    #[serde(default)]
    pub supabase: Supabase,
}

/// Supabase project configuration.
///
/// Both values default to empty strings. An empty or malformed URL is only
/// reported when the connection is first used.
#[derive(Deserialize, Debug, Default)]
pub struct Supabase {
    /// Base URL of the project, without the `/rest/v1` suffix.
    #[serde(default)]
    pub url: String,

    /// Public access key of the project.
    #[serde(default)]
    pub anon_key: String,
}

impl Config {
    /// Loads the configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to a YAML configuration file. It must exist when given.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or if a value has the wrong type.
    pub fn load(path: Option<&str>) -> Result<Config, anyhow::Error> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if !Path::new(path).is_file() {
                bail!("config file {} not found", path);
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}
