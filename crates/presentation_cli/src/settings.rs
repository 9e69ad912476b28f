//! Client configuration loading
//!
//! Sources, lowest priority first: built-in defaults, `nominatim.toml` in the
//! working directory (or the file given with `--config`), `NOMINATIM_*`
//! environment variables, and finally command-line overrides.

use std::path::Path;

use integration_nominatim::NominatimConfig;

/// Default configuration file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "nominatim";

/// Environment variable prefix, e.g. `NOMINATIM_BASE_URL`
pub const ENV_PREFIX: &str = "NOMINATIM";

/// Load the configuration from file and environment
pub fn load(path: Option<&Path>) -> Result<NominatimConfig, config::ConfigError> {
    load_with_env(path, None)
}

/// Load the configuration, optionally replacing the process environment
///
/// `env` stands in for the process environment when given.
pub fn load_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<NominatimConfig, config::ConfigError> {
    let file = path.map_or_else(
        || config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        |path| config::File::from(path).required(true),
    );

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

    let config = builder.build()?;
    config.try_deserialize()
}

/// Apply command-line overrides on top of a loaded configuration
#[must_use]
pub fn apply_overrides(
    mut config: NominatimConfig,
    base_url: Option<String>,
    user_agent: Option<String>,
) -> NominatimConfig {
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    if let Some(user_agent) = user_agent {
        config.user_agent = user_agent;
    }
    config
}
