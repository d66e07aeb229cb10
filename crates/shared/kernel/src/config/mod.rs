use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `FARE__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "FARE";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_CONFIG: &str = "server";

#[fare_derive::fare_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file overlaid by `FARE__*` environment variables.
///
/// 1. **Base file**: `path`, or `server` in the working directory when `None`. The
///    extension may be omitted; any format `config` recognises is accepted.
/// 2. **Environment**: `FARE__SECTION__KEY` overrides `section.key`. Values are
///    parsed as numbers/booleans where possible and `FARE__CORS__ALLOWED_ORIGINS`
///    takes a comma-separated list.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or the merged values do
/// not match `T`.
///
/// # Example
/// ```rust
/// use fare_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), |p| p.as_ref().to_path_buf());
    load_layered(&path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
}

fn load_layered<T>(path: &Path, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    info!("Loading config from {}", path.display());

    Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(env)
        .build()
        .context(format!("Failed to read {}", path.display()))?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
