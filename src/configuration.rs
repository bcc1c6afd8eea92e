use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

/// Global configuration, loaded from `configuration/*.yaml` and the
/// environment. See `get_configuration`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub klaviyo: KlaviyoSettings,
    pub cors: CorsSettings,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    /// 0 lets the OS pick a port (tests)
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Upstream provider configuration. `api_key`, `list_id` and `base_url` are
/// normally supplied as `KLAVIYO_API_KEY`, `KLAVIYO_LIST_ID` and `KLAVIYO_URL`.
#[derive(Deserialize, Clone)]
pub struct KlaviyoSettings {
    /// Public company id, sent as the `company_id` query parameter
    pub api_key: Secret<String>,
    pub list_id: String,
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl KlaviyoSettings {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }
}

/// Origins allowed to call the relay from a browser. Everything else gets no
/// CORS headers.
#[derive(Deserialize, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!(
                "{e} is not a supported environment; use either `local` or `production`"
            )),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then
/// environment variables.
///
/// Precedence (last wins):
///
/// 1. `base.yaml`
/// 2. `local.yaml` or `production.yaml`, picked by `APP_ENVIRONMENT`
/// 3. `APP_*` env vars, e.g. `APP_APPLICATION__PORT=5001` ->
///    `Settings.application.port`
/// 4. `KLAVIYO_API_KEY`, `KLAVIYO_LIST_ID`, `KLAVIYO_URL`
///
/// All fields must be present after layering, otherwise initialisation fails
/// immediately and the server does not start.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    tracing::info!("loading config for {environment} env");

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{environment}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, hence `serde-aux` for the
            // numeric fields
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        // the provider vars keep their conventional names rather than APP_KLAVIYO__*
        .set_override_option("klaviyo.api_key", env::var("KLAVIYO_API_KEY").ok())?
        .set_override_option("klaviyo.list_id", env::var("KLAVIYO_LIST_ID").ok())?
        .set_override_option("klaviyo.base_url", env::var("KLAVIYO_URL").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}
