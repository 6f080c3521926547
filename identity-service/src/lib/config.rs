use std::env;

use auth::TokenLifetimes;
use auth::MAX_LIFETIME_SECONDS;
use auth::MIN_SECRET_LENGTH;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::validation::ValidationConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; without one the service keeps users in memory.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub http_port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_seconds: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_seconds: i64,
}

fn default_access_ttl() -> i64 {
    15 * 60
}

fn default_refresh_ttl() -> i64 {
    7 * 24 * 60 * 60
}

impl JwtConfig {
    /// Call after [`Config::check`], which bounds the lifetimes.
    pub fn lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access: chrono::Duration::seconds(self.access_token_ttl_seconds),
            refresh: chrono::Duration::seconds(self.refresh_token_ttl_seconds),
        }
    }
}

// Never print the signing secret.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .finish()
    }
}

const LIST_KEYS: [&str; 4] = [
    "validation.password_required_classes",
    "validation.disallowed_passwords",
    "validation.reserved_usernames",
    "validation.profane_words",
];

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, VALIDATION__PASSWORD_MIN_LENGTH, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    ///
    /// List settings read from the environment are comma separated, e.g.
    /// `VALIDATION__RESERVED_USERNAMES=admin,root`.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let environment = LIST_KEYS.iter().fold(
            Environment::default()
                .separator("__")
                .list_separator(",")
                .try_parsing(true),
            |environment, key| environment.with_list_parse_key(key),
        );

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.check()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        let ttl_range = 1..=MAX_LIFETIME_SECONDS;
        if !ttl_range.contains(&self.jwt.access_token_ttl_seconds)
            || !ttl_range.contains(&self.jwt.refresh_token_ttl_seconds)
        {
            return Err(ConfigError::Message(format!(
                "jwt token lifetimes must be between 1 and {MAX_LIFETIME_SECONDS} seconds"
            )));
        }
        if self.validation.password_min_length > self.validation.password_max_length {
            return Err(ConfigError::Message(
                "validation.password_min_length exceeds password_max_length".to_string(),
            ));
        }
        Ok(())
    }
}
