use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password_hashing: PasswordHashingConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Upper bound for every store call.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordHashingConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    /// Hash/verify jobs allowed on the blocking pool at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    /// Mailer endpoint; invitations are only logged as undelivered when absent.
    pub webhook_url: Option<String>,
    #[serde(default = "default_delivery_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_ms: default_delivery_timeout_ms(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_operation_timeout_ms() -> u64 {
    3000
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_max_concurrent() -> usize {
    4
}

fn default_delivery_timeout_ms() -> u64 {
    5000
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }
        if self.database.operation_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "database.operation_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        let config: Config = ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_are_applied() {
        let config = parse(
            r#"
            [server]
            http_port = 3000

            [database]
            url = "postgres://localhost/field_service"

            [jwt]
            secret = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.operation_timeout_ms, 3000);
        assert_eq!(config.password_hashing.memory_kib, 19456);
        assert_eq!(config.password_hashing.max_concurrent, 4);
        assert_eq!(config.delivery.webhook_url, None);
        assert_eq!(config.delivery.timeout_ms, 5000);
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = parse(
            r#"
            [server]
            http_port = 3000

            [database]
            url = "postgres://localhost/field_service"

            [jwt]
            secret = "too-short"
            "#,
        );

        assert!(matches!(result, Err(ConfigError::Message(_))));
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = parse(
            r#"
            [server]
            http_port = 3000

            [database]
            url = "postgres://localhost/field_service"
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_secret_is_not_printed() {
        let jwt = JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
        };
        assert!(!format!("{:?}", jwt).contains("0123456789"));
    }
}
