//! Report API configuration module.
//!
//! Settings come from an optional `report-api.toml` in the working directory,
//! overridden by `POSREPORT_`-prefixed environment variables
//! (`POSREPORT_JWT_SECRET`, `POSREPORT_PORT`, ...).

use serde::Deserialize;
use std::path::PathBuf;

/// Base name of the optional configuration file.
pub const CONFIG_FILE: &str = "report-api";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "POSREPORT";

/// Shortest accepted JWT signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Report API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Interface to bind
    pub bind_address: String,

    /// HTTP port
    pub port: u16,

    /// Master catalog SQLite file
    pub master_db_path: PathBuf,

    /// Directory relative SQLite tenant paths resolve against
    pub tenant_data_dir: PathBuf,

    /// Max connections per tenant pool
    pub tenant_pool_size: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// JWT refresh token lifetime in seconds (also the session lifetime)
    pub jwt_refresh_lifetime_secs: i64,

    /// Activate self-registered users immediately
    pub auto_activate_signups: bool,

    /// Super-admin created at startup when none exists
    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,

    /// Front-end build to serve for non-API paths
    pub static_dir: Option<PathBuf>,

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            master_db_path: PathBuf::from("./data/master.db"),
            tenant_data_dir: PathBuf::from("./data/tenants"),
            tenant_pool_size: 5,
            jwt_secret: String::new(),
            jwt_access_lifetime_secs: 3600,     // 1 hour
            jwt_refresh_lifetime_secs: 604_800, // 7 days
            auto_activate_signups: false,
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
            static_dir: None,
            log_filter: "info,report_api=debug,posreport_db=info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from `report-api.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration using `file` (extension optional) as the file layer.
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field rules the deserializer can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidValue {
                field: "jwt_secret".to_string(),
                reason: format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
            });
        }
        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "jwt_access_lifetime_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.jwt_refresh_lifetime_secs < self.jwt_access_lifetime_secs {
            return Err(ConfigError::InvalidValue {
                field: "jwt_refresh_lifetime_secs".to_string(),
                reason: "must not be shorter than the access token lifetime".to_string(),
            });
        }
        if self.tenant_pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tenant_pool_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        match (&self.bootstrap_admin_username, &self.bootstrap_admin_password) {
            (Some(_), None) => Err(ConfigError::MissingRequired("bootstrap_admin_password".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingRequired("bootstrap_admin_username".to_string())),
            _ => Ok(()),
        }
    }

    /// Socket address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.jwt_refresh_lifetime_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ApiConfig {
        ApiConfig {
            jwt_secret: "0123456789abcdef-test".to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_defaults_need_a_secret() {
        let err = ApiConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref f) if f == "jwt_secret"));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = ApiConfig {
            jwt_secret: "too-short".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_bootstrap_credentials_come_in_pairs() {
        let config = ApiConfig {
            bootstrap_admin_username: Some("root".to_string()),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(ref f)) if f == "bootstrap_admin_password"
        ));

        let config = ApiConfig {
            bootstrap_admin_username: Some("root".to_string()),
            bootstrap_admin_password: Some("correct horse battery".to_string()),
            ..valid()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refresh_shorter_than_access_rejected() {
        let config = ApiConfig {
            jwt_access_lifetime_secs: 600,
            jwt_refresh_lifetime_secs: 60,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
            port = 9090
            jwt_secret = "file-secret-0123456789"
            auto_activate_signups = true
            static_dir = "./web"
            "#,
        )
        .unwrap();

        let config = ApiConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.port, 9090);
        assert!(config.auto_activate_signups);
        assert_eq!(config.static_dir, Some(PathBuf::from("./web")));
        assert_eq!(config.tenant_pool_size, 5);
        assert_eq!(config.listen_addr(), "0.0.0.0:9090");
    }
}
