use anyhow::{Context, Result};
use ::config::{Config, ConfigBuilder, ConfigError, Environment, Map, builder::DefaultState};
use serde::{Deserialize, de::DeserializeOwned};

/// Read from `SERVER_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_grace_secs: u64,
    pub request_timeout_secs: u64,
}

/// Read from `DATABASE_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Read from `RAZORPAY_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayConfig {
    pub key: String,
    pub secret: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Read from `JWT_SECRET_KEY`, `JWT_ACC_TOKEN_EXP_MINS` and `JWT_REFRESH_TOKEN_EXP_MINS`.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    #[serde(rename = "secret_key")]
    pub secret: String,
    #[serde(rename = "acc_token_exp_mins")]
    pub access_token_exp_mins: i64,
    pub refresh_token_exp_mins: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub razorpay: RazorpayConfig,
    pub jwt: JwtConfig,
}

type Builder = ConfigBuilder<DefaultState>;

/// Loads the configuration from the process environment. Call
/// [`crate::bootstrap::init_env`] first so `.env` values are visible.
pub fn load() -> Result<AppConfig> {
    AppConfig::from_env(None)
}

impl AppConfig {
    /// `vars` replaces the process environment when given.
    pub fn from_env(vars: Option<Map<String, String>>) -> Result<Self> {
        Ok(Self {
            server: section("SERVER", &vars, |builder| {
                builder
                    .set_default("host", "0.0.0.0")?
                    .set_default("port", 8080_i64)?
                    .set_default("shutdown_grace_secs", 10_i64)?
                    .set_default("request_timeout_secs", 30_i64)
            })?,
            database: section("DATABASE", &vars, |builder| {
                builder
                    .set_default("max_connections", 10_i64)?
                    .set_default("connect_timeout_secs", 5_i64)
            })?,
            razorpay: section("RAZORPAY", &vars, |builder| {
                builder
                    .set_default("base_url", "https://api.razorpay.com")?
                    .set_default("timeout_secs", 10_i64)
            })?,
            jwt: section("JWT", &vars, |builder| {
                builder
                    .set_default("acc_token_exp_mins", 15_i64)?
                    .set_default("refresh_token_exp_mins", 1440_i64)
            })?,
        })
    }
}

/// Deserializes the variables sharing `prefix` into one section, keyed by the
/// lowercased remainder of each name.
fn section<T, F>(prefix: &str, vars: &Option<Map<String, String>>, defaults: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce(Builder) -> Result<Builder, ConfigError>,
{
    defaults(Config::builder())
        .and_then(|builder| {
            builder
                .add_source(Environment::with_prefix(prefix).source(vars.clone()))
                .build()
        })
        .and_then(Config::try_deserialize)
        .with_context(|| format!("Invalid {prefix}_* configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("DATABASE_URL", "postgres://localhost/theatre"),
        ("RAZORPAY_KEY", "rzp_test_key"),
        ("RAZORPAY_SECRET", "rzp_secret"),
        ("JWT_SECRET_KEY", "jwt_secret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = AppConfig::from_env(vars(&REQUIRED)).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.shutdown_grace_secs, 10);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.razorpay.base_url, "https://api.razorpay.com");
        assert_eq!(config.jwt.secret, "jwt_secret");
        assert_eq!(config.jwt.access_token_exp_mins, 15);
        assert_eq!(config.jwt.refresh_token_exp_mins, 1440);
    }

    #[test]
    fn environment_overrides_defaults() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SERVER_PORT", "9090"),
            ("SERVER_REQUEST_TIMEOUT_SECS", "5"),
            ("JWT_ACC_TOKEN_EXP_MINS", "30"),
        ]);

        let config = AppConfig::from_env(vars(&pairs)).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.request_timeout_secs, 5);
        assert_eq!(config.jwt.access_token_exp_mins, 30);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_env(vars(&REQUIRED[..3])).unwrap_err();
        let message = format!("{err:#}");

        assert!(message.contains("JWT_"), "{message}");
        assert!(message.contains("secret_key"), "{message}");
    }

    #[test]
    fn malformed_number_names_the_variable() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("JWT_ACC_TOKEN_EXP_MINS", "soon"));

        let err = AppConfig::from_env(vars(&pairs)).unwrap_err();
        let message = format!("{err:#}");

        assert!(message.contains("JWT_"), "{message}");
        assert!(message.contains("acc_token_exp_mins"), "{message}");
    }
}
