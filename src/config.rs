//! Typed configuration, modeled on the original system's `cleanenv`-based
//! loader: a `CONFIG_PATH` TOML file, then `ABF_*` environment overrides,
//! then one validation pass that aggregates every offending field.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::store::StoreConfig;

/// Per-scope limiter configuration (login, password, or ip).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimiterConfig {
    /// Also the bucket `capacity`.
    pub max_attempts_per_minute: u32,
    /// Sweeper eviction age.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Sweeper wake interval.
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl LimiterConfig {
    fn validate(&self, scope: &str, errors: &mut Vec<String>) {
        if self.max_attempts_per_minute == 0 {
            errors.push(format!("limiters.{scope}.max_attempts_per_minute must be > 0"));
        }
        if self.ttl.is_zero() {
            errors.push(format!("limiters.{scope}.ttl must be > 0"));
        }
        if self.cleanup_interval.is_zero() {
            errors.push(format!("limiters.{scope}.cleanup_interval must be > 0"));
        }
    }

    /// Convert to the `StoreConfig` a `KeyedBucketStore` is built from.
    pub fn to_store_config(self) -> StoreConfig {
        StoreConfig {
            capacity: self.max_attempts_per_minute,
            ttl: self.ttl,
            sweep_interval: self.cleanup_interval,
        }
    }
}

/// The three limiter scopes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Limiters {
    pub login: LimiterConfig,
    pub password: LimiterConfig,
    pub ip: LimiterConfig,
}

/// Opaque connection parameters for the durable subnet-store backend,
/// consumed only by the `postgres` feature.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubnetStoreSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub sslmode: Option<String>,
}

/// The port a transport binding would listen on.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListenConfig {
    pub port: u16,
}

/// Top-level application configuration, immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub limiters: Limiters,
    #[serde(default)]
    pub subnet_store: SubnetStoreSettings,
    pub listen: ListenConfig,
}

impl AppConfig {
    /// Load from the TOML file named by `CONFIG_PATH`, apply `ABF_*`
    /// environment overrides, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("CONFIG_PATH")
            .map_err(|_| ConfigError::LoadFailed("CONFIG_PATH is not set".to_string()))?;
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::LoadFailed(format!("reading {path}: {e}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse a TOML document, apply environment overrides, then validate.
    /// Exposed separately from [`Self::load`] so tests can exercise it
    /// without a filesystem round trip.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig =
            toml::from_str(raw).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_u32("ABF_LOGIN_MAX_ATTEMPTS_PER_MINUTE") {
            self.limiters.login.max_attempts_per_minute = v;
        }
        if let Some(v) = env_u32("ABF_PASSWORD_MAX_ATTEMPTS_PER_MINUTE") {
            self.limiters.password.max_attempts_per_minute = v;
        }
        if let Some(v) = env_u32("ABF_IP_MAX_ATTEMPTS_PER_MINUTE") {
            self.limiters.ip.max_attempts_per_minute = v;
        }
        if let Ok(v) = env::var("ABF_SUBNET_STORE_HOST") {
            self.subnet_store.host = Some(v);
        }
        if let Some(v) = env_u16("ABF_SUBNET_STORE_PORT") {
            self.subnet_store.port = Some(v);
        }
        if let Some(v) = env_u16("ABF_LISTEN_PORT") {
            self.listen.port = v;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        self.limiters.login.validate("login", &mut errors);
        self.limiters.password.validate("password", &mut errors);
        self.limiters.ip.validate("ip", &mut errors);
        if self.listen.port == 0 {
            errors.push("listen.port must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}

fn env_u32(name: &str) -> Option<u32> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_u16(name: &str) -> Option<u16> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
