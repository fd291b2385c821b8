//! TOML configuration for the locator service.

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::AttemptPolicy;
use crate::locate::{
    CityResolver, GeolocationOptions, NearestAgencyRanker, DEFAULT_JITTER_DEGREES, DEFAULT_TOP_N,
    FALLBACK_POINT,
};
use crate::models::GeoPoint;

/// One year
const MAX_LOCKOUT_MINUTES: i64 = 525_600;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub locator: LocatorConfig,
    pub geolocation: GeolocationOptions,
    pub login: AttemptPolicy,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub token: Option<String>,
    /// Serve agencies from this JSON file instead of the backend
    pub agencies_file: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 10,
            token: None,
            agencies_file: None,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocatorConfig {
    pub top_n: usize,
    /// Upper bound on the `limit` query parameter
    pub max_limit: usize,
    pub jitter_degrees: f64,
    pub fallback_point: GeoPoint,
    /// Fraction of the span added around fitted map bounds
    pub bounds_padding: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            max_limit: 20,
            jitter_degrees: DEFAULT_JITTER_DEGREES,
            fallback_point: FALLBACK_POINT,
            bounds_padding: 0.1,
        }
    }
}

impl LocatorConfig {
    pub fn ranker(&self) -> NearestAgencyRanker {
        let resolver = CityResolver::new()
            .with_jitter(self.jitter_degrees)
            .with_fallback(self.fallback_point);
        NearestAgencyRanker::new(resolver).with_top_n(self.top_n)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate().context("Invalid config")?;
        Ok(config)
    }

    /// Reject values that parse as TOML but make no sense at runtime
    pub fn validate(&self) -> Result<()> {
        let locator = &self.locator;
        ensure!(
            locator.jitter_degrees.is_finite(),
            "locator.jitter_degrees must be a finite number"
        );
        ensure!(
            locator.bounds_padding.is_finite() && locator.bounds_padding >= 0.0,
            "locator.bounds_padding must be a finite, non-negative number"
        );
        ensure!(
            locator.fallback_point.is_finite(),
            "locator.fallback_point must have finite coordinates"
        );
        ensure!(locator.max_limit > 0, "locator.max_limit must be at least 1");
        ensure!(
            self.geolocation.default_reference.is_finite(),
            "geolocation.default_reference must have finite coordinates"
        );
        ensure!(
            i64::try_from(self.geolocation.maximum_age_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .is_some(),
            "geolocation.maximum_age_secs is out of range"
        );
        ensure!(
            (0..=MAX_LOCKOUT_MINUTES).contains(&self.login.lockout_minutes),
            "login.lockout_minutes must be between 0 and {}",
            MAX_LOCKOUT_MINUTES
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::DEFAULT_REFERENCE;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert_eq!(config.locator.top_n, 3);
        assert_eq!(config.geolocation.timeout_secs, 10);
        assert_eq!(config.geolocation.default_reference, DEFAULT_REFERENCE);
        assert_eq!(config.login.max_attempts, 5);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [backend]
            base_url = "https://api.vitarenta.tn/api"
            token = "secret"

            [locator]
            top_n = 5
            jitter_degrees = 0.0

            [locator.fallback_point]
            latitude = 36.0
            longitude = 10.0

            [login]
            lockout_minutes = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "https://api.vitarenta.tn/api");
        assert_eq!(config.backend.timeout(), Duration::from_secs(10));
        assert_eq!(config.locator.top_n, 5);
        assert_eq!(config.locator.max_limit, 20);
        assert_eq!(config.login.max_attempts, 5);
        assert_eq!(config.login.lockout_minutes, 30);

        let ranker = config.locator.ranker();
        assert_eq!(ranker.top_n(), 5);
        assert_eq!(ranker.resolver().jitter_degrees(), 0.0);
        assert_eq!(ranker.resolver().fallback(), GeoPoint::new(36.0, 10.0));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locator.toml");
        fs::write(&path, "[server]\nlisten = \"127.0.0.1:8080\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Config::load_from_file("/nonexistent/locator.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_non_finite_jitter_is_rejected() {
        let err = Config::from_toml("[locator]\njitter_degrees = inf\n").unwrap_err();
        assert!(format!("{err:#}").contains("jitter_degrees"));
        assert!(Config::from_toml("[locator]\njitter_degrees = nan\n").is_err());
    }

    #[test]
    fn test_out_of_range_durations_are_rejected() {
        let err = Config::from_toml("[geolocation]\nmaximum_age_secs = 10000000000000000\n")
            .unwrap_err();
        assert!(format!("{err:#}").contains("maximum_age_secs"));

        assert!(Config::from_toml("[login]\nlockout_minutes = -1\n").is_err());
        assert!(Config::from_toml("[login]\nlockout_minutes = 9223372036854775807\n").is_err());
        assert!(Config::from_toml("[login]\nlockout_minutes = 60\n").is_ok());
    }

    #[test]
    fn test_zero_max_limit_is_rejected() {
        assert!(Config::from_toml("[locator]\nmax_limit = 0\n").is_err());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[locator\ntop_n = ").is_err());
    }
}
