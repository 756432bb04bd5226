//! Validator configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use geokyc_evidence::EvidencePaths;
use geokyc_providers::{HttpSettings, RetryPolicy, DEFAULT_LOTUS_URL, SKIP_SENTINEL};
use geokyc_types::FRESHNESS_WINDOW_EPOCHS;
use geokyc_utils::LogFormat;
use geokyc_verification::{
    MatchSettings, DEFAULT_MAX_CONCURRENT_LOOKUPS, DEFAULT_MAX_DISTANCE_KM,
    DEFAULT_MIN_POWER_BYTES,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for a validation run.
///
/// Loaded from a TOML file via [`ValidatorConfig::from_toml_file`]; every
/// field has a default so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Miner ↔ IP observation snapshot.
    #[serde(default = "default_multiaddrs_ips_path")]
    pub multiaddrs_ips_path: PathBuf,

    /// GeoLite2 lookups keyed by IP.
    #[serde(default = "default_ips_geolite2_path")]
    pub ips_geolite2_path: PathBuf,

    /// Baidu lookups keyed by IP.
    #[serde(default = "default_ips_baidu_path")]
    pub ips_baidu_path: PathBuf,

    /// MaxMind account id; `"skip"` disables the commercial tier.
    #[serde(default)]
    pub maxmind_user_id: Option<String>,

    #[serde(default)]
    pub maxmind_license_key: Option<String>,

    /// Google Maps key; absent or `"skip"` disables geocoding.
    #[serde(default)]
    pub google_maps_api_key: Option<String>,

    #[serde(default = "default_lotus_rpc_url")]
    pub lotus_rpc_url: String,

    /// Per-request timeout for every provider call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries after the first attempt for transient provider failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Commercial GeoIP lookups in flight at once.
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,

    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,

    #[serde(default = "default_freshness_window_epochs")]
    pub freshness_window_epochs: u64,

    /// Minimum quality-adjusted power in bytes.
    #[serde(default = "default_min_power_bytes")]
    pub min_power_bytes: u64,

    /// Fixed chain epoch; unset or zero asks the Lotus node.
    #[serde(default)]
    pub epoch: Option<u64>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_multiaddrs_ips_path() -> PathBuf {
    EvidencePaths::default().multiaddrs_ips
}

fn default_ips_geolite2_path() -> PathBuf {
    EvidencePaths::default().ips_geolite2
}

fn default_ips_baidu_path() -> PathBuf {
    EvidencePaths::default().ips_baidu
}

fn default_lotus_rpc_url() -> String {
    DEFAULT_LOTUS_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    RetryPolicy::default().max_retries
}

fn default_max_concurrent_lookups() -> usize {
    DEFAULT_MAX_CONCURRENT_LOOKUPS
}

fn default_max_distance_km() -> f64 {
    DEFAULT_MAX_DISTANCE_KM
}

fn default_freshness_window_epochs() -> u64 {
    FRESHNESS_WINDOW_EPOCHS
}

fn default_min_power_bytes() -> u64 {
    DEFAULT_MIN_POWER_BYTES as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ValidatorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_distance_km.is_finite() && self.max_distance_km > 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_distance_km",
                reason: format!("must be a positive number, got {}", self.max_distance_km),
            });
        }
        if self.max_concurrent_lookups == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_lookups",
                reason: "must be at least 1".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// A copy with secrets masked, for display. The `skip` sentinel is kept.
    pub fn redacted(&self) -> Self {
        let mask = |secret: &Option<String>| {
            secret.as_ref().map(|value| {
                if value == SKIP_SENTINEL {
                    value.clone()
                } else {
                    "<redacted>".to_string()
                }
            })
        };
        Self {
            maxmind_license_key: mask(&self.maxmind_license_key),
            google_maps_api_key: mask(&self.google_maps_api_key),
            ..self.clone()
        }
    }

    pub fn evidence_paths(&self) -> EvidencePaths {
        EvidencePaths {
            multiaddrs_ips: self.multiaddrs_ips_path.clone(),
            ips_geolite2: self.ips_geolite2_path.clone(),
            ips_baidu: self.ips_baidu_path.clone(),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        let defaults = HttpSettings::default();
        HttpSettings {
            timeout: Duration::from_secs(self.request_timeout_secs),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..defaults.retry
            },
            ..defaults
        }
    }

    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            max_distance_km: self.max_distance_km,
            freshness_window_epochs: self.freshness_window_epochs,
            max_concurrent_lookups: self.max_concurrent_lookups,
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            multiaddrs_ips_path: default_multiaddrs_ips_path(),
            ips_geolite2_path: default_ips_geolite2_path(),
            ips_baidu_path: default_ips_baidu_path(),
            maxmind_user_id: None,
            maxmind_license_key: None,
            google_maps_api_key: None,
            lotus_rpc_url: default_lotus_rpc_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            max_distance_km: default_max_distance_km(),
            freshness_window_epochs: default_freshness_window_epochs(),
            min_power_bytes: default_min_power_bytes(),
            epoch: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ValidatorConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ValidatorConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ValidatorConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.max_distance_km, 600.0);
        assert_eq!(config.freshness_window_epochs, 40_320);
        assert_eq!(config.min_power_bytes, 10_995_116_277_760);
        assert_eq!(config.lotus_rpc_url, "https://api.chain.love/rpc/v1");
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(config.google_maps_api_key.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            maxmind_user_id = "skip"
            maxmind_license_key = "skip"
            max_distance_km = 250.0
            log_format = "json"
            epoch = 2100000
        "#;
        let config = ValidatorConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.maxmind_user_id.as_deref(), Some("skip"));
        assert_eq!(config.match_settings().max_distance_km, 250.0);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.epoch, Some(2_100_000));
        assert_eq!(config.max_retries, 2); // default
    }

    #[test]
    fn rejects_non_positive_distance() {
        let err = ValidatorConfig::from_toml_str("max_distance_km = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_distance_km", .. }));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = ValidatorConfig::from_toml_str("max_concurrent_lookups = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_concurrent_lookups", .. }));
    }

    #[test]
    fn http_settings_follow_config() {
        let config = ValidatorConfig::from_toml_str("request_timeout_secs = 3\nmax_retries = 0")
            .unwrap();
        let settings = config.http_settings();
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.retry.max_retries, 0);
    }

    #[test]
    fn redaction_masks_secrets_but_keeps_sentinel() {
        let config = ValidatorConfig {
            maxmind_user_id: Some("123456".into()),
            maxmind_license_key: Some("s3cret".into()),
            google_maps_api_key: Some("skip".into()),
            ..ValidatorConfig::default()
        };
        let shown = config.redacted();
        assert_eq!(shown.maxmind_user_id.as_deref(), Some("123456"));
        assert_eq!(shown.maxmind_license_key.as_deref(), Some("<redacted>"));
        assert_eq!(shown.google_maps_api_key.as_deref(), Some("skip"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ips_baidu_path = \"/data/ips-baidu.json\"").unwrap();
        let config = ValidatorConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(
            config.evidence_paths().ips_baidu,
            PathBuf::from("/data/ips-baidu.json")
        );
    }

    #[test]
    fn missing_file_returns_read_error() {
        let err = ValidatorConfig::from_toml_file(Path::new("/nonexistent/geokyc.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
