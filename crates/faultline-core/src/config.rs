use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{
    ConfigError, RetryStrategy, DEFAULT_DELTA_BACKOFF, DEFAULT_FIRST_FAST_RETRY,
    DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_BACKOFF, DEFAULT_MIN_BACKOFF, DEFAULT_RETRY_COUNT,
    DEFAULT_RETRY_INCREMENT, DEFAULT_RETRY_INTERVAL,
};

/// Name of the strategy written into a freshly created config file.
pub const DEFAULT_STRATEGY_NAME: &str = "default";

/// Backoff variant of a configured strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Fixed,
    Incremental,
    #[default]
    Exponential,
}

/// One `[[strategy]]` table. Parameters that don't apply to `kind` are ignored;
/// missing ones fall back to the library defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    #[serde(default)]
    pub kind: StrategyKind,
    /// Maximum number of retries (not counting the first attempt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_fast_retry: Option<bool>,
    /// Fixed: wait between attempts, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_interval_secs: Option<f64>,
    /// Incremental: first wait, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_interval_secs: Option<f64>,
    /// Incremental: added to the wait on each further attempt, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_secs: Option<f64>,
    /// Exponential: lower bound of the delay, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_backoff_secs: Option<f64>,
    /// Exponential: upper bound of the delay, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_backoff_secs: Option<f64>,
    /// Exponential: base of the randomized delta, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_backoff_secs: Option<f64>,
}

impl StrategyConfig {
    /// Exponential strategy with every parameter at its default.
    pub fn exponential(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StrategyKind::Exponential,
            retry_count: Some(DEFAULT_RETRY_COUNT as i64),
            first_fast_retry: Some(DEFAULT_FIRST_FAST_RETRY),
            retry_interval_secs: None,
            initial_interval_secs: None,
            increment_secs: None,
            min_backoff_secs: Some(DEFAULT_MIN_BACKOFF.as_secs_f64()),
            max_backoff_secs: Some(DEFAULT_MAX_BACKOFF.as_secs_f64()),
            delta_backoff_secs: Some(DEFAULT_DELTA_BACKOFF.as_secs_f64()),
        }
    }

    /// Validate and build the strategy this table describes.
    pub fn to_strategy(&self) -> Result<RetryStrategy, ConfigError> {
        let retry_count = match self.retry_count {
            None => DEFAULT_RETRY_COUNT,
            Some(n) => u32::try_from(n).map_err(|_| ConfigError::InvalidRetryCount(n))?,
        };
        let strategy = match self.kind {
            StrategyKind::Fixed => RetryStrategy::fixed(
                retry_count,
                secs("retry_interval_secs", self.retry_interval_secs, DEFAULT_RETRY_INTERVAL)?,
            ),
            StrategyKind::Incremental => RetryStrategy::incremental(
                retry_count,
                secs("initial_interval_secs", self.initial_interval_secs, DEFAULT_INITIAL_INTERVAL)?,
                secs("increment_secs", self.increment_secs, DEFAULT_RETRY_INCREMENT)?,
            ),
            StrategyKind::Exponential => RetryStrategy::exponential(
                retry_count,
                secs("min_backoff_secs", self.min_backoff_secs, DEFAULT_MIN_BACKOFF)?,
                secs("max_backoff_secs", self.max_backoff_secs, DEFAULT_MAX_BACKOFF)?,
                secs("delta_backoff_secs", self.delta_backoff_secs, DEFAULT_DELTA_BACKOFF)?,
            )?,
        };
        Ok(strategy
            .named(self.name.clone())
            .with_first_fast_retry(self.first_fast_retry.unwrap_or(DEFAULT_FIRST_FAST_RETRY)))
    }
}

fn secs(field: &str, value: Option<f64>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => Duration::try_from_secs_f64(v).map_err(|_| ConfigError::InvalidDuration {
            field: field.to_string(),
            value: v,
        }),
    }
}

/// Global configuration loaded from `~/.config/faultline/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaultlineConfig {
    /// Strategy used when a caller asks for the default; must name one of `strategies`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_strategy: Option<String>,
    #[serde(default, rename = "strategy")]
    pub strategies: Vec<StrategyConfig>,
}

impl FaultlineConfig {
    /// The config written on first run: a single default exponential strategy.
    pub fn with_default_strategy() -> Self {
        Self {
            default_strategy: Some(DEFAULT_STRATEGY_NAME.to_string()),
            strategies: vec![StrategyConfig::exponential(DEFAULT_STRATEGY_NAME)],
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("faultline")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FaultlineConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`], at an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<FaultlineConfig> {
    if !path.exists() {
        let default_cfg = FaultlineConfig::with_default_strategy();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

pub fn load_from_path(path: &Path) -> Result<FaultlineConfig> {
    let data = fs::read_to_string(path)?;
    from_toml_str(&data)
}

pub fn from_toml_str(data: &str) -> Result<FaultlineConfig> {
    let cfg: FaultlineConfig = toml::from_str(data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoff;

    #[test]
    fn default_config_values() {
        let cfg = FaultlineConfig::with_default_strategy();
        assert_eq!(cfg.default_strategy.as_deref(), Some("default"));
        assert_eq!(cfg.strategies.len(), 1);
        let s = cfg.strategies[0].to_strategy().unwrap();
        assert_eq!(s.name(), Some("default"));
        assert_eq!(s.retry_count(), 10);
        assert!(!s.first_fast_retry());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FaultlineConfig::with_default_strategy();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed = from_toml_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_all_kinds() {
        let toml = r#"
            default_strategy = "steady"

            [[strategy]]
            name = "steady"
            kind = "fixed"
            retry_count = 3
            retry_interval_secs = 0.5

            [[strategy]]
            name = "ramp"
            kind = "incremental"
            initial_interval_secs = 1
            increment_secs = 2.5
            first_fast_retry = true

            [[strategy]]
            name = "backoff"
            min_backoff_secs = 0.1
            max_backoff_secs = 10
        "#;
        let cfg = from_toml_str(toml).unwrap();
        assert_eq!(cfg.strategies.len(), 3);

        let steady = cfg.strategies[0].to_strategy().unwrap();
        match steady.backoff() {
            Backoff::Fixed(f) => {
                assert_eq!(f.retry_count(), 3);
                assert_eq!(f.retry_interval(), Duration::from_millis(500));
            }
            other => panic!("expected fixed, got {:?}", other),
        }

        let ramp = cfg.strategies[1].to_strategy().unwrap();
        assert!(ramp.first_fast_retry());
        match ramp.backoff() {
            Backoff::Incremental(i) => {
                assert_eq!(i.retry_count(), DEFAULT_RETRY_COUNT);
                assert_eq!(i.increment(), Duration::from_millis(2500));
            }
            other => panic!("expected incremental, got {:?}", other),
        }

        let backoff = cfg.strategies[2].to_strategy().unwrap();
        match backoff.backoff() {
            Backoff::ExponentialBackoff(e) => {
                assert_eq!(e.min_backoff(), Duration::from_millis(100));
                assert_eq!(e.max_backoff(), Duration::from_secs(10));
                assert_eq!(e.delta_backoff(), DEFAULT_DELTA_BACKOFF);
            }
            other => panic!("expected exponential, got {:?}", other),
        }
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let mut s = StrategyConfig::exponential("bad");
        s.min_backoff_secs = Some(-1.0);
        assert!(matches!(
            s.to_strategy(),
            Err(ConfigError::InvalidDuration { ref field, .. }) if field == "min_backoff_secs"
        ));

        let mut s = StrategyConfig::exponential("bad");
        s.min_backoff_secs = Some(40.0);
        assert!(matches!(s.to_strategy(), Err(ConfigError::InvalidBackoffRange { .. })));

        let mut s = StrategyConfig::exponential("bad");
        s.retry_count = Some(-2);
        assert_eq!(s.to_strategy(), Err(ConfigError::InvalidRetryCount(-2)));

        let mut s = StrategyConfig::exponential("bad");
        s.kind = StrategyKind::Fixed;
        s.retry_interval_secs = Some(f64::NAN);
        assert!(s.to_strategy().is_err());
    }

    #[test]
    fn load_or_init_creates_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[[strategy]]\nkind = \"fixed\"\n").unwrap();
        assert!(load_from_path(&path).is_err());
    }
}
