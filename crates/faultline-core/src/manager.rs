//! Registry of named retry strategies.
//!
//! Applications configure strategies once (usually from `config.toml`) and
//! look them up by name wherever an operation needs a policy.

use std::collections::HashMap;

use crate::config::FaultlineConfig;
use crate::retry::{ConfigError, RetryPolicy, RetryStrategy};

#[derive(Debug, Clone)]
pub struct RetryManager {
    strategies: HashMap<String, RetryStrategy>,
    default_name: String,
}

impl Default for RetryManager {
    /// A manager holding only the default exponential strategy, registered as `"default"`.
    fn default() -> Self {
        let name = crate::config::DEFAULT_STRATEGY_NAME.to_string();
        let mut strategies = HashMap::new();
        strategies.insert(name.clone(), RetryStrategy::default().named(name.clone()));
        Self {
            strategies,
            default_name: name,
        }
    }
}

impl RetryManager {
    /// Build a manager from named strategies. Every strategy must carry a
    /// unique name and `default_name` must be one of them.
    pub fn new(
        strategies: impl IntoIterator<Item = RetryStrategy>,
        default_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();
        for strategy in strategies {
            let name = strategy.name().unwrap_or_default().to_string();
            if map.contains_key(&name) {
                return Err(ConfigError::DuplicateStrategy(name));
            }
            map.insert(name, strategy);
        }
        let default_name = default_name.into();
        if !map.contains_key(&default_name) {
            return Err(ConfigError::UnknownStrategy(default_name));
        }
        Ok(Self {
            strategies: map,
            default_name,
        })
    }

    /// Build from configuration. With no `default_strategy`, the first
    /// configured strategy is the default; an empty config yields [`RetryManager::default`].
    pub fn from_config(cfg: &FaultlineConfig) -> Result<Self, ConfigError> {
        if cfg.strategies.is_empty() {
            if let Some(name) = &cfg.default_strategy {
                return Err(ConfigError::UnknownStrategy(name.clone()));
            }
            return Ok(Self::default());
        }
        let strategies = cfg
            .strategies
            .iter()
            .map(|s| s.to_strategy())
            .collect::<Result<Vec<_>, _>>()?;
        let default_name = cfg
            .default_strategy
            .clone()
            .unwrap_or_else(|| cfg.strategies[0].name.clone());
        let manager = Self::new(strategies, default_name)?;
        tracing::debug!(
            strategies = manager.strategies.len(),
            default_strategy = %manager.default_name,
            "retry manager configured"
        );
        Ok(manager)
    }

    pub fn strategy(&self, name: &str) -> Option<&RetryStrategy> {
        self.strategies.get(name)
    }

    pub fn default_strategy(&self) -> &RetryStrategy {
        // `new` and `default` both guarantee the default name is registered.
        &self.strategies[&self.default_name]
    }

    pub fn default_strategy_name(&self) -> &str {
        &self.default_name
    }

    /// Policy using the named strategy and the given classifier.
    pub fn policy<E, C>(&self, name: &str, classifier: C) -> Result<RetryPolicy<E, C>, ConfigError> {
        let strategy = self
            .strategy(name)
            .ok_or_else(|| ConfigError::UnknownStrategy(name.to_string()))?;
        Ok(RetryPolicy::with_classifier(strategy.clone(), classifier))
    }

    /// Policy using the default strategy and the given classifier.
    pub fn default_policy<E, C>(&self, classifier: C) -> RetryPolicy<E, C> {
        RetryPolicy::with_classifier(self.default_strategy().clone(), classifier)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{from_toml_str, StrategyConfig};
    use crate::retry::AlwaysTransient;
    use std::time::Duration;

    #[test]
    fn default_manager_has_default_exponential() {
        let m = RetryManager::default();
        assert_eq!(m.default_strategy_name(), "default");
        assert_eq!(m.default_strategy().retry_count(), 10);
        assert_eq!(m.names().count(), 1);
    }

    #[test]
    fn from_config_uses_declared_default() {
        let cfg = from_toml_str(
            r#"
            default_strategy = "quick"

            [[strategy]]
            name = "slow"

            [[strategy]]
            name = "quick"
            kind = "fixed"
            retry_count = 2
            retry_interval_secs = 0.01
            "#,
        )
        .unwrap();
        let m = RetryManager::from_config(&cfg).unwrap();
        assert_eq!(m.default_strategy().name(), Some("quick"));
        assert!(m.strategy("slow").is_some());
        let policy = m.policy::<String, _>("quick", AlwaysTransient).unwrap();
        assert_eq!(policy.strategy().retry_count(), 2);
        assert!(matches!(
            m.policy::<String, _>("missing", AlwaysTransient),
            Err(ConfigError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn first_strategy_is_default_when_unspecified() {
        let cfg = FaultlineConfig {
            default_strategy: None,
            strategies: vec![StrategyConfig::exponential("a"), StrategyConfig::exponential("b")],
        };
        let m = RetryManager::from_config(&cfg).unwrap();
        assert_eq!(m.default_strategy_name(), "a");
    }

    #[test]
    fn duplicate_and_unknown_names_rejected() {
        let dup = FaultlineConfig {
            default_strategy: None,
            strategies: vec![StrategyConfig::exponential("x"), StrategyConfig::exponential("x")],
        };
        assert_eq!(
            RetryManager::from_config(&dup).unwrap_err(),
            ConfigError::DuplicateStrategy("x".into())
        );

        let unknown = RetryManager::new(
            vec![RetryStrategy::fixed(1, Duration::ZERO).named("only")],
            "other",
        );
        assert_eq!(unknown.unwrap_err(), ConfigError::UnknownStrategy("other".into()));

        let empty_with_default = FaultlineConfig {
            default_strategy: Some("ghost".into()),
            strategies: Vec::new(),
        };
        assert!(RetryManager::from_config(&empty_with_default).is_err());
    }
}
