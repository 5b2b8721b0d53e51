// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

use crate::errors::ConfigError;
use crate::processor::BatchContext;

pub const DEFAULT_APP: &str = "logdrain";
pub const DEFAULT_METRIC_PREFIX: &str = "heroku.";
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub app: String,
    pub tags: Vec<String>,
    pub metric_prefix: String,
    pub queue_capacity: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let queue_capacity = match lookup("DRAIN_QUEUE_CAPACITY") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "DRAIN_QUEUE_CAPACITY",
                        value,
                    })
                }
            },
            None => DEFAULT_QUEUE_CAPACITY,
        };

        Ok(Config {
            app: lookup("DRAIN_APP").unwrap_or_else(|| DEFAULT_APP.to_string()),
            tags: lookup("DRAIN_TAGS")
                .map(|tags| parse_tags(&tags))
                .unwrap_or_default(),
            metric_prefix: lookup("DRAIN_METRIC_PREFIX")
                .unwrap_or_else(|| DEFAULT_METRIC_PREFIX.to_string()),
            queue_capacity,
            log_level: lookup("DRAIN_LOG_LEVEL")
                .map(|val| val.to_lowercase())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    pub fn batch_context(&self) -> BatchContext {
        BatchContext::new(&self.app, self.tags.clone(), &self.metric_prefix)
    }
}

/// Splits a tag list on spaces or commas, dropping empty entries.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.app, DEFAULT_APP);
        assert!(config.tags.is_empty());
        assert_eq!(config.metric_prefix, DEFAULT_METRIC_PREFIX);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DRAIN_APP", "myapp"),
            ("DRAIN_TAGS", "env:prod, team:web  region:eu"),
            ("DRAIN_METRIC_PREFIX", "drain."),
            ("DRAIN_QUEUE_CAPACITY", " 64 "),
            ("DRAIN_LOG_LEVEL", "DEBUG"),
        ])
        .unwrap();
        assert_eq!(config.app, "myapp");
        assert_eq!(config.tags, vec!["env:prod", "team:web", "region:eu"]);
        assert_eq!(config.metric_prefix, "drain.");
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_queue_capacity() {
        for value in ["0", "-3", "lots"] {
            let err = config_from(&[("DRAIN_QUEUE_CAPACITY", value)]).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    name: "DRAIN_QUEUE_CAPACITY",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_batch_context() {
        let config = config_from(&[("DRAIN_APP", "myapp"), ("DRAIN_TAGS", "a:1")]).unwrap();
        let ctx = config.batch_context();
        assert_eq!(ctx.app.as_str(), "myapp");
        assert_eq!(ctx.tags.as_slice(), ["a:1".to_string()]);
        assert_eq!(ctx.prefix.as_str(), DEFAULT_METRIC_PREFIX);
    }
}
