mod properties;

pub use properties::WebProperties;

use crate::error::{RestlineError, Result};
use dashmap::DashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// Key/value configuration seeded from the process environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Service holding every environment variable of the process.
    pub fn from_env() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    /// Empty service, mostly for tests.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Parse `key`, `None` when unset.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| RestlineError::Config {
                    key: key.to_string(),
                    message: format!("{raw:?}: {e}"),
                })
            })
            .transpose()
    }

    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.get_parsed(key)?.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_parsed() {
        let config = ConfigService::empty();
        config.set("SERVER_PORT", " 9090 ");
        config.set("WEB_BODY_LIMIT", "lots");

        assert_eq!(config.get_parsed::<u16>("SERVER_PORT").unwrap(), Some(9090));
        assert_eq!(config.get_parsed::<u16>("MISSING").unwrap(), None);
        assert_eq!(config.get_or("MISSING", 7_u8).unwrap(), 7);
        assert!(matches!(
            config.get_parsed::<usize>("WEB_BODY_LIMIT"),
            Err(RestlineError::Config { key, .. }) if key == "WEB_BODY_LIMIT"
        ));
    }

    #[test]
    fn test_clones_share_values() {
        let config = ConfigService::empty();
        let other = config.clone();
        other.set("WEB_DEFAULT_LOCALE", "zh-CN");
        assert_eq!(config.get("WEB_DEFAULT_LOCALE").as_deref(), Some("zh-CN"));
    }
}
