use crate::config::ConfigService;
use crate::error::Result;
use std::net::SocketAddr;

pub const SERVER_HOST: &str = "SERVER_HOST";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const WEB_BODY_LIMIT: &str = "WEB_BODY_LIMIT";
pub const WEB_CONTEXT_POOL_CAPACITY: &str = "WEB_CONTEXT_POOL_CAPACITY";
pub const WEB_DEFAULT_LOCALE: &str = "WEB_DEFAULT_LOCALE";

const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;
const CONTEXTS_PER_CPU: usize = 64;

/// Settings of the web server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebProperties {
    pub host: String,
    pub port: u16,
    /// Largest request body read into memory, in bytes.
    pub body_limit: usize,
    /// Idle request contexts kept for reuse.
    pub context_pool_capacity: usize,
    pub default_locale: String,
}

impl Default for WebProperties {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            body_limit: DEFAULT_BODY_LIMIT,
            context_pool_capacity: num_cpus::get() * CONTEXTS_PER_CPU,
            default_locale: "en-US".to_string(),
        }
    }
}

impl WebProperties {
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: config.get(SERVER_HOST).unwrap_or(defaults.host),
            port: config.get_or(SERVER_PORT, defaults.port)?,
            body_limit: config.get_or(WEB_BODY_LIMIT, defaults.body_limit)?,
            context_pool_capacity: config
                .get_or(WEB_CONTEXT_POOL_CAPACITY, defaults.context_pool_capacity)?,
            default_locale: config
                .get(WEB_DEFAULT_LOCALE)
                .unwrap_or(defaults.default_locale),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&ConfigService::from_env())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.address().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestlineError;

    #[test]
    fn test_defaults() {
        let properties = WebProperties::from_config(&ConfigService::empty()).unwrap();
        assert_eq!(properties.address(), "0.0.0.0:8080");
        assert_eq!(properties.body_limit, 2_097_152);
        assert_eq!(properties.default_locale, "en-US");
        assert!(properties.context_pool_capacity >= CONTEXTS_PER_CPU);
    }

    #[test]
    fn test_overrides() {
        let config = ConfigService::empty();
        config.set(SERVER_HOST, "127.0.0.1");
        config.set(SERVER_PORT, "3000");
        config.set(WEB_CONTEXT_POOL_CAPACITY, "4");
        let properties = WebProperties::from_config(&config).unwrap();
        assert_eq!(properties.socket_addr(), Some("127.0.0.1:3000".parse().unwrap()));
        assert_eq!(properties.context_pool_capacity, 4);

        config.set(SERVER_PORT, "http");
        assert!(matches!(
            WebProperties::from_config(&config),
            Err(RestlineError::Config { .. })
        ));
    }
}
