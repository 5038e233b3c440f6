//! Process configuration read from the environment

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PROVIDER_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_host: String,
    pub provider_base_url: String,
    /// Upper bound on retained inbound messages. `None` keeps everything.
    pub message_log_capacity: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_host: DEFAULT_BIND_HOST.to_string(),
            provider_base_url: DEFAULT_PROVIDER_BASE.to_string(),
            message_log_capacity: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, so tests don't touch the
    /// real process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);
        let bind_host = lookup("RELAY_BIND_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.bind_host);
        let provider_base_url = lookup("TWILIO_API_BASE")
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.provider_base_url);
        let message_log_capacity = lookup("MESSAGE_LOG_CAPACITY")
            .and_then(|c| c.trim().parse::<usize>().ok())
            .filter(|c| *c > 0);

        Self {
            port,
            bind_host,
            provider_base_url,
            message_log_capacity,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.provider_base_url, "https://api.twilio.com");
        assert!(config.message_log_capacity.is_none());
    }

    #[test]
    fn test_port_override() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "8080")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_provider_base_trailing_slash() {
        let config = Config::from_lookup(lookup_from(&[("TWILIO_API_BASE", "http://127.0.0.1:9000/")]));
        assert_eq!(config.provider_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let config = Config::from_lookup(lookup_from(&[("MESSAGE_LOG_CAPACITY", "0")]));
        assert!(config.message_log_capacity.is_none());

        let config = Config::from_lookup(lookup_from(&[("MESSAGE_LOG_CAPACITY", "500")]));
        assert_eq!(config.message_log_capacity, Some(500));
    }
}
