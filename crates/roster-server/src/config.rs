use std::net::{Ipv4Addr, SocketAddr};

/// Server configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `ROSTER_LISTEN_ADDR` wins over `PORT`; with neither set the server
    /// listens on 0.0.0.0:3000.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listen_addr = match (var("ROSTER_LISTEN_ADDR"), var("PORT")) {
            (Some(addr), _) => addr.parse().map_err(|_| {
                ConfigError::Invalid("ROSTER_LISTEN_ADDR", "must be a valid socket address")
            })?,
            (None, Some(port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PORT", "must be a valid port number"))?;
                SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
            }
            (None, None) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
        };

        Ok(Config { listen_addr })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse().unwrap());
    }

    #[test]
    fn test_port_only() {
        let config = load(&[("PORT", "8080")]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn test_listen_addr_wins_over_port() {
        let config = load(&[("ROSTER_LISTEN_ADDR", "127.0.0.1:4000"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:4000".parse().unwrap());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("ROSTER_LISTEN_ADDR", "nowhere")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for ROSTER_LISTEN_ADDR: must be a valid socket address"
        );

        let err = load(&[("PORT", "99999")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT: must be a valid port number");
    }
}
