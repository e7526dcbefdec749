//! Gateway configuration from environment variables.
//!
//! | Variable              | Default                                 |
//! |-----------------------|-----------------------------------------|
//! | `GATEWAY_ADDR`        | `127.0.0.1:8080`                        |
//! | `EFA_BASE_URL`        | `https://projekte.kvv-efa.de/sl3-alone` |
//! | `EFA_TIMEOUT_SECS`    | `10`                                    |
//! | `EFA_MAX_CONCURRENT`  | `8`                                     |
//! | `EFA_DEPARTURE_LIMIT` | `40`                                    |
//! | `CACHE_TTL_SECS`      | `30`                                    |
//! | `CACHE_MAX_CAPACITY`  | `10000`                                 |
//! | `EFA_MOCK_DIR`        | unset (live provider)                   |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::efa::EfaConfig;

const DEFAULT_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

/// Everything `main` needs to start the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on.
    pub addr: SocketAddr,
    /// Upstream client settings.
    pub efa: EfaConfig,
    /// Departure board cache settings.
    pub cache: CacheConfig,
    /// Serve canned responses from this directory instead of the provider.
    pub mock_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl GatewayConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let addr = parse_var::<SocketAddr>("GATEWAY_ADDR", get("GATEWAY_ADDR"))?
            .unwrap_or(DEFAULT_ADDR);

        let mut efa = EfaConfig::new();
        if let Some(url) = get("EFA_BASE_URL") {
            efa = efa.with_base_url(url);
        }
        if let Some(secs) = parse_var("EFA_TIMEOUT_SECS", get("EFA_TIMEOUT_SECS"))? {
            efa = efa.with_timeout(secs);
        }
        if let Some(n) = parse_var("EFA_MAX_CONCURRENT", get("EFA_MAX_CONCURRENT"))? {
            efa = efa.with_max_concurrent(n);
        }
        if let Some(limit) = parse_var("EFA_DEPARTURE_LIMIT", get("EFA_DEPARTURE_LIMIT"))? {
            efa = efa.with_departure_limit(limit);
        }

        let mut cache = CacheConfig::default();
        if let Some(secs) = parse_var::<u64>("CACHE_TTL_SECS", get("CACHE_TTL_SECS"))? {
            cache = cache.with_ttl(Duration::from_secs(secs));
        }
        if let Some(cap) = parse_var("CACHE_MAX_CAPACITY", get("CACHE_MAX_CAPACITY"))? {
            cache = cache.with_max_capacity(cap);
        }

        Ok(Self {
            addr,
            efa,
            cache,
            mock_dir: get("EFA_MOCK_DIR").map(PathBuf::from),
        })
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: v.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.efa.base_url, "https://projekte.kvv-efa.de/sl3-alone");
        assert_eq!(config.efa.timeout_secs, 10);
        assert_eq!(config.cache.ttl, Duration::from_secs(30));
        assert!(config.mock_dir.is_none());
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            ("GATEWAY_ADDR", "0.0.0.0:9000"),
            ("EFA_BASE_URL", "http://efa.local/"),
            ("EFA_TIMEOUT_SECS", "3"),
            ("EFA_MAX_CONCURRENT", "2"),
            ("EFA_DEPARTURE_LIMIT", "15"),
            ("CACHE_TTL_SECS", "5"),
            ("CACHE_MAX_CAPACITY", "100"),
            ("EFA_MOCK_DIR", "data/mock"),
        ])
        .unwrap();

        assert_eq!(config.addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.efa.base_url, "http://efa.local");
        assert_eq!(config.efa.timeout_secs, 3);
        assert_eq!(config.efa.max_concurrent, 2);
        assert_eq!(config.efa.departure_limit, 15);
        assert_eq!(config.cache.ttl, Duration::from_secs(5));
        assert_eq!(config.cache.max_capacity, 100);
        assert_eq!(config.mock_dir, Some(PathBuf::from("data/mock")));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config_from(&[("EFA_TIMEOUT_SECS", "  "), ("EFA_MOCK_DIR", "")]).unwrap();
        assert_eq!(config.efa.timeout_secs, 10);
        assert!(config.mock_dir.is_none());
    }

    #[test]
    fn invalid_values_are_errors() {
        let err = config_from(&[("EFA_TIMEOUT_SECS", "ten")]).unwrap_err();
        assert!(err.to_string().contains("EFA_TIMEOUT_SECS"));

        assert!(config_from(&[("GATEWAY_ADDR", "localhost")]).is_err());
        assert!(config_from(&[("EFA_DEPARTURE_LIMIT", "-1")]).is_err());
    }
}
