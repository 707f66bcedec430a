//! Server configuration from the command line and the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::ConfigError;

/// The port the server listens on when none is given.
pub const DEFAULT_PORT: u16 = 12345;

/// Environment variable overriding the number of buckets.
pub const BUCKETS_VAR: &str = "LFKV_BUCKETS";

/// Environment variable overriding the bind address.
pub const BIND_VAR: &str = "LFKV_BIND";

/// Server configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The address to bind to.
    pub bind: IpAddr,
    /// The port to listen on.
    pub port: u16,
    /// The number of buckets of the table.
    pub buckets: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            buckets: lfkv::hash_table::DEFAULT_BUCKET_COUNT,
        }
    }
}

impl Config {
    /// Reads the configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(std::env::args().skip(1), |name| std::env::var(name).ok())
    }

    /// Builds the configuration from `[port]` arguments and an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value cannot be parsed or if there are extra arguments.
    pub fn from_parts<I, F>(args: I, lookup: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        if let Some(port) = args.next() {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value: port })?;
        }
        if let Some(value) = args.next() {
            return Err(ConfigError::UnexpectedArgument { value });
        }
        if let Some(buckets) = lookup(BUCKETS_VAR) {
            config.buckets = match buckets.parse() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidBuckets { value: buckets }),
            };
        }
        if let Some(bind) = lookup(BIND_VAR) {
            config.bind = bind
                .parse()
                .map_err(|_| ConfigError::InvalidBind { value: bind })?;
        }
        Ok(config)
    }

    /// Returns the socket address to listen on.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn defaults() {
        let config = Config::from_parts(args(&[]), |_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr(), "0.0.0.0:12345".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn port_and_env() {
        let config = Config::from_parts(args(&["8080"]), |name| match name {
            BUCKETS_VAR => Some("1000".to_owned()),
            BIND_VAR => Some("127.0.0.1".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.buckets, 1000);
        assert_eq!(config.addr(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn invalid() {
        assert_eq!(
            Config::from_parts(args(&["port"]), |_| None),
            Err(ConfigError::InvalidPort {
                value: "port".to_owned()
            })
        );
        assert_eq!(
            Config::from_parts(args(&["70000"]), |_| None),
            Err(ConfigError::InvalidPort {
                value: "70000".to_owned()
            })
        );
        assert_eq!(
            Config::from_parts(args(&["1", "2"]), |_| None),
            Err(ConfigError::UnexpectedArgument {
                value: "2".to_owned()
            })
        );
        assert!(matches!(
            Config::from_parts(args(&[]), |name| (name == BUCKETS_VAR).then(|| "0".to_owned())),
            Err(ConfigError::InvalidBuckets { .. })
        ));
        assert!(matches!(
            Config::from_parts(args(&[]), |name| (name == BIND_VAR).then(|| "localhost".to_owned())),
            Err(ConfigError::InvalidBind { .. })
        ));
    }
}
