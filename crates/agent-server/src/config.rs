//! Server settings

use anyhow::Context;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read `HOST` and `PORT`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = get("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.into());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(|key| match key {
            "HOST" => Some("127.0.0.1".into()),
            "PORT" => Some("9090".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(|key| (key == "PORT").then(|| "eighty".into()))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
