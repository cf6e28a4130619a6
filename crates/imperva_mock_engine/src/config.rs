use std::path::Path;

use imperva_mock_base::{ErrorKind, HttpServerConfig, MockError, MockResult, ResultExt};
use serde::Deserialize;

/// Configuration for a standalone mock server, read from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind; `None` lets the OS pick one.
    pub port: Option<u16>,
    /// Value of the `Server` response header.
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let http = HttpServerConfig::default();
        Self {
            host: http.host,
            port: http.port,
            server_name: http.server_name,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml(source: &str) -> MockResult<Self> {
        toml::from_str(source)
            .map_err(|e| Box::new(MockError::message(format!("Invalid configuration: {}", e))))
    }

    pub fn to_http_config(&self) -> HttpServerConfig {
        let config = HttpServerConfig::new(self.host.clone()).with_server_name(self.server_name.clone());
        match self.port {
            Some(port) => config.with_port(port),
            None => config,
        }
    }
}

/// Load a [`ServerConfig`] from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> MockResult<ServerConfig> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| {
        Box::new(MockError::new(ErrorKind::FileError {
            path: path.to_path_buf(),
            source,
        }))
    })?;
    ServerConfig::from_toml(&source)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, None);
        assert_eq!(config.server_name, "imperva-mock");
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("imperva-mock.toml");
        fs::write(&path, "host = \"0.0.0.0\"\nport = 18080\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, Some(18080));
        assert_eq!(config.to_http_config().address(), "0.0.0.0:18080");
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let error = load_config(temp_dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::FileError { .. }));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("imperva-mock.toml");
        fs::write(&path, "hostname = \"localhost\"\n").unwrap();

        let error = load_config(&path).unwrap_err();
        assert!(error.to_string().starts_with("Failed to load config from"));
    }
}
