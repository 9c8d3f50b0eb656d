//! # Configuration
//!
//! Optional `bpkit.toml`. Every value can also be given on the command line,
//! and command-line flags win.
//!
//! ```toml
//! catalog = "signals.json"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 9000
//! ```

use bpkit_core::{BlueprintError, BlueprintResult, SignalCatalog};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bpkit.toml";

/// Maximum size of a configuration or catalog file (16 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Signal catalog used by `pack` and the `/pack` endpoint.
    pub catalog: Option<PathBuf>,
    pub server: ServerConfig,
}

/// `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> BlueprintResult<Self> {
        toml::from_str(text).map_err(|e| BlueprintError::Structural(format!("config: {}", e)))
    }

    /// Load the given file, or `bpkit.toml` if it exists, or the defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> BlueprintResult<Self> {
        match path {
            Some(path) => Self::from_toml_str(&read_small_file(path)?),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    tracing::debug!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                    Self::from_toml_str(&read_small_file(default)?)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load the catalog named by `override_path`, else by the config.
    ///
    /// Returns an empty catalog when neither names one.
    pub fn load_catalog(&self, override_path: Option<&Path>) -> BlueprintResult<SignalCatalog> {
        match override_path.or(self.catalog.as_deref()) {
            Some(path) => {
                let catalog = SignalCatalog::from_json_str(&read_small_file(path)?)?;
                tracing::info!("Loaded catalog {} ({} slots)", path.display(), catalog.len());
                Ok(catalog)
            }
            None => Ok(SignalCatalog::new()),
        }
    }
}

fn read_small_file(path: &Path) -> BlueprintResult<String> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| BlueprintError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(BlueprintError::Io(format!(
            "File '{}' is {} bytes, maximum is {}",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| BlueprintError::Io(format!("Cannot read '{}': {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn partial_server_table() {
        let config = Config::from_toml_str("[server]\nport = 9000\n").expect("parse");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml_str("colour = \"red\"\n").is_err());
    }

    #[test]
    fn catalog_from_config_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp");
        write!(file, r#"{{"0": {{"name": "signal-A", "type": "virtual"}}}}"#).expect("write");

        let config = Config {
            catalog: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let catalog = config.load_catalog(None).expect("catalog");
        assert_eq!(catalog.len(), 1);

        assert!(Config::default().load_catalog(None).expect("empty").is_empty());
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let result = Config::load(Some(Path::new("/nonexistent/bpkit.toml")));
        assert!(matches!(result, Err(BlueprintError::Io(_))));
    }
}
