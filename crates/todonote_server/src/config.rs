//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use todonote_core::{default_log_level, LoggingConfig};

use crate::error::{Result, ServerError};

pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for the todonote HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind the server to.
    pub host: String,
    /// Port to bind the server to.
    pub port: u16,
    /// JSON document holding every note.
    pub data_file: PathBuf,
    /// Directory served for any non-API GET.
    pub public_dir: PathBuf,
    /// Log level passed to the logger.
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from("data.json"),
            public_dir: PathBuf::from("public"),
            log_level: default_log_level().to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl ServerConfig {
    /// Creates a configuration from process environment variables.
    ///
    /// Reads `HOST`, `PORT`, `DATA_FILE`, `PUBLIC_DIR`, `LOG_LEVEL` and
    /// `LOG_DIR`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|err| {
                ServerError::Configuration(format!("invalid PORT `{raw}`: {err}"))
            })?,
            None => defaults.port,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            data_file: var("DATA_FILE").map_or(defaults.data_file, PathBuf::from),
            public_dir: var("PUBLIC_DIR").map_or(defaults.public_dir, PathBuf::from),
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: absolute(&var("LOG_DIR").map_or(defaults.log_dir, PathBuf::from))?,
        })
    }

    /// Resolves the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| ServerError::Configuration(format!("invalid address: {err}")))
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::new(self.log_level.clone(), self.log_dir.clone())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|err| {
        ServerError::Configuration(format!("cannot resolve working directory: {err}"))
    })?;
    Ok(cwd.join(path))
}
