//! Server configuration.

use crate::ConfigError;
use crate::hub::DEFAULT_QUEUE_CAPACITY;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use strictly_ladders::{BoardDimension, MAX_DIMENSION};
use tracing::{debug, info, instrument};

/// Environment variable overriding the bind host.
pub const HOST_ENV: &str = "LADDERS_HOST";
/// Environment variable overriding the bind port.
pub const PORT_ENV: &str = "LADDERS_PORT";

/// Settings for the game server.
///
/// Loaded from an optional TOML file, then environment variables, then
/// command-line flags, each layer overriding the previous.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Grid size used when a create request names none.
    #[serde(default = "default_grid_size")]
    default_grid_size: usize,

    /// Largest grid size a client may request.
    #[serde(default = "default_max_grid_size")]
    max_grid_size: usize,

    /// Updates each subscriber may have queued before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    subscriber_queue_capacity: usize,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    8080
}

#[instrument]
fn default_grid_size() -> usize {
    10
}

#[instrument]
fn default_max_grid_size() -> usize {
    100
}

#[instrument]
fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_grid_size: default_grid_size(),
            max_grid_size: default_max_grid_size(),
            subscriber_queue_capacity: default_queue_capacity(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if given, applies environment overrides, and validates.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `LADDERS_HOST` and `LADDERS_PORT` as returned by `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup(HOST_ENV) {
            debug!(%host, "Host overridden from environment");
            self.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid {PORT_ENV} '{port}': {e}")))?;
            debug!(port = self.port, "Port overridden from environment");
        }
        Ok(())
    }

    /// Replaces the bind host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Replaces the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replaces the subscriber queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_queue_capacity = capacity;
        self
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Queue capacity as a non-zero count.
    pub fn queue_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.subscriber_queue_capacity)
            .ok_or_else(|| ConfigError::new("subscriber_queue_capacity must be at least 1"))
    }

    /// Checks that the grid settings and queue capacity are usable.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_grid_size < BoardDimension::MIN || self.max_grid_size > MAX_DIMENSION {
            return Err(ConfigError::new(format!(
                "max_grid_size must be between {} and {}, got {}",
                BoardDimension::MIN,
                MAX_DIMENSION,
                self.max_grid_size
            )));
        }
        if self.default_grid_size < BoardDimension::MIN
            || self.default_grid_size > self.max_grid_size
        {
            return Err(ConfigError::new(format!(
                "default_grid_size must be between {} and max_grid_size {}, got {}",
                BoardDimension::MIN,
                self.max_grid_size,
                self.default_grid_size
            )));
        }
        self.queue_capacity()?;
        Ok(())
    }
}
