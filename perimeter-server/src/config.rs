use std::env;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use perimeter_backend::{ComputeBackend, ComputeConfig, MemoryBackend, RuleBackend};

const DEFAULT_PORT: &str = "8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown backend '{0}', expected 'compute' or 'memory'")]
    UnknownBackend(String),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub backend: BackendChoice,
}

/// Which rule backend the server talks to. `Memory` keeps rules in-process
/// and is meant for development and tests.
#[derive(Debug, Clone)]
pub enum BackendChoice {
    Compute {
        base_url: Option<String>,
        access_token: String,
    },
    Memory,
}

impl BackendChoice {
    pub fn name(&self) -> &'static str {
        match self {
            BackendChoice::Compute { .. } => "compute",
            BackendChoice::Memory => "memory",
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment: `PORT` (default 8080),
    /// `PERIMETER_BACKEND` (`compute`, the default, or `memory`),
    /// `GOOGLE_ACCESS_TOKEN` for the compute backend and `COMPUTE_API_BASE`
    /// to point it at an emulator.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT").unwrap_or_else(|_| {
            info!("PORT not set, defaulting to {DEFAULT_PORT}");
            DEFAULT_PORT.to_string()
        });
        let listen_addr = format!("0.0.0.0:{port}");

        let backend = match env::var("PERIMETER_BACKEND").as_deref() {
            Err(_) | Ok("compute") => BackendChoice::Compute {
                base_url: env::var("COMPUTE_API_BASE").ok(),
                access_token: env::var("GOOGLE_ACCESS_TOKEN")
                    .map_err(|_| ConfigError::MissingEnv("GOOGLE_ACCESS_TOKEN"))?,
            },
            Ok("memory") => BackendChoice::Memory,
            Ok(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            listen_addr,
            backend,
        })
    }

    pub fn build_backend(&self) -> Arc<dyn RuleBackend> {
        match &self.backend {
            BackendChoice::Memory => Arc::new(MemoryBackend::new()),
            BackendChoice::Compute {
                base_url,
                access_token,
            } => {
                let mut config = ComputeConfig::new(access_token.clone());
                if let Some(base) = base_url {
                    config.base_url = base.clone();
                }
                Arc::new(ComputeBackend::new(config))
            }
        }
    }
}
