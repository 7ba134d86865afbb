//! Configuration for the Packeval service
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `PACKEVAL_`-prefixed environment variables.

use packeval_agents::{AgentOptions, ReasoningConfig};
use packeval_engine::{DriverConfig, DEFAULT_MAX_TRANSITIONS};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Reasoning collaborator settings
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Per-agent wiring (knowledge-base usage)
    #[serde(default)]
    pub agents: AgentSettings,

    /// Driver loop settings
    #[serde(default)]
    pub driver: DriverSettings,
}

impl ServiceConfig {
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ServiceConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PACKEVAL")
                .separator("_")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable permissive CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// Knowledge-base usage per assessment agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_true")]
    pub technical_use_rag: bool,
    #[serde(default = "default_true")]
    pub operations_use_rag: bool,
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            technical_use_rag: true,
            operations_use_rag: true,
            retrieval_limit: default_retrieval_limit(),
        }
    }
}

impl From<AgentSettings> for AgentOptions {
    fn from(settings: AgentSettings) -> Self {
        AgentOptions {
            technical_use_rag: settings.technical_use_rag,
            operations_use_rag: settings.operations_use_rag,
            retrieval_limit: settings.retrieval_limit,
        }
    }
}

/// Driver loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSettings {
    /// Transition ceiling per driver invocation
    #[serde(default = "default_max_transitions")]
    pub max_transitions: u32,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            max_transitions: default_max_transitions(),
        }
    }
}

impl From<DriverSettings> for DriverConfig {
    fn from(settings: DriverSettings) -> Self {
        DriverConfig {
            max_transitions: settings.max_transitions,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_retrieval_limit() -> usize {
    packeval_agents::DEFAULT_RETRIEVAL_LIMIT
}

fn default_max_transitions() -> u32 {
    DEFAULT_MAX_TRANSITIONS
}
