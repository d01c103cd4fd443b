//! Server configuration
//!
//! Command-line flags with `DOCQUERY_*` environment fallbacks.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// docquery command line arguments
#[derive(Debug, Parser)]
#[command(name = "docquery")]
#[command(about = "In-memory document query server")]
pub struct Args {
    /// Host to bind to
    #[arg(long, env = "DOCQUERY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, env = "DOCQUERY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Allowed CORS origins, comma separated; empty allows any origin
    #[arg(long, env = "DOCQUERY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Default page size for /search
    #[arg(long, env = "DOCQUERY_DEFAULT_SEARCH_LIMIT", default_value_t = 50)]
    pub default_search_limit: usize,

    /// Default page size for /listing and /fetch
    #[arg(long, env = "DOCQUERY_DEFAULT_FETCH_LIMIT", default_value_t = 100)]
    pub default_fetch_limit: usize,

    /// Largest page size a request may ask for
    #[arg(long, env = "DOCQUERY_MAX_LIMIT", default_value_t = 1000)]
    pub max_limit: usize,

    /// JSON fixture to serve, `{collection: {id: doc}}` or `{collection: [doc]}`
    #[arg(short, long, env = "DOCQUERY_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "DOCQUERY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins (default: any)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,

    #[serde(default = "default_fetch_limit")]
    pub default_fetch_limit: usize,

    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_search_limit() -> usize {
    50
}

fn default_fetch_limit() -> usize {
    100
}

fn default_max_limit() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            default_search_limit: default_search_limit(),
            default_fetch_limit: default_fetch_limit(),
            max_limit: default_max_limit(),
            data_file: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            cors_origins: args
                .cors_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            default_search_limit: args.default_search_limit,
            default_fetch_limit: args.default_fetch_limit,
            max_limit: args.max_limit,
            data_file: args.data_file.clone(),
            log_level: args.log_level.clone(),
        }
    }
}
