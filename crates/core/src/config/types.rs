use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::search::SearchBackend;
use crate::sync::SyncConfig;
use crate::upstream::ScryfallConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upstream: ScryfallConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            upstream: ScryfallConfig::default(),
            sync: SyncConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("binder.db")
}

/// Card search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Candidate retrieval backend, fixed at startup.
    #[serde(default)]
    pub backend: SearchBackend,
    /// Result limit when the caller does not pass one (default: 50).
    #[serde(default = "default_search_limit")]
    pub default_limit: u32,
    /// Hard cap on the result limit (default: 200).
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::default(),
            default_limit: default_search_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_search_limit() -> u32 {
    50
}

fn default_max_limit() -> u32 {
    200
}

/// Config view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream_base_url: String,
    pub sync: SyncConfig,
    pub search: SearchConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            upstream_base_url: config.upstream.base_url.clone(),
            sync: config.sync.clone(),
            search: config.search.clone(),
        }
    }
}
