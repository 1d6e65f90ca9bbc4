//! Server configuration read from the environment.

use std::env;
use std::path::PathBuf;

use crate::runtime::ServiceConfig;

pub const DEFAULT_DB_PATH: &str = "footyquiz.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Settings for `footyquiz serve`. CLI flags override these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Listen address.
    pub bind: String,
    /// Load the database into memory at startup and serve from there.
    pub in_memory: bool,
    /// Emit JSON log lines.
    pub log_json: bool,
    pub queue_bound: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind: DEFAULT_BIND.to_string(),
            in_memory: false,
            log_json: false,
            queue_bound: ServiceConfig::default().queue_bound,
        }
    }
}

impl ServerConfig {
    /// Reads `FOOTYQUIZ_DB`, `FOOTYQUIZ_BIND`, `FOOTYQUIZ_IN_MEMORY`,
    /// `FOOTYQUIZ_LOG_JSON` and `FOOTYQUIZ_QUEUE_BOUND`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            db_path: lookup("FOOTYQUIZ_DB")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            bind: lookup("FOOTYQUIZ_BIND")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bind),
            in_memory: parse_bool(lookup("FOOTYQUIZ_IN_MEMORY")).unwrap_or(defaults.in_memory),
            log_json: parse_bool(lookup("FOOTYQUIZ_LOG_JSON")).unwrap_or(defaults.log_json),
            queue_bound: lookup("FOOTYQUIZ_QUEUE_BOUND")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.queue_bound),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            queue_bound: self.queue_bound,
        }
    }
}

fn parse_bool(value: Option<String>) -> Option<bool> {
    match value?.as_str() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
