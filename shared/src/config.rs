//! Environment configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `TABLE_NAME` | `taskboard` |
//! | `TASK_STORE` (`dynamodb` / `memory`) | `dynamodb` |
//! | `ADAPTER_MODE` (`direct` / `proxied`) | `direct` |
//! | `INTERNAL_API_BASE_URL` | `http://localhost:8000` |
//! | `INTERNAL_API_TIMEOUT_SECS` | unset, no timeout |
//! | `MUTATION_ERROR_POLICY` (`swallow` / `surface`) | `swallow` |
//! | `ALLOW_PURGE` | `false` |
//! | `SEED_DEMO_TASKS` | `false` |
//! | `LOG_FORMAT` (`json` / `pretty`) | `json` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use board_block::{AdapterMode, FailurePolicy};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {name}='{value}': {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Dynamo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(StoreBackend::Dynamo),
            "memory" | "in_memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown task store '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub table_name: String,
    pub store_backend: StoreBackend,
    pub adapter_mode: AdapterMode,
    pub internal_api_base_url: String,
    pub internal_api_timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub allow_purge: bool,
    pub seed_demo_tasks: bool,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            table_name: "taskboard".to_string(),
            store_backend: StoreBackend::default(),
            adapter_mode: AdapterMode::default(),
            internal_api_base_url: "http://localhost:8000".to_string(),
            internal_api_timeout: None,
            failure_policy: FailurePolicy::default(),
            allow_purge: false,
            seed_demo_tasks: false,
            log_format: LogFormat::default(),
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("'{}' is not a boolean", other)),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("timeout must be greater than zero".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(e.to_string()),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup; unset or empty variables keep their default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        fn parsed<T>(
            name: &'static str,
            value: Option<String>,
            parse: impl Fn(&str) -> Result<T, String>,
        ) -> Result<Option<T>, ConfigError> {
            value
                .map(|raw| {
                    parse(&raw).map_err(|reason| ConfigError {
                        name,
                        value: raw.clone(),
                        reason,
                    })
                })
                .transpose()
        }

        if let Some(table) = read("TABLE_NAME") {
            config.table_name = table;
        }
        if let Some(url) = read("INTERNAL_API_BASE_URL") {
            config.internal_api_base_url = url;
        }
        if let Some(backend) = parsed("TASK_STORE", read("TASK_STORE"), str::parse::<StoreBackend>)? {
            config.store_backend = backend;
        }
        if let Some(mode) = parsed("ADAPTER_MODE", read("ADAPTER_MODE"), str::parse::<AdapterMode>)? {
            config.adapter_mode = mode;
        }
        if let Some(policy) = parsed(
            "MUTATION_ERROR_POLICY",
            read("MUTATION_ERROR_POLICY"),
            str::parse::<FailurePolicy>,
        )? {
            config.failure_policy = policy;
        }
        if let Some(format) = parsed("LOG_FORMAT", read("LOG_FORMAT"), str::parse::<LogFormat>)? {
            config.log_format = format;
        }
        config.internal_api_timeout = parsed(
            "INTERNAL_API_TIMEOUT_SECS",
            read("INTERNAL_API_TIMEOUT_SECS"),
            parse_timeout,
        )?;
        if let Some(allow) = parsed("ALLOW_PURGE", read("ALLOW_PURGE"), parse_bool)? {
            config.allow_purge = allow;
        }
        if let Some(seed) = parsed("SEED_DEMO_TASKS", read("SEED_DEMO_TASKS"), parse_bool)? {
            config.seed_demo_tasks = seed;
        }

        Ok(config)
    }
}
