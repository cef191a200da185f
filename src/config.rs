//! Configuration for the Mindware relay.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MINDWARE_API_KEY, MINDWARE_MAX_ACTIONS,
//!    MINDWARE_MAX_SERVICES, MINDWARE_BASE_URL, MINDWARE_TIMEOUT_SECONDS)
//! 2. Config file (.mindware/config.yaml)
//! 3. Defaults (no key, no tuning parameters, public relay host)
//!
//! Config file discovery:
//! - Searches current directory and parents for .mindware/config.yaml
//!
//! The environment is read here, once, and the result handed to the tool as
//! explicit parameters.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::mindware::{MindwareParams, API_KEY_ENV, DEFAULT_BASE_URL};

pub const MAX_ACTIONS_ENV: &str = "MINDWARE_MAX_ACTIONS";
pub const MAX_SERVICES_ENV: &str = "MINDWARE_MAX_SERVICES";
pub const BASE_URL_ENV: &str = "MINDWARE_BASE_URL";
pub const TIMEOUT_ENV: &str = "MINDWARE_TIMEOUT_SECONDS";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub max_actions: Option<u32>,
    pub max_services: Option<u32>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration
#[derive(Clone, Default)]
pub struct ResolvedConfig {
    pub api_key: Option<String>,
    pub max_actions: Option<u32>,
    pub max_services: Option<u32>,
    pub base_url: String,
    pub timeout: Option<Duration>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_actions", &self.max_actions)
            .field("max_services", &self.max_services)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("config_file", &self.config_file)
            .finish()
    }
}

impl ResolvedConfig {
    /// Construction parameters for the relay tool
    pub fn relay_params(&self) -> MindwareParams {
        MindwareParams {
            api_key: self.api_key.clone(),
            max_actions: self.max_actions,
            max_services: self.max_services,
            base_url: Some(self.base_url.clone()),
            timeout: self.timeout,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".mindware").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a numeric environment value, naming the variable on failure
fn parse_env<T>(env: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: '{}'", name, raw)),
        None => Ok(None),
    }
}

/// Merge env, config file and defaults
fn resolve(
    config_file: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let relay = match config_file {
        Some(ref path) => load_config_file(path)?.relay,
        None => RelayConfig::default(),
    };

    let api_key = env(API_KEY_ENV).or(relay.api_key);
    let max_actions = parse_env::<u32>(&env, MAX_ACTIONS_ENV)?.or(relay.max_actions);
    let max_services = parse_env::<u32>(&env, MAX_SERVICES_ENV)?.or(relay.max_services);
    let base_url = env(BASE_URL_ENV)
        .or(relay.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout = parse_env::<u64>(&env, TIMEOUT_ENV)?
        .or(relay.timeout_seconds)
        .map(Duration::from_secs);

    Ok(ResolvedConfig {
        api_key,
        max_actions,
        max_services,
        base_url,
        timeout,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config = resolve(find_config_file(), |name| std::env::var(name).ok())?;
    tracing::debug!(?config, "Resolved Mindware configuration");
    Ok(config)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
