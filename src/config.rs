//! Configuration management for TransNative

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8002
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:8001".to_string()]
}

fn default_static_dir() -> String {
    "static".to_string()
}

/// Settings for the remote chat-completion endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used for the second attempt. Same as `model` when unset.
    #[serde(default)]
    pub fallback_model: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            model: default_model(),
            fallback_model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.deepseek.com/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from transnative.toml
    pub fn load() -> Result<Self> {
        Self::load_from("transnative.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;

            return Self::parse(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()));
        }

        // Fall back to environment variables only
        Self::from_env()
    }

    /// Parse TOML content, expanding ${VAR} references
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.expand_env_vars();
        Ok(config)
    }

    /// Load configuration entirely from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from a variable lookup, using defaults for unset names
    fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            server: ServerConfig {
                host: var("TRANSNATIVE_HOST").unwrap_or_else(default_host),
                port: parse_var(&var, "TRANSNATIVE_PORT", default_port())?,
                cors_origins: var("TRANSNATIVE_CORS_ORIGINS")
                    .map(|s| split_list(&s))
                    .unwrap_or_else(default_cors_origins),
                static_dir: var("TRANSNATIVE_STATIC_DIR").unwrap_or_else(default_static_dir),
            },
            completion: CompletionConfig {
                endpoint: var("DEEPSEEK_ENDPOINT").unwrap_or_else(default_endpoint),
                api_key: var("DEEPSEEK_API_KEY").unwrap_or_default(),
                model: var("DEEPSEEK_MODEL").unwrap_or_else(default_model),
                fallback_model: var("DEEPSEEK_FALLBACK_MODEL").filter(|m| !m.trim().is_empty()),
                max_tokens: parse_var(&var, "DEEPSEEK_MAX_TOKENS", default_max_tokens())?,
                temperature: parse_var(&var, "DEEPSEEK_TEMPERATURE", default_temperature())?,
                timeout_secs: parse_var(&var, "DEEPSEEK_TIMEOUT_SECS", default_timeout_secs())?,
            },
        })
    }

    /// Expand ${VAR} patterns in string fields
    fn expand_env_vars(&mut self) {
        self.completion.api_key = expand_env(&self.completion.api_key);
        self.completion.endpoint = expand_env(&self.completion.endpoint);
        self.completion.model = expand_env(&self.completion.model);
        if let Some(ref mut model) = self.completion.fallback_model {
            *model = expand_env(model);
        }
    }
}

/// Read a typed value through `var`, using `default` when unset
fn parse_var<F, T>(var: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        None => Ok(default),
    }
}

/// Split a comma separated list, dropping blanks
fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Expand ${VAR} patterns in a string.
///
/// Substituted values are not rescanned.
fn expand_env(s: &str) -> String {
    let mut result = s.to_string();
    let mut search_from = 0;

    while let Some(offset) = result[search_from..].find("${") {
        let start = search_from + offset;
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let replacement = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], replacement, &result[start + end + 1..]);
            search_from = start + replacement.len();
        } else {
            break;
        }
    }

    result
}
