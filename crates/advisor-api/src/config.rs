//! Service configuration
//!
//! Load order: built-in defaults, then the YAML file named by
//! `ADVISOR_CONFIG` (if set), then environment overrides:
//!
//! | variable | field |
//! |---|---|
//! | `ADVISOR_ADDR` | `server.addr` |
//! | `OPENAI_API_KEY` | `provider.api_key` |
//! | `OPENAI_BASE_URL` | `provider.base_url` |
//! | `ADVISOR_MODEL` | `pipeline.model` |
//! | `ADVISOR_DAILY_BUDGET` | `budget.daily_budget` |
//! | `ADVISOR_TEMPLATES` | `templates` |

use advisor_policy::ModerationConfig;
use advisor_provider::DEFAULT_BASE_URL;
use advisor_stages::PipelineConfig;
use advisor_usage::{PriceTable, PricingError};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Placeholder shipped in sample env files
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";
const MIN_API_KEY_LEN: usize = 20;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub pipeline: PipelineConfig,
    pub moderation: ModerationConfig,
    pub budget: BudgetConfig,
    /// Added to, or replacing entries of, the built-in price table
    pub prices: Option<PriceTable>,
    /// Prompt templates file replacing the built-in set
    pub templates: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8787".to_string(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &key_preview(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// USD per UTC day; alerts only, never enforced
    pub daily_budget: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self { daily_budget: 5.0 }
    }
}

impl ServiceConfig {
    /// Defaults, file, environment; then validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("ADVISOR_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ADVISOR_ADDR") {
            self.server.addr = addr;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.provider.api_key = key.trim().to_string();
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(model) = lookup("ADVISOR_MODEL") {
            self.pipeline.model = model;
        }
        if let Some(path) = lookup("ADVISOR_TEMPLATES") {
            self.templates = Some(path);
        }
        if let Some(budget) = lookup("ADVISOR_DAILY_BUDGET") {
            self.budget.daily_budget = budget.trim().parse().map_err(|_| ConfigError::Env {
                var: "ADVISOR_DAILY_BUDGET",
                value: budget.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pipeline = &self.pipeline;

        if !(0.0..=2.0).contains(&pipeline.temperature) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.temperature must be within 0..=2, got {}",
                pipeline.temperature
            )));
        }
        if pipeline.max_tokens == 0 || self.moderation.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&pipeline.relevance_threshold) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.relevance_threshold must be within 0..=1, got {}",
                pipeline.relevance_threshold
            )));
        }
        if pipeline.max_context_documents == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.max_context_documents must be positive".to_string(),
            ));
        }
        if !(self.budget.daily_budget.is_finite() && self.budget.daily_budget > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "budget.daily_budget must be positive, got {}",
                self.budget.daily_budget
            )));
        }
        if let Some(prices) = &self.prices {
            prices.validate()?;
        }
        Ok(())
    }

    /// Built-in prices with the configured overrides applied
    pub fn price_table(&self) -> PriceTable {
        match &self.prices {
            Some(overrides) => PriceTable::default().merge(overrides.clone()),
            None => PriceTable::default(),
        }
    }
}

/// Whether `key` looks like a real provider key
pub fn has_usable_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty()
        && key != PLACEHOLDER_API_KEY
        && key.starts_with("sk-")
        && key.len() >= MIN_API_KEY_LEN
}

/// First ten and last four characters, for logs and status output
pub fn key_preview(key: &str) -> String {
    let key = key.trim();
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < MIN_API_KEY_LEN {
        return if key.is_empty() { "None".to_string() } else { "***".to_string() };
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
