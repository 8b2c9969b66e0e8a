//! Per-model price table
//!
//! Prices are USD per 1 000 tokens, split into input (prompt) and output
//! (completion) rates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrice {
    /// USD per 1K input tokens
    pub input: f64,
    /// USD per 1K output tokens
    #[serde(default)]
    pub output: f64,
}

impl ModelPrice {
    pub fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }

    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1000.0) * self.input + (output_tokens as f64 / 1000.0) * self.output
    }
}

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("invalid price table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("negative price for model `{0}`")]
    Negative(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    models: HashMap<String, ModelPrice>,
}

impl PriceTable {
    pub fn empty() -> Self {
        Self { models: HashMap::new() }
    }

    /// Load a table from YAML (`model: {input: .., output: ..}`)
    pub fn from_yaml(yaml: &str) -> Result<Self, PricingError> {
        let table: PriceTable = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        match self
            .models
            .iter()
            .find(|(_, p)| p.input < 0.0 || p.output < 0.0)
        {
            Some((model, _)) => Err(PricingError::Negative(model.clone())),
            None => Ok(()),
        }
    }

    pub fn with_price(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.models.insert(model.into(), price);
        self
    }

    /// Add or replace every entry of `other`
    pub fn merge(mut self, other: PriceTable) -> Self {
        self.models.extend(other.models);
        self
    }

    pub fn get(&self, model: &str) -> Option<&ModelPrice> {
        self.models.get(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::empty()
            .with_price("gpt-4", ModelPrice::new(0.03, 0.06))
            .with_price("gpt-4-turbo", ModelPrice::new(0.01, 0.03))
            .with_price("gpt-4o", ModelPrice::new(0.0025, 0.01))
            .with_price("gpt-4o-mini", ModelPrice::new(0.00015, 0.0006))
            .with_price("gpt-3.5-turbo", ModelPrice::new(0.001, 0.002))
            .with_price("text-embedding-3-small", ModelPrice::new(0.00002, 0.0))
            .with_price("text-embedding-3-large", ModelPrice::new(0.00013, 0.0))
    }
}
