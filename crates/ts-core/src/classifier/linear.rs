//! Linear bag-of-n-grams text model
//!
//! The offline trainer exports its vectorizer vocabulary and the fitted
//! logistic-regression coefficients as JSON:
//!
//! ```json
//! { "name": "gambling-spam", "version": "3", "ngram_range": [1, 2],
//!   "bias": -2.0, "threshold": 0.5,
//!   "weights": { "casino": 2.4, "slot gacor": 3.0 } }
//! ```

use super::{Classifier, Label};
use crate::error::{Result, SweepError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_threshold() -> f64 {
    0.5
}

/// Logistic regression over word n-gram counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearTextModel {
    /// Model name
    pub name: String,
    /// Version tag assigned by the trainer
    #[serde(default)]
    pub version: Option<String>,
    /// Inclusive word n-gram range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Intercept
    pub bias: f64,
    /// Minimum probability for a positive label
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Coefficient per n-gram
    pub weights: HashMap<String, f64>,
    /// blake3 digest prefix of the model file
    #[serde(skip)]
    fingerprint: Option<String>,
}

/// Summary of a loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub version: Option<String>,
    pub fingerprint: Option<String>,
    pub terms: usize,
}

impl LinearTextModel {
    /// Load and validate a model file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SweepError::FileNotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let mut model: LinearTextModel = serde_json::from_slice(&bytes)
            .map_err(|e| SweepError::Model(format!("{}: {}", path.display(), e)))?;
        model.validate()?;
        model.fingerprint = Some(blake3::hash(&bytes).to_hex()[..12].to_string());

        tracing::debug!(
            "Loaded model {} with {} terms from {:?}",
            model.name,
            model.weights.len(),
            path
        );
        Ok(model)
    }

    /// Check the parameters are usable
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.ngram_range;
        if min == 0 || min > max {
            return Err(SweepError::Model(format!(
                "invalid ngram_range [{}, {}]",
                min, max
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SweepError::Model(format!(
                "threshold {} is outside [0, 1]",
                self.threshold
            )));
        }
        if !self.bias.is_finite() || self.weights.values().any(|w| !w.is_finite()) {
            return Err(SweepError::Model("non-finite coefficient".to_string()));
        }
        Ok(())
    }

    /// Model summary
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            fingerprint: self.fingerprint.clone(),
            terms: self.weights.len(),
        }
    }

    /// Positive-class probability for one normalized text
    pub fn score(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let (min, max) = self.ngram_range;
        let mut z = self.bias;
        for n in min..=max {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(weight) = self.weights.get(&gram) {
                    z += weight;
                }
            }
        }

        sigmoid(z)
    }
}

impl Classifier for LinearTextModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, texts: &[String]) -> Result<Vec<Label>> {
        Ok(texts
            .iter()
            .map(|text| {
                if self.score(text) >= self.threshold {
                    Label::Flagged
                } else {
                    Label::Clean
                }
            })
            .collect())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
