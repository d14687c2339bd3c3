//! Aggregate dataset handed to downstream statistics.
//!
//! `Data` keeps one [`DataFeature`] per output (the model first, then the
//! features in declaration order) together with the model name and the names
//! of the parameters varied in the run.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::values::Values;
use crate::error::RunError;

/// Time axis of an aggregated feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureTime {
    /// One time axis shared by every evaluation
    Shared(Values),
    /// The raw time of each evaluation, used when the model output is ignored
    PerEvaluation(Vec<Values>),
}

impl Default for FeatureTime {
    fn default() -> Self {
        FeatureTime::Shared(Values::Invalid)
    }
}

impl FeatureTime {
    /// The shared time axis, if there is one
    #[must_use]
    pub fn shared(&self) -> Option<&Values> {
        match self {
            FeatureTime::Shared(time) => Some(time),
            FeatureTime::PerEvaluation(_) => None,
        }
    }
}

/// Aggregated evaluations of one model output or feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFeature {
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub time: FeatureTime,
    /// One entry per evaluation, in node order
    #[serde(default)]
    pub evaluations: Vec<Values>,
}

impl DataFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Dimension of the first valid evaluation
    #[must_use]
    pub fn ndim(&self) -> Option<usize> {
        self.evaluations
            .iter()
            .find(|v| !v.is_invalid())
            .map(Values::ndim)
    }

    /// True when no evaluation holds a number
    #[must_use]
    pub fn is_only_invalid(&self) -> bool {
        self.evaluations.iter().all(Values::is_all_nan)
    }
}

/// Aggregate dataset produced by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub model_name: String,
    pub uncertain_parameters: Vec<String>,
    features: Vec<DataFeature>,
}

impl Data {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register features by name. Names already present are left untouched.
    pub fn add_features<S: AsRef<str>>(&mut self, names: impl IntoIterator<Item = S>) {
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                self.features.push(DataFeature::new(name));
            }
        }
    }

    #[must_use]
    pub fn get(&self, feature: &str) -> Option<&DataFeature> {
        self.features.iter().find(|f| f.name == feature)
    }

    pub fn get_mut(&mut self, feature: &str) -> Option<&mut DataFeature> {
        self.features.iter_mut().find(|f| f.name == feature)
    }

    #[must_use]
    pub fn contains(&self, feature: &str) -> bool {
        self.get(feature).is_some()
    }

    /// Remove a feature, returning it if it was present
    pub fn remove(&mut self, feature: &str) -> Option<DataFeature> {
        let index = self.features.iter().position(|f| f.name == feature)?;
        Some(self.features.remove(index))
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataFeature> {
        self.features.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Dimension of the evaluations of `feature`
    #[must_use]
    pub fn ndim(&self, feature: &str) -> Option<usize> {
        self.get(feature).and_then(DataFeature::ndim)
    }

    /// Drop every feature whose evaluations are all invalid.
    /// Returns the names that were removed.
    pub fn remove_only_invalid_features(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        self.features.retain(|feature| {
            if feature.is_only_invalid() {
                removed.push(feature.name.clone());
                false
            } else {
                true
            }
        });
        for name in &removed {
            tracing::warn!(feature = %name, "Removing feature with only invalid evaluations");
        }
        removed
    }

    pub fn to_json(&self) -> Result<String, RunError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RunError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the dataset as JSON
    pub fn save(&self, path: &Path) -> Result<(), RunError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a dataset previously written by [`Data::save`]
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model: {}", self.model_name)?;
        writeln!(
            f,
            "uncertain parameters: {}",
            self.uncertain_parameters.join(", ")
        )?;
        for feature in &self.features {
            let ndim = feature
                .ndim()
                .map_or_else(|| "-".to_string(), |n| format!("{n}D"));
            let time = match &feature.time {
                FeatureTime::Shared(t) if t.is_invalid() => "none".to_string(),
                FeatureTime::Shared(t) => format!("{} points", t.outer_len()),
                FeatureTime::PerEvaluation(_) => "per evaluation".to_string(),
            };
            writeln!(
                f,
                "  {}: {} evaluations, {ndim}, time {time}",
                feature.name,
                feature.evaluations.len()
            )?;
        }
        Ok(())
    }
}
