//! Capability interfaces for the model and feature collaborators.
//!
//! Both collaborators are shared read-only across worker threads, so they
//! must be `Send + Sync` and take `&self`. A model that needs mutable native
//! state has to own its synchronisation.

use std::fmt;

use crate::error::EvaluationError;
use crate::model::{ModelOutput, ParameterSet};

/// A simulation model run once per parameter set.
pub trait Model: Send + Sync {
    /// Name of the model. Also the key of its own output in every
    /// evaluation result.
    fn name(&self) -> &str;

    /// Axis labels of the model output
    fn labels(&self) -> &[String] {
        &[]
    }

    /// Whether the number of time points may differ between evaluations
    fn adaptive(&self) -> bool {
        false
    }

    /// Store the model output as returned, without regularity checks or
    /// interpolation. Used when the output is only an input to features.
    fn ignore(&self) -> bool {
        false
    }

    /// Whether evaluations need an off-screen display
    fn suppress_graphics(&self) -> bool {
        false
    }

    fn run(&self, parameters: &ParameterSet) -> Result<ModelOutput, EvaluationError>;
}

/// Derived quantities computed from the model output.
pub trait Features: Send + Sync {
    /// Feature names in declaration order
    fn names(&self) -> &[String];

    fn is_adaptive(&self, feature: &str) -> bool;

    fn labels(&self, feature: &str) -> Option<&[String]>;

    /// Compute the features for one model output. Features missing from the
    /// returned list are recorded as invalid.
    fn run(&self, output: &ModelOutput) -> Result<Vec<(String, ModelOutput)>, EvaluationError>;
}

/// A model without any features.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeatures;

impl Features for NoFeatures {
    fn names(&self) -> &[String] {
        &[]
    }

    fn is_adaptive(&self, _feature: &str) -> bool {
        false
    }

    fn labels(&self, _feature: &str) -> Option<&[String]> {
        None
    }

    fn run(&self, _output: &ModelOutput) -> Result<Vec<(String, ModelOutput)>, EvaluationError> {
        Ok(Vec::new())
    }
}

type FeatureFn = dyn Fn(&ModelOutput) -> Result<ModelOutput, EvaluationError> + Send + Sync;
type ModelFn = dyn Fn(&ParameterSet) -> Result<ModelOutput, EvaluationError> + Send + Sync;

struct FeatureEntry {
    name: String,
    adaptive: bool,
    labels: Vec<String>,
    compute: Box<FeatureFn>,
}

/// Features built from closures.
///
/// ```ignore
/// let features = FeatureSet::new()
///     .feature("peak", |out| Ok(ModelOutput::untimed(peak(out))))
///     .adaptive_feature("trace", |out| Ok(out.clone()))
///     .labels("trace", ["Time (ms)", "Voltage (mV)"]);
/// ```
#[derive(Default)]
pub struct FeatureSet {
    entries: Vec<FeatureEntry>,
    names: Vec<String>,
}

impl FeatureSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push<F>(mut self, name: &str, adaptive: bool, compute: F) -> Self
    where
        F: Fn(&ModelOutput) -> Result<ModelOutput, EvaluationError> + Send + Sync + 'static,
    {
        self.entries.retain(|e| e.name != name);
        self.names.retain(|n| n != name);
        self.entries.push(FeatureEntry {
            name: name.to_string(),
            adaptive,
            labels: Vec::new(),
            compute: Box::new(compute),
        });
        self.names.push(name.to_string());
        self
    }

    /// Add a feature with a fixed number of points
    #[must_use]
    pub fn feature<F>(self, name: &str, compute: F) -> Self
    where
        F: Fn(&ModelOutput) -> Result<ModelOutput, EvaluationError> + Send + Sync + 'static,
    {
        self.push(name, false, compute)
    }

    /// Add a feature whose number of points may vary between evaluations
    #[must_use]
    pub fn adaptive_feature<F>(self, name: &str, compute: F) -> Self
    where
        F: Fn(&ModelOutput) -> Result<ModelOutput, EvaluationError> + Send + Sync + 'static,
    {
        self.push(name, true, compute)
    }

    /// Set the axis labels of an already added feature
    #[must_use]
    pub fn labels<S: Into<String>>(
        mut self,
        name: &str,
        labels: impl IntoIterator<Item = S>,
    ) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.labels = labels.into_iter().map(Into::into).collect();
        }
        self
    }

    fn entry(&self, name: &str) -> Option<&FeatureEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSet")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl Features for FeatureSet {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn is_adaptive(&self, feature: &str) -> bool {
        self.entry(feature).is_some_and(|e| e.adaptive)
    }

    fn labels(&self, feature: &str) -> Option<&[String]> {
        self.entry(feature)
            .filter(|e| !e.labels.is_empty())
            .map(|e| e.labels.as_slice())
    }

    fn run(&self, output: &ModelOutput) -> Result<Vec<(String, ModelOutput)>, EvaluationError> {
        self.entries
            .iter()
            .map(|entry| Ok((entry.name.clone(), (entry.compute)(output)?)))
            .collect()
    }
}

/// A model backed by a closure.
pub struct FnModel {
    name: String,
    labels: Vec<String>,
    adaptive: bool,
    ignore: bool,
    suppress_graphics: bool,
    run: Box<ModelFn>,
}

impl FnModel {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&ParameterSet) -> Result<ModelOutput, EvaluationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            labels: Vec::new(),
            adaptive: false,
            ignore: false,
            suppress_graphics: false,
            run: Box::new(run),
        }
    }

    #[must_use]
    pub fn labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    #[must_use]
    pub fn ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    #[must_use]
    pub fn suppress_graphics(mut self, suppress: bool) -> Self {
        self.suppress_graphics = suppress;
        self
    }
}

impl fmt::Debug for FnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModel")
            .field("name", &self.name)
            .field("adaptive", &self.adaptive)
            .field("ignore", &self.ignore)
            .finish_non_exhaustive()
    }
}

impl Model for FnModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn adaptive(&self) -> bool {
        self.adaptive
    }

    fn ignore(&self) -> bool {
        self.ignore
    }

    fn suppress_graphics(&self) -> bool {
        self.suppress_graphics
    }

    fn run(&self, parameters: &ParameterSet) -> Result<ModelOutput, EvaluationError> {
        (self.run)(parameters)
    }
}
