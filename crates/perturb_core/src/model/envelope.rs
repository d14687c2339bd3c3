//! Result envelopes and per-evaluation results
//!
//! An [`Envelope`] is the standard shape of one model or feature evaluation.
//! An [`EvaluationResult`] maps every output name (the model's own name plus
//! each feature) to its envelope, in declaration order.

use super::interpolation::Interpolation;
use super::values::Values;

/// Raw `(time, values)` pair returned by a model or feature function.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelOutput {
    pub time: Values,
    pub values: Values,
}

impl ModelOutput {
    pub fn new(time: impl Into<Values>, values: impl Into<Values>) -> Self {
        Self {
            time: time.into(),
            values: values.into(),
        }
    }

    /// Output with values but no time axis
    pub fn untimed(values: impl Into<Values>) -> Self {
        Self {
            time: Values::Invalid,
            values: values.into(),
        }
    }

    /// Output where both values and time are the invalid marker
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }
}

/// One evaluation of the model or a feature.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub values: Values,
    pub time: Values,
    /// Present only for adaptive outputs with 1-D values
    pub interpolation: Option<Interpolation>,
}

impl Envelope {
    #[must_use]
    pub fn new(time: Values, values: Values) -> Self {
        Self {
            values,
            time,
            interpolation: None,
        }
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }
}

impl From<ModelOutput> for Envelope {
    fn from(output: ModelOutput) -> Self {
        Envelope::new(output.time, output.values)
    }
}

/// All envelopes produced for one parameter set.
#[derive(Debug, Clone, Default)]
pub struct EvaluationResult {
    entries: Vec<(String, Envelope)>,
}

impl EvaluationResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert an envelope, replacing any existing entry with the same name
    /// while keeping its position.
    pub fn insert(&mut self, name: impl Into<String>, envelope: Envelope) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = envelope,
            None => self.entries.push((name, envelope)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Envelope> {
        self.entries
            .iter()
            .find_map(|(n, envelope)| (n == name).then_some(envelope))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Output names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Envelope)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Envelope)> for EvaluationResult {
    fn from_iter<I: IntoIterator<Item = (S, Envelope)>>(iter: I) -> Self {
        let mut result = EvaluationResult::new();
        for (name, envelope) in iter {
            result.insert(name, envelope);
        }
        result
    }
}
