//! Data assembly: fold the results list into the aggregate dataset.

use crate::error::RunError;
use crate::interpolate::merge_adaptive;
use crate::model::{Data, EvaluationResult, FeatureTime, UncertainParameters, Values};
use crate::regularity::is_regular;
use crate::traits::{Features, Model};

/// How one output is stored in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    /// Resampled onto a shared time base
    Interpolated,
    /// Raw per-evaluation values and time, no checks
    Raw,
    /// Shared time of the first evaluation, values stacked as they are
    Stacked,
}

/// Builds a [`Data`] from the evaluation results of one run.
pub struct Assembler<'a> {
    model: &'a dyn Model,
    features: &'a dyn Features,
}

impl<'a> Assembler<'a> {
    pub fn new(model: &'a dyn Model, features: &'a dyn Features) -> Self {
        Self { model, features }
    }

    /// Output names in processing order: the model first, then the declared
    /// features. Only names present in the first result are kept; names the
    /// first result carries beyond the declared ones are appended.
    fn feature_order(&self, results: &[EvaluationResult]) -> Vec<String> {
        let declared = std::iter::once(self.model.name())
            .chain(self.features.names().iter().map(String::as_str));

        let Some(first) = results.first() else {
            return declared.map(str::to_string).collect();
        };

        let mut order: Vec<String> = declared
            .filter(|name| first.contains(name))
            .map(str::to_string)
            .collect();
        for name in first.names() {
            if !order.iter().any(|n| n == name) {
                order.push(name.to_string());
            }
        }
        order
    }

    fn is_model(&self, name: &str) -> bool {
        name == self.model.name()
    }

    fn needs_regularity(&self, name: &str) -> bool {
        if self.is_model(name) {
            !(self.model.ignore() || self.model.adaptive())
        } else {
            !self.features.is_adaptive(name)
        }
    }

    fn storage(&self, name: &str) -> Storage {
        if self.is_model(name) {
            if self.model.adaptive() && !self.model.ignore() {
                Storage::Interpolated
            } else if self.model.ignore() {
                Storage::Raw
            } else {
                Storage::Stacked
            }
        } else if self.features.is_adaptive(name) {
            Storage::Interpolated
        } else {
            Storage::Stacked
        }
    }

    fn labels(&self, name: &str) -> Vec<String> {
        if self.is_model(name) {
            self.model.labels().to_vec()
        } else {
            self.features
                .labels(name)
                .map(<[String]>::to_vec)
                .unwrap_or_default()
        }
    }

    /// Fold `results` into a dataset.
    ///
    /// Fails on the first irregular non-adaptive output, and on adaptive
    /// outputs the merger cannot handle.
    pub fn assemble(
        &self,
        results: &[EvaluationResult],
        uncertain: &UncertainParameters,
    ) -> Result<Data, RunError> {
        let order = self.feature_order(results);

        let mut data = Data::new();
        data.add_features(&order);
        data.model_name = self.model.name().to_string();
        data.uncertain_parameters = uncertain.as_slice().to_vec();

        for name in &order {
            if self.needs_regularity(name) && !is_regular(results, name) {
                return Err(RunError::Irregular {
                    feature: name.clone(),
                });
            }
        }

        for name in &order {
            let (time, evaluations) = match self.storage(name) {
                Storage::Interpolated => {
                    let merged = merge_adaptive(results, name, self.model.name())?;
                    (FeatureTime::Shared(merged.time), merged.evaluations)
                }
                Storage::Raw => {
                    let (times, values) = results
                        .iter()
                        .map(|r| match r.get(name) {
                            Some(e) => (e.time.clone(), e.values.clone()),
                            None => (Values::Invalid, Values::Invalid),
                        })
                        .unzip();
                    (FeatureTime::PerEvaluation(times), values)
                }
                Storage::Stacked => {
                    let time = results
                        .first()
                        .and_then(|r| r.get(name))
                        .map_or(Values::Invalid, |e| e.time.clone());
                    let values = results
                        .iter()
                        .map(|r| r.get(name).map_or(Values::Invalid, |e| e.values.clone()))
                        .collect();
                    (FeatureTime::Shared(time), values)
                }
            };

            let labels = self.labels(name);
            if let Some(feature) = data.get_mut(name) {
                feature.labels = labels;
                feature.time = time;
                feature.evaluations = evaluations;
            }
        }

        tracing::debug!(
            features = data.len(),
            evaluations = results.len(),
            "Assembled data"
        );
        Ok(data)
    }
}
