//! Worker-side evaluation of one parameter set.
//!
//! Runs the model, then every feature on the model output, and wraps each
//! output in an [`Envelope`]. Adaptive outputs with 1-D values get a
//! [`LinearInterpolant`] so the merger can resample them later.

use crate::error::{EvaluationError, InterpolantError};
use crate::model::{
    Envelope, EvaluationResult, LinearInterpolant, ModelOutput, ParameterSet, Values,
};
use crate::traits::{Features, Model};

/// Evaluates the model and its features for single parameter sets.
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    model: &'a dyn Model,
    features: &'a dyn Features,
}

impl<'a> Evaluator<'a> {
    pub fn new(model: &'a dyn Model, features: &'a dyn Features) -> Self {
        Self { model, features }
    }

    /// Produce the evaluation result for one parameter set.
    ///
    /// The model output comes first, followed by one entry per declared
    /// feature. A feature the collaborator did not return is recorded with
    /// invalid values and time.
    pub fn evaluate(
        &self,
        parameters: &ParameterSet,
    ) -> Result<EvaluationResult, EvaluationError> {
        let output = normalize(self.model.run(parameters)?);
        let model_name = self.model.name();
        let names = self.features.names();

        let mut result = EvaluationResult::with_capacity(names.len() + 1);

        let mut envelope = Envelope::from(output.clone());
        if self.model.adaptive() && !self.model.ignore() {
            envelope = attach_interpolation(model_name, envelope, None)?;
        }
        result.insert(model_name, envelope);

        let mut computed = self.features.run(&output)?;
        for name in names {
            let feature_output = match computed.iter().position(|(n, _)| n == name) {
                Some(i) => normalize(computed.swap_remove(i).1),
                None => ModelOutput::invalid(),
            };

            let mut envelope = Envelope::from(feature_output);
            if self.features.is_adaptive(name) {
                envelope = attach_interpolation(name, envelope, Some(&output.time))?;
            }
            result.insert(name.as_str(), envelope);
        }

        Ok(result)
    }
}

/// A NaN scalar is the invalid marker, whichever way it was constructed.
fn normalize(output: ModelOutput) -> ModelOutput {
    let fix = |values: Values| match values {
        Values::Scalar(v) if v.is_nan() => Values::Invalid,
        other => other,
    };
    ModelOutput {
        time: fix(output.time),
        values: fix(output.values),
    }
}

fn usable_time(time: &Values) -> Option<&[f64]> {
    time.as_vector().filter(|_| !time.is_all_nan())
}

/// Build the interpolation object for 1-D values. The output's own time is
/// preferred; `fallback` is the model's time for features.
fn attach_interpolation(
    name: &str,
    envelope: Envelope,
    fallback: Option<&Values>,
) -> Result<Envelope, EvaluationError> {
    let Some(values) = envelope.values.as_vector() else {
        return Ok(envelope);
    };
    let Some(time) = usable_time(&envelope.time).or_else(|| fallback.and_then(usable_time)) else {
        return Ok(envelope);
    };

    match LinearInterpolant::new(time, values) {
        Ok(interpolant) => Ok(envelope.with_interpolation(interpolant.into_shared())),
        Err(InterpolantError::TooFewPoints(points)) => {
            tracing::debug!(feature = name, points, "Too few points to interpolate");
            Ok(envelope)
        }
        Err(e) => Err(EvaluationError::Interpolation {
            feature: name.to_string(),
            message: e.to_string(),
        }),
    }
}
