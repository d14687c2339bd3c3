//! Interpolation merger for adaptive outputs.
//!
//! Adaptive 1-D outputs may have a different number of time points in every
//! evaluation. The evaluation with the most time points becomes the shared
//! time base and every evaluation's interpolation object is resampled onto
//! it.

use crate::error::RunError;
use crate::model::{Envelope, EvaluationResult, Values};

/// Shared time axis and one (resampled) entry per evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub time: Values,
    pub evaluations: Vec<Values>,
}

/// Merge the evaluations of an adaptive feature onto a common time base.
///
/// `model_name` is the name of the model output. Its time is the fallback for
/// features whose own time is unusable; the model output itself has no
/// fallback.
///
/// Evaluations with invalid values stay invalid and do not take part in the
/// choice of time base.
pub fn merge_adaptive(
    results: &[EvaluationResult],
    feature: &str,
    model_name: &str,
) -> Result<Merged, RunError> {
    let invalid = Envelope::default();
    let envelopes: Vec<&Envelope> = results
        .iter()
        .map(|r| r.get(feature).unwrap_or(&invalid))
        .collect();

    let ndim = envelopes
        .iter()
        .find(|e| !e.values.is_invalid())
        .map_or(0, |e| e.values.ndim());

    match ndim {
        0 => {
            tracing::warn!(feature, "gives a 0D result. No interpolation performed");
            Ok(Merged {
                time: envelopes
                    .first()
                    .map_or(Values::Invalid, |e| e.time.clone()),
                evaluations: envelopes.iter().map(|e| e.values.clone()).collect(),
            })
        }
        1 => merge_vectors(results, &envelopes, feature, model_name),
        ndim => Err(RunError::UnsupportedShape {
            feature: feature.to_string(),
            ndim,
        }),
    }
}

fn merge_vectors(
    results: &[EvaluationResult],
    envelopes: &[&Envelope],
    feature: &str,
    model_name: &str,
) -> Result<Merged, RunError> {
    let mut times: Vec<Option<&[f64]>> = Vec::with_capacity(envelopes.len());

    for (index, envelope) in envelopes.iter().enumerate() {
        if envelope.values.is_invalid() {
            times.push(None);
            continue;
        }

        let time = match usable_time(&envelope.time) {
            Some(time) => time,
            None if feature != model_name => results[index]
                .get(model_name)
                .and_then(|model| usable_time(&model.time))
                .ok_or_else(|| RunError::TimeBase {
                    feature: feature.to_string(),
                    model: Some(model_name.to_string()),
                })?,
            None => {
                return Err(RunError::TimeBase {
                    feature: feature.to_string(),
                    model: None,
                });
            }
        };
        times.push(Some(time));
    }

    // First maximum wins on ties
    let base = times
        .iter()
        .flatten()
        .fold(None::<&[f64]>, |best, &t| match best {
            Some(b) if b.len() >= t.len() => Some(b),
            _ => Some(t),
        })
        .unwrap_or_default();

    let evaluations = envelopes
        .iter()
        .enumerate()
        .map(|(index, envelope)| {
            if envelope.values.is_invalid() {
                return Ok(Values::Invalid);
            }
            let interpolation =
                envelope
                    .interpolation
                    .as_ref()
                    .ok_or_else(|| RunError::MissingInterpolation {
                        feature: feature.to_string(),
                        evaluation: index,
                    })?;
            Ok(Values::Vector(interpolation.eval_many(base)))
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    Ok(Merged {
        time: Values::from(base),
        evaluations,
    })
}

/// A time array is usable when it is a 1-D vector holding at least one number.
/// Scalars and 2-D arrays count as malformed.
fn usable_time(time: &Values) -> Option<&[f64]> {
    time.as_vector().filter(|_| !time.is_all_nan())
}
