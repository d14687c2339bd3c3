//! Regularity check: do all evaluations of a feature have the same length?

use crate::model::{EvaluationResult, Values};

/// True when every valid evaluation of `feature` has the same outer length.
///
/// Invalid evaluations and evaluations missing the feature are skipped, so
/// zero or one valid evaluation is trivially regular.
#[must_use]
pub fn is_regular(results: &[EvaluationResult], feature: &str) -> bool {
    let mut lengths = results
        .iter()
        .filter_map(|result| result.get(feature))
        .map(|envelope| &envelope.values)
        .filter(|values| !values.is_invalid())
        .map(Values::outer_len);

    match lengths.next() {
        Some(first) => lengths.all(|len| len == first),
        None => true,
    }
}
