//! Interpolation merger tests

use super::fixtures::{adaptive, envelope, grid, result};
use crate::error::RunError;
use crate::interpolate::merge_adaptive;
use crate::model::{EvaluationResult, Values};

fn linear(time: &[f64], slope: f64) -> Vec<f64> {
    time.iter().map(|t| slope * t).collect()
}

fn model_entry() -> (&'static str, crate::model::Envelope) {
    let time = grid(4);
    ("model", envelope(time.clone(), linear(&time, 1.0)))
}

/// Time lengths [5, 8, 3] resample every evaluation onto the 8-point base
#[test]
fn test_longest_time_becomes_base() {
    let results: Vec<EvaluationResult> = [5, 8, 3]
        .into_iter()
        .map(|n| {
            let time = grid(n);
            result(vec![model_entry(), ("feature", adaptive(time.clone(), linear(&time, 2.0)))])
        })
        .collect();

    let merged = merge_adaptive(&results, "feature", "model").unwrap();

    assert_eq!(merged.time.as_vector().unwrap().len(), 8);
    assert_eq!(merged.time, Values::from(grid(8)));
    assert_eq!(merged.evaluations.len(), 3);
    for evaluation in &merged.evaluations {
        let values = evaluation.as_vector().unwrap();
        assert_eq!(values.len(), 8);
        for (v, t) in values.iter().zip(grid(8)) {
            assert!((v - 2.0 * t).abs() < 1e-12);
        }
    }
}

/// Ties keep the first evaluation with the most points
#[test]
fn test_first_longest_wins() {
    let early: Vec<f64> = (0..4).map(f64::from).collect();
    let late: Vec<f64> = (10..14).map(f64::from).collect();
    let results = vec![
        result(vec![("model", adaptive(early.clone(), early.clone()))]),
        result(vec![("model", adaptive(late.clone(), late.clone()))]),
    ];

    let merged = merge_adaptive(&results, "model", "model").unwrap();
    assert_eq!(merged.time, Values::from(early));
}

#[test]
fn test_two_dimensional_is_unsupported() {
    let results = vec![result(vec![(
        "feature",
        envelope(grid(2), vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
    )])];

    let err = merge_adaptive(&results, "feature", "model").unwrap_err();
    assert!(matches!(
        err,
        RunError::UnsupportedShape { ref feature, ndim: 2 } if feature == "feature"
    ));
}

/// 0-D adaptive outputs are stored raw with the first evaluation's time
#[test]
fn test_scalar_skips_interpolation() {
    let results: Vec<_> = [1.0, 2.0, 3.0]
        .into_iter()
        .map(|v| result(vec![("feature", envelope(Values::Invalid, v))]))
        .collect();

    let merged = merge_adaptive(&results, "feature", "model").unwrap();
    assert_eq!(merged.time, Values::Invalid);
    assert_eq!(
        merged.evaluations,
        vec![Values::Scalar(1.0), Values::Scalar(2.0), Values::Scalar(3.0)]
    );
}

/// A feature without time falls back to the model's time
#[test]
fn test_feature_falls_back_to_model_time() {
    let model_time = grid(6);
    let results: Vec<_> = (0..2)
        .map(|_| {
            let values = linear(&model_time, 3.0);
            let interpolant = crate::model::LinearInterpolant::new(&model_time, &values).unwrap();
            result(vec![
                ("model", envelope(model_time.clone(), values.clone())),
                (
                    "feature",
                    envelope(Values::Invalid, values).with_interpolation(interpolant.into_shared()),
                ),
            ])
        })
        .collect();

    let merged = merge_adaptive(&results, "feature", "model").unwrap();
    assert_eq!(merged.time, Values::from(model_time));
}

/// An all-NaN time counts as missing, as does a malformed scalar time
#[test]
fn test_nan_and_scalar_time_trigger_fallback() {
    let model_time = grid(3);
    let values = linear(&model_time, 1.0);
    let interpolant = crate::model::LinearInterpolant::new(&model_time, &values)
        .unwrap()
        .into_shared();

    let results = vec![
        result(vec![
            ("model", envelope(model_time.clone(), values.clone())),
            (
                "feature",
                envelope(vec![f64::NAN; 3], values.clone()).with_interpolation(interpolant.clone()),
            ),
        ]),
        result(vec![
            ("model", envelope(model_time.clone(), values.clone())),
            (
                "feature",
                envelope(Values::Scalar(1.0), values).with_interpolation(interpolant),
            ),
        ]),
    ];

    let merged = merge_adaptive(&results, "feature", "model").unwrap();
    assert_eq!(merged.time, Values::from(model_time));
}

#[test]
fn test_no_time_anywhere_names_feature_and_model() {
    let results = vec![result(vec![
        ("model", envelope(Values::Invalid, Values::Scalar(1.0))),
        ("feature", envelope(Values::Invalid, vec![1.0, 2.0])),
    ])];

    let err = merge_adaptive(&results, "feature", "model").unwrap_err();
    assert!(matches!(
        &err,
        RunError::TimeBase { feature, model: Some(model) } if feature == "feature" && model == "model"
    ));
    assert!(err.to_string().contains("Neither feature or model"));
}

/// The model output has no fallback for its own time
#[test]
fn test_model_without_time_has_no_fallback() {
    let results = vec![result(vec![(
        "model",
        envelope(Values::Invalid, vec![1.0, 2.0, 3.0]),
    )])];

    let err = merge_adaptive(&results, "model", "model").unwrap_err();
    assert!(matches!(err, RunError::TimeBase { model: None, .. }));
}

#[test]
fn test_missing_interpolation_object() {
    let time = grid(4);
    let results = vec![
        result(vec![("feature", adaptive(time.clone(), time.clone()))]),
        result(vec![("feature", envelope(time.clone(), time))]),
    ];

    let err = merge_adaptive(&results, "feature", "model").unwrap_err();
    assert!(matches!(
        err,
        RunError::MissingInterpolation { evaluation: 1, .. }
    ));
}

/// Invalid evaluations stay invalid and do not pick the time base
#[test]
fn test_invalid_evaluation_passes_through() {
    let time = grid(5);
    let results = vec![
        result(vec![("feature", envelope(Values::Invalid, Values::Invalid))]),
        result(vec![("feature", adaptive(time.clone(), time.clone()))]),
    ];

    let merged = merge_adaptive(&results, "feature", "model").unwrap();
    assert_eq!(merged.evaluations[0], Values::Invalid);
    assert_eq!(merged.evaluations[1], Values::from(time.clone()));
    assert_eq!(merged.time, Values::from(time));
}
