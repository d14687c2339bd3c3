//! Plain-text summary of a run: mean and standard deviation per feature.

use std::fmt::Write;

use perturb_core::{Data, DataFeature, FeatureTime, Values};

/// Mean and population standard deviation of the finite entries
#[must_use]
pub fn mean_std(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (n, sum, sum_sq) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0usize, 0.0, 0.0), |(n, s, sq), v| (n + 1, s + v, sq + v * v));
    if n == 0 {
        return None;
    }
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    Some((mean, variance.sqrt()))
}

/// Per-time-point mean and standard deviation of a 1-D feature.
///
/// Only evaluations with the shared time base's length take part. Returns
/// `None` for features without a shared 1-D time base.
#[must_use]
pub fn time_statistics(feature: &DataFeature) -> Option<Vec<(f64, f64, f64)>> {
    let time = feature.time.shared()?.as_vector()?;
    let evaluations: Vec<&[f64]> = feature
        .evaluations
        .iter()
        .filter_map(Values::as_vector)
        .filter(|v| v.len() == time.len())
        .collect();

    time.iter()
        .enumerate()
        .map(|(i, &t)| {
            mean_std(evaluations.iter().map(|v| v[i])).map(|(mean, std)| (t, mean, std))
        })
        .collect()
}

fn summarize_feature(out: &mut String, feature: &DataFeature) -> std::fmt::Result {
    let valid = feature
        .evaluations
        .iter()
        .filter(|v| !v.is_all_nan())
        .count();
    write!(
        out,
        "{:<24} {:>5}/{:<5}",
        feature.name,
        valid,
        feature.evaluations.len()
    )?;

    match feature.ndim() {
        Some(0) => match mean_std(feature.evaluations.iter().filter_map(Values::as_scalar)) {
            Some((mean, std)) => writeln!(out, " mean {mean:>10.4}  std {std:>10.4}"),
            None => writeln!(out, " no valid values"),
        },
        Some(1) => match time_statistics(feature).and_then(|s| s.last().copied()) {
            Some((t, mean, std)) => writeln!(
                out,
                " mean {mean:>10.4}  std {std:>10.4}  at t={t:.4}"
            ),
            None if matches!(feature.time, FeatureTime::PerEvaluation(_)) => {
                writeln!(out, " raw per-evaluation output")
            }
            None => writeln!(out, " no shared time base"),
        },
        Some(n) => writeln!(out, " {n}D values"),
        None => writeln!(out, " no valid values"),
    }
}

/// Human-readable summary of the aggregated data
#[must_use]
pub fn summarize(data: &Data) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} varied over {}",
        data.model_name,
        data.uncertain_parameters.join(", ")
    );
    for feature in data.iter() {
        let _ = summarize_feature(&mut out, feature);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_std_skips_nan() {
        let (mean, std) = mean_std([1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(mean, 2.0);
        assert_eq!(std, 1.0);
        assert!(mean_std([f64::NAN]).is_none());
    }

    #[test]
    fn test_time_statistics() {
        let mut feature = DataFeature::new("model");
        feature.time = FeatureTime::Shared(Values::from(vec![0.0, 1.0]));
        feature.evaluations = vec![
            Values::from(vec![1.0, 2.0]),
            Values::from(vec![3.0, 4.0]),
            Values::Invalid,
        ];

        let stats = time_statistics(&feature).unwrap();
        assert_eq!(stats, vec![(0.0, 2.0, 1.0), (1.0, 3.0, 1.0)]);
    }

    #[test]
    fn test_summarize() {
        let mut data = Data::new();
        data.model_name = "coffee_cup".to_string();
        data.uncertain_parameters = vec!["kappa".to_string()];
        data.add_features(["final_temperature"]);
        if let Some(feature) = data.get_mut("final_temperature") {
            feature.evaluations = vec![Values::Scalar(20.0), Values::Scalar(22.0)];
        }

        let text = summarize(&data);
        assert!(text.starts_with("coffee_cup varied over kappa"));
        assert!(text.contains("final_temperature"));
        assert!(text.contains("21.0000"));
    }
}
