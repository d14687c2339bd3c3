//! Study files run through `RunModel` with the built-in models

use perturb_core::{Data, FeatureTime, RunModel};

use crate::models;
use crate::study::StudyFile;

fn run(yaml: &str) -> Data {
    let study = StudyFile::from_yaml(yaml).unwrap();
    let builtin = models::builtin(&study.model).unwrap();
    let mut parameters = builtin.parameters;
    study.apply_values(&mut parameters).unwrap();
    let uncertain = study.uncertain_names().unwrap();
    let nodes = study.sample_nodes(&uncertain).unwrap();

    RunModel::from_shared(builtin.model, parameters)
        .with_features(builtin.features)
        .with_config(study.run.clone())
        .run(&nodes, uncertain)
        .unwrap()
}

const ADAPTIVE: &str = include_str!("../../studies/coffee_cup_adaptive.yaml");

/// The bundled study runs and interpolates the adaptive output
#[test]
fn test_adaptive_study() {
    let data = run(ADAPTIVE);

    assert_eq!(data.model_name, "coffee_cup_adaptive");
    assert_eq!(data.uncertain_parameters, vec!["kappa", "u_env"]);

    let model = data.get("coffee_cup_adaptive").unwrap();
    assert_eq!(model.evaluations.len(), 200);
    let time = model.time.shared().unwrap();
    for evaluation in &model.evaluations {
        assert_eq!(evaluation.outer_len(), time.outer_len());
    }

    let difference = data.get("temperature_difference").unwrap();
    assert_eq!(difference.time, model.time);
    assert_eq!(difference.labels, vec!["Time (s)", "Temperature drop (C)"]);
}

/// The fixed-grid model is regular and keeps the first evaluation's time
#[test]
fn test_regular_study() {
    let data = run(
        "model: coffee_cup\nsamples: 20\nparameters:\n  - name: kappa\n    distribution:\n      \
         type: uniform\n      lower: -0.06\n      upper: -0.04\n",
    );

    let model = data.get("coffee_cup").unwrap();
    let FeatureTime::Shared(time) = &model.time else {
        panic!("expected a shared time base");
    };
    assert_eq!(time.outer_len(), 150);
    assert_eq!(model.labels, vec!["Time (s)", "Temperature (C)"]);

    let finals = &data.get("final_temperature").unwrap().evaluations;
    assert_eq!(finals.len(), 20);
    assert!(finals.iter().all(|v| v.as_scalar().is_some()));
}

/// The dataset written by a run loads back with the same layout
#[test]
fn test_data_round_trips_through_json() {
    let data = run("model: coffee_cup\nsamples: 5\nparameters:\n  - name: u_env\n    distribution:\n      type: normal\n      mean: 21.0\n      std_dev: 0.5\n");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    crate::util::io::atomic_write(&path, &data.to_json().unwrap()).unwrap();

    let loaded = Data::load(&path).unwrap();
    assert_eq!(loaded.model_name, data.model_name);
    assert_eq!(
        loaded.feature_names().collect::<Vec<_>>(),
        data.feature_names().collect::<Vec<_>>()
    );

    let before = data.get("final_temperature").unwrap();
    let after = loaded.get("final_temperature").unwrap();
    for (a, b) in before.evaluations.iter().zip(&after.evaluations) {
        let (a, b) = (a.as_scalar().unwrap(), b.as_scalar().unwrap());
        assert!((a - b).abs() < 1e-9);
    }
}
