//! Dispatcher tests: ordering, progress and display sessions

use std::thread;
use std::time::Duration;

use super::fixtures::CountingDisplay;
use crate::dispatch::{Dispatcher, RunProgress};
use crate::display::NoDisplay;
use crate::error::{EvaluationError, RunError};
use crate::model::ParameterSet;

fn indexed_sets(n: usize) -> Vec<ParameterSet> {
    (0..n)
        .map(|i| [("index", i as f64)].into_iter().collect())
        .collect()
}

/// Results land at their input index even when later inputs finish first
#[test]
fn test_results_keep_input_order() {
    let n = 16;
    let sets = indexed_sets(n);
    let display = CountingDisplay::default();
    let progress = RunProgress::default();

    let results = Dispatcher::new(4, &display)
        .dispatch(&sets, false, &progress, |p| {
            let index = p.require("index")?;
            // Early inputs sleep longest
            thread::sleep(Duration::from_millis((n as u64 - index as u64) * 2));
            Ok(index as usize)
        })
        .unwrap();

    assert_eq!(results, (0..n).collect::<Vec<_>>());
    assert_eq!(display.acquired(), 0);
}

#[test]
fn test_progress_counts_every_evaluation() {
    let sets = indexed_sets(10);
    let progress = RunProgress::new(0);

    Dispatcher::new(2, &NoDisplay)
        .dispatch(&sets, false, &progress, |_| Ok(()))
        .unwrap();

    assert_eq!(progress.total(), 10);
    assert_eq!(progress.completed(), 10);
    assert_eq!(progress.fraction(), 1.0);
}

/// A single failure aborts the batch and names the failing evaluation
#[test]
fn test_failure_aborts_with_index() {
    let sets = indexed_sets(8);
    let progress = RunProgress::default();

    let err = Dispatcher::new(3, &NoDisplay)
        .dispatch(&sets, false, &progress, |p| {
            let index = p.require("index")?;
            if index == 5.0 {
                Err(EvaluationError::Model("diverged".to_string()))
            } else {
                Ok(index)
            }
        })
        .unwrap_err();

    assert!(matches!(
        err,
        RunError::Evaluation {
            index: 5,
            source: EvaluationError::Model(_)
        }
    ));
}

#[test]
fn test_display_held_for_whole_dispatch() {
    let display = CountingDisplay::default();
    let probe = display.clone();

    Dispatcher::new(2, &display)
        .dispatch(&indexed_sets(4), true, &RunProgress::default(), |_| {
            assert_eq!(probe.acquired(), 1);
            assert_eq!(probe.released(), 0);
            Ok(())
        })
        .unwrap();

    assert_eq!(display.acquired(), 1);
    assert_eq!(display.released(), 1);
}

#[test]
fn test_display_released_on_error() {
    let display = CountingDisplay::default();

    let result = Dispatcher::new(2, &display).dispatch(
        &indexed_sets(4),
        true,
        &RunProgress::default(),
        |_| Err::<(), _>(EvaluationError::Model("boom".to_string())),
    );

    assert!(result.is_err());
    assert_eq!(display.acquired(), 1);
    assert_eq!(display.released(), 1);
}

#[test]
fn test_missing_display_capability_is_config_error() {
    let result = Dispatcher::new(1, &NoDisplay).dispatch(
        &indexed_sets(2),
        true,
        &RunProgress::default(),
        |_| Ok(()),
    );
    assert!(matches!(result, Err(RunError::Config(_))));
}
