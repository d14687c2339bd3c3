//! Shared builders for scenario tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::display::{DisplayGuard, DisplayProvider};
use crate::error::RunError;
use crate::model::{Envelope, EvaluationResult, LinearInterpolant, Values};

pub fn envelope(time: impl Into<Values>, values: impl Into<Values>) -> Envelope {
    Envelope::new(time.into(), values.into())
}

/// Envelope of an adaptive 1-D output, with its interpolation object
pub fn adaptive(time: Vec<f64>, values: Vec<f64>) -> Envelope {
    let interpolant = LinearInterpolant::new(&time, &values).unwrap();
    Envelope::new(time.into(), values.into()).with_interpolation(interpolant.into_shared())
}

/// `n` evenly spaced points on `[0, 1]`
pub fn grid(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
}

pub fn result(entries: Vec<(&str, Envelope)>) -> EvaluationResult {
    entries.into_iter().collect()
}

/// Display provider that counts sessions instead of starting a server
#[derive(Debug, Default, Clone)]
pub struct CountingDisplay {
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

impl CountingDisplay {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

struct CountingGuard {
    released: Arc<AtomicUsize>,
}

impl DisplayGuard for CountingGuard {
    fn name(&self) -> &str {
        ":test"
    }
}

impl Drop for CountingGuard {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl DisplayProvider for CountingDisplay {
    fn acquire(&self) -> Result<Box<dyn DisplayGuard>, RunError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingGuard {
            released: Arc::clone(&self.released),
        }))
    }
}
