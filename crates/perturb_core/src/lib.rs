//! Model execution and result aggregation for uncertainty quantification
//!
//! This crate runs a simulation model once per sampled parameter set and
//! folds the outputs into one dataset for downstream statistics:
//! - Parameter binding of sampled nodes onto nominal parameter values
//! - Parallel evaluation on a scoped worker pool, results kept in node order
//! - Optional virtual display for models that draw graphics
//! - Regularity checks for fixed-length outputs
//! - Interpolation of adaptive outputs onto a shared time base
//!
//! # Example
//!
//! ```ignore
//! use perturb_core::{FnModel, ModelOutput, NodeMatrix, Parameters, RunModel};
//!
//! let model = FnModel::new("decay", |p| {
//!     let k = p.require("k")?;
//!     let time: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
//!     let values = time.iter().map(|t| (-k * t).exp()).collect::<Vec<_>>();
//!     Ok(ModelOutput::new(time, values))
//! });
//! let parameters = Parameters::from_pairs([("k", 1.0)])?;
//! let nodes = NodeMatrix::from_samples(vec![0.8, 1.0, 1.2]);
//!
//! let data = RunModel::new(model, parameters).run(&nodes, "k")?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Pipeline stages
// ============================================================================

pub mod assemble;
pub mod binder;
pub mod dispatch;
pub mod display;
pub mod evaluate;
pub mod interpolate;
pub mod regularity;
pub mod runner;

// ============================================================================
// Types and interfaces
// ============================================================================

pub mod config;
pub mod error;
pub mod model;
pub mod traits;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{DisplayConfig, RunConfig};
pub use dispatch::RunProgress;
pub use display::{DisplayGuard, DisplayProvider, NoDisplay, XvfbDisplay};
pub use error::{EvaluationError, RunError};
pub use model::{
    Data, DataFeature, Envelope, EvaluationResult, FeatureTime, Interpolate, Interpolation,
    LinearInterpolant, ModelOutput, NodeMatrix, Parameter, ParameterSet, Parameters,
    UncertainParameters, Values,
};
pub use runner::RunModel;
pub use traits::{FeatureSet, Features, FnModel, Model, NoFeatures};
