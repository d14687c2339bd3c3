mod data;
mod envelope;
mod interpolation;
mod parameters;
mod values;

pub use data::{Data, DataFeature, FeatureTime};
pub use envelope::{Envelope, EvaluationResult, ModelOutput};
pub use interpolation::{Interpolate, Interpolation, LinearInterpolant};
pub use parameters::{NodeMatrix, Parameter, ParameterSet, Parameters, UncertainParameters};
pub use values::Values;
