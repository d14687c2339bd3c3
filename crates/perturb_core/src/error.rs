//! Error types for model evaluation and result aggregation.
//!
//! [`EvaluationError`] is what model and feature collaborators report from a
//! single evaluation. [`RunError`] is the taxonomy surfaced to callers of
//! [`crate::runner::RunModel::run`]; none of its variants are recovered
//! internally.

/// Failure inside a single model or feature evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("model failed: {0}")]
    Model(String),

    #[error("feature {feature} failed: {message}")]
    Feature { feature: String, message: String },

    #[error("unable to build interpolation for {feature}: {message}")]
    Interpolation { feature: String, message: String },

    #[error("parameter {0} is not set")]
    MissingParameter(String),
}

/// Errors raised while building an interpolation object.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolantError {
    #[error("time has {time} points but values has {values}")]
    LengthMismatch { time: usize, values: usize },

    #[error("at least 2 finite points are required, got {0}")]
    TooFewPoints(usize),
}

/// Errors surfaced by a `run` invocation.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(
        "{feature}: The number of points varies between evaluations. \
         Try setting adaptive to true in {feature}"
    )]
    Irregular { feature: String },

    #[error("Feature: {feature}, no support for >= 2D interpolation (got {ndim}D values)")]
    UnsupportedShape { feature: String, ndim: usize },

    #[error("{}", time_base_message(.feature, .model.as_deref()))]
    TimeBase {
        feature: String,
        /// Model whose time was tried as a fallback, if any.
        model: Option<String>,
    },

    #[error("{feature}: evaluation {evaluation} has no interpolation object")]
    MissingInterpolation { feature: String, evaluation: usize },

    #[error("evaluation {index} failed: {source}")]
    Evaluation {
        index: usize,
        #[source]
        source: EvaluationError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn time_base_message(feature: &str, model: Option<&str>) -> String {
    match model {
        Some(model) => format!(
            "Neither {feature} or {model} has valid time values to use in the interpolation"
        ),
        None => format!("{feature} has no valid time values to use in the interpolation"),
    }
}

impl RunError {
    /// Name of the feature the error refers to, when there is one.
    #[must_use]
    pub fn feature(&self) -> Option<&str> {
        match self {
            RunError::Irregular { feature }
            | RunError::UnsupportedShape { feature, .. }
            | RunError::TimeBase { feature, .. }
            | RunError::MissingInterpolation { feature, .. } => Some(feature),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RunError>;
