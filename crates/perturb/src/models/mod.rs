//! Built-in demo models

mod coffee_cup;

use std::sync::Arc;

use perturb_core::{FeatureSet, Model, Parameters};

pub use coffee_cup::CoffeeCup;

/// A model ready to run, with its features and nominal parameters
pub struct BuiltinModel {
    pub model: Arc<dyn Model>,
    pub features: FeatureSet,
    pub parameters: Parameters,
}

/// Names and one-line descriptions of the built-in models
pub const MODELS: &[(&str, &str)] = &[
    (
        "coffee_cup",
        "Newton cooling of a coffee cup on a fixed 150-point grid",
    ),
    (
        "coffee_cup_adaptive",
        "Newton cooling with a time grid that depends on the cooling rate",
    ),
];

/// Look up a built-in model by name
#[must_use]
pub fn builtin(name: &str) -> Option<BuiltinModel> {
    let model: Arc<dyn Model> = match name {
        "coffee_cup" => Arc::new(CoffeeCup::new()),
        "coffee_cup_adaptive" => Arc::new(CoffeeCup::adaptive_grid()),
        _ => return None,
    };
    Some(BuiltinModel {
        model,
        features: coffee_cup::features(),
        parameters: CoffeeCup::parameters(),
    })
}
