//! Newton's law of cooling for a cup of coffee.
//!
//! `du/dt = kappa * alpha * (u - u_env)` with `u(0) = 95`, solved in closed
//! form on `t` in `[0, 200]`.

use perturb_core::{EvaluationError, FeatureSet, Model, ModelOutput, ParameterSet, Parameters};

const INITIAL_TEMPERATURE: f64 = 95.0;
const END_TIME: f64 = 200.0;
const FIXED_POINTS: usize = 150;
/// Temperature considered drinkable by `time_to_cool`
const COOL_TEMPERATURE: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct CoffeeCup {
    name: &'static str,
    adaptive: bool,
    labels: Vec<String>,
}

impl CoffeeCup {
    /// Fixed 150-point time grid
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "coffee_cup",
            adaptive: false,
            labels: vec!["Time (s)".to_string(), "Temperature (C)".to_string()],
        }
    }

    /// Number of time points grows with the cooling rate
    #[must_use]
    pub fn adaptive_grid() -> Self {
        Self {
            name: "coffee_cup_adaptive",
            adaptive: true,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn parameters() -> Parameters {
        Parameters::from_pairs([("kappa", -0.05), ("alpha", 1.0), ("u_env", 20.0)])
            .unwrap_or_default()
    }

    fn points(&self, rate: f64) -> usize {
        if self.adaptive {
            ((rate.abs() * 3000.0).round() as usize).clamp(20, 400)
        } else {
            FIXED_POINTS
        }
    }
}

impl Default for CoffeeCup {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for CoffeeCup {
    fn name(&self) -> &str {
        self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn adaptive(&self) -> bool {
        self.adaptive
    }

    fn run(&self, parameters: &ParameterSet) -> Result<ModelOutput, EvaluationError> {
        let kappa = parameters.require("kappa")?;
        let alpha = parameters.require("alpha")?;
        let u_env = parameters.require("u_env")?;
        let rate = kappa * alpha;

        let n = self.points(rate);
        let time: Vec<f64> = (0..n)
            .map(|i| END_TIME * i as f64 / (n - 1) as f64)
            .collect();
        let temperature = time
            .iter()
            .map(|t| u_env + (INITIAL_TEMPERATURE - u_env) * (rate * t).exp())
            .collect::<Vec<_>>();

        if temperature.iter().any(|u| !u.is_finite()) {
            return Err(EvaluationError::Model(format!(
                "temperature diverged for kappa={kappa}, alpha={alpha}"
            )));
        }

        Ok(ModelOutput::new(time, temperature))
    }
}

/// `final_temperature` and `time_to_cool` (0-D) and the adaptive 1-D
/// `temperature_difference`.
#[must_use]
pub fn features() -> FeatureSet {
    FeatureSet::new()
        .feature("final_temperature", |output| {
            let temperature = output.values.as_vector().unwrap_or_default();
            Ok(ModelOutput::untimed(temperature.last().copied()))
        })
        .feature("time_to_cool", |output| {
            let time = output.time.as_vector().unwrap_or_default();
            let temperature = output.values.as_vector().unwrap_or_default();
            let cooled = time
                .iter()
                .zip(temperature)
                .find(|(_, u)| **u <= COOL_TEMPERATURE)
                .map(|(t, _)| *t);
            Ok(ModelOutput::untimed(cooled))
        })
        .adaptive_feature("temperature_difference", |output| {
            let temperature = output.values.as_vector().unwrap_or_default();
            let start = temperature.first().copied().unwrap_or(f64::NAN);
            Ok(ModelOutput::untimed(
                temperature.iter().map(|u| start - u).collect::<Vec<_>>(),
            ))
        })
        .labels("final_temperature", ["Temperature (C)"])
        .labels("time_to_cool", ["Time (s)"])
        .labels(
            "temperature_difference",
            ["Time (s)", "Temperature drop (C)"],
        )
}
