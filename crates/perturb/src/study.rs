//! YAML study files: which model to run, how to sample it, how to run it.
//!
//! ```yaml
//! model: coffee_cup_adaptive
//! samples: 200
//! seed: 7
//! parameters:
//!   - name: kappa
//!     value: -0.05
//!     distribution:
//!       type: uniform
//!       lower: -0.075
//!       upper: -0.025
//!   - name: u_env
//!     value: 20.0
//!     distribution:
//!       type: normal
//!       mean: 20.0
//!       std_dev: 1.5
//! run:
//!   workers: 4
//! ```

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use perturb_core::{NodeMatrix, Parameters, RunConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

fn default_samples() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

/// Sampling distribution of an uncertain parameter, tagged by `type` in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionData {
    Uniform { lower: f64, upper: f64 },
    Normal { mean: f64, std_dev: f64 },
}

impl DistributionData {
    /// Draw `n` samples
    pub fn sample_n<R: rand::Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Result<Vec<f64>> {
        match self {
            DistributionData::Uniform { lower, upper } => {
                if lower >= upper {
                    return Err(eyre!(
                        "invalid uniform distribution: lower {lower} must be below upper {upper}"
                    ));
                }
                let dist = rand_distr::Uniform::new(*lower, *upper).map_err(|e| {
                    eyre!("invalid uniform distribution [{lower}, {upper}): {e}")
                })?;
                Ok((0..n).map(|_| dist.sample(rng)).collect())
            }
            DistributionData::Normal { mean, std_dev } => {
                if *std_dev < 0.0 {
                    return Err(eyre!(
                        "invalid normal distribution: std_dev {std_dev} is negative"
                    ));
                }
                let dist = rand_distr::Normal::new(*mean, *std_dev).map_err(|e| {
                    eyre!("invalid normal distribution (mean={mean}, std_dev={std_dev}): {e}")
                })?;
                Ok((0..n).map(|_| dist.sample(rng)).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterData {
    pub name: String,
    /// Overrides the model's nominal value
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub distribution: Option<DistributionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyFile {
    /// Name of a built-in model
    pub model: String,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub parameters: Vec<ParameterData>,
    /// Parameters to vary. Defaults to every parameter with a distribution.
    #[serde(default)]
    pub uncertain: Option<Vec<String>>,
    #[serde(default)]
    pub run: RunConfig,
}

impl StudyFile {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Save to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read study file {}", path.display()))?;
        Self::from_yaml(&content)
            .map_err(|e| eyre!("failed to parse study file {}: {e}", path.display()))
    }

    fn parameter(&self, name: &str) -> Option<&ParameterData> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Apply the study's nominal value overrides to the model's parameters
    pub fn apply_values(&self, parameters: &mut Parameters) -> Result<()> {
        for parameter in &self.parameters {
            if !parameters.contains(&parameter.name) {
                bail!(
                    "study parameter {} is not a parameter of {}",
                    parameter.name,
                    self.model
                );
            }
            if let Some(value) = parameter.value {
                parameters.set_value(&parameter.name, value)?;
            }
        }
        Ok(())
    }

    /// Names of the parameters to vary, in study order
    pub fn uncertain_names(&self) -> Result<Vec<String>> {
        let names: Vec<String> = match &self.uncertain {
            Some(names) => names.clone(),
            None => self
                .parameters
                .iter()
                .filter(|p| p.distribution.is_some())
                .map(|p| p.name.clone())
                .collect(),
        };

        if names.is_empty() {
            bail!("study has no uncertain parameters");
        }
        for name in &names {
            if self
                .parameter(name)
                .and_then(|p| p.distribution.as_ref())
                .is_none()
            {
                bail!("uncertain parameter {name} has no distribution");
            }
        }
        Ok(names)
    }

    /// Sample one row per uncertain parameter, `samples` columns
    pub fn sample_nodes(&self, names: &[String]) -> Result<NodeMatrix> {
        if self.samples == 0 {
            bail!("samples must be at least 1");
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let rows = names
            .iter()
            .map(|name| {
                let distribution = self
                    .parameter(name)
                    .and_then(|p| p.distribution.as_ref())
                    .ok_or_else(|| eyre!("uncertain parameter {name} has no distribution"))?;
                distribution.sample_n(&mut rng, self.samples)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NodeMatrix::from_rows(rows)?)
    }
}
