//! `RunModel`: binds parameters, dispatches evaluations and assembles the
//! results of one run.

use std::sync::Arc;

use crate::assemble::Assembler;
use crate::binder::bind_parameters;
use crate::config::RunConfig;
use crate::dispatch::{Dispatcher, RunProgress};
use crate::display::{DisplayProvider, XvfbDisplay};
use crate::error::{Result, RunError};
use crate::evaluate::Evaluator;
use crate::model::{
    Data, EvaluationResult, NodeMatrix, ParameterSet, Parameters, UncertainParameters,
};
use crate::traits::{Features, Model, NoFeatures};

/// Runs a model over a set of nodes and aggregates the outputs.
///
/// ```ignore
/// let runner = RunModel::new(model, parameters).with_features(features);
/// let data = runner.run(&nodes, ["kappa", "u_env"])?;
/// ```
pub struct RunModel {
    model: Arc<dyn Model>,
    features: Arc<dyn Features>,
    parameters: Parameters,
    config: RunConfig,
    /// Injected provider. Without one, an [`XvfbDisplay`] is built from the
    /// display settings of the current configuration.
    display: Option<Arc<dyn DisplayProvider>>,
    progress: RunProgress,
}

impl RunModel {
    pub fn new(model: impl Model + 'static, parameters: Parameters) -> Self {
        Self::from_shared(Arc::new(model), parameters)
    }

    pub fn from_shared(model: Arc<dyn Model>, parameters: Parameters) -> Self {
        Self {
            model,
            features: Arc::new(NoFeatures),
            parameters,
            config: RunConfig::default(),
            display: None,
            progress: RunProgress::default(),
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: impl Features + 'static) -> Self {
        self.features = Arc::new(features);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `display` for graphics suppression instead of starting Xvfb. Kept
    /// across later [`with_config`](Self::with_config) calls.
    #[must_use]
    pub fn with_display(mut self, display: Arc<dyn DisplayProvider>) -> Self {
        self.display = Some(display);
        self
    }

    /// Share progress counters with another thread
    #[must_use]
    pub fn with_progress(mut self, progress: RunProgress) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn progress(&self) -> &RunProgress {
        &self.progress
    }

    #[must_use]
    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    #[must_use]
    pub fn features(&self) -> &dyn Features {
        self.features.as_ref()
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    fn validate(&self, nodes: &NodeMatrix) -> Result<()> {
        if nodes.num_evaluations() == 0 {
            return Err(RunError::Config("no nodes to evaluate".to_string()));
        }
        let model_name = self.model.name();
        if self.features.names().iter().any(|n| n == model_name) {
            return Err(RunError::Config(format!(
                "feature name {model_name} collides with the model name"
            )));
        }
        Ok(())
    }

    /// Evaluate the model and features for every parameter set, in order.
    pub fn evaluate_nodes(
        &self,
        parameter_sets: &[ParameterSet],
    ) -> Result<Vec<EvaluationResult>> {
        let workers = self.config.effective_workers()?;
        let evaluator = Evaluator::new(self.model.as_ref(), self.features.as_ref());

        let xvfb;
        let display: &dyn DisplayProvider = match &self.display {
            Some(display) => display.as_ref(),
            None => {
                xvfb = XvfbDisplay::new(self.config.display.clone());
                &xvfb
            }
        };

        Dispatcher::new(workers, display).dispatch(
            parameter_sets,
            self.model.suppress_graphics(),
            &self.progress,
            |parameters| evaluator.evaluate(parameters),
        )
    }

    /// Fold evaluation results into the aggregate dataset
    pub fn results_to_data(
        &self,
        results: &[EvaluationResult],
        uncertain: &UncertainParameters,
    ) -> Result<Data> {
        Assembler::new(self.model.as_ref(), self.features.as_ref()).assemble(results, uncertain)
    }

    /// Evaluate the model at every node and aggregate the results.
    ///
    /// Row `i` of `nodes` holds the samples of the `i`-th uncertain parameter.
    /// `uncertain` may be a single name or a sequence of names.
    pub fn run(
        &self,
        nodes: &NodeMatrix,
        uncertain: impl Into<UncertainParameters>,
    ) -> Result<Data> {
        let uncertain = uncertain.into();
        self.validate(nodes)?;

        let parameter_sets = bind_parameters(nodes, &uncertain, &self.parameters)?;
        let results = self.evaluate_nodes(&parameter_sets)?;
        self.results_to_data(&results, &uncertain)
    }
}
