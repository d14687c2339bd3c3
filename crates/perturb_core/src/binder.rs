//! Parameter binding: node matrix columns overlaid on nominal values.

use crate::error::RunError;
use crate::model::{NodeMatrix, ParameterSet, Parameters, UncertainParameters};

/// Build one parameter set per node (column of `nodes`).
///
/// Row `i` of `nodes` holds the samples of `uncertain[i]`. Every declared
/// parameter not listed in `uncertain` keeps its nominal value.
pub fn bind_parameters(
    nodes: &NodeMatrix,
    uncertain: &UncertainParameters,
    parameters: &Parameters,
) -> Result<Vec<ParameterSet>, RunError> {
    if nodes.num_parameters() != uncertain.len() {
        return Err(RunError::Config(format!(
            "node matrix has {} rows but {} uncertain parameters were given",
            nodes.num_parameters(),
            uncertain.len()
        )));
    }

    for (i, name) in uncertain.as_slice().iter().enumerate() {
        if !parameters.contains(name) {
            return Err(RunError::Config(format!(
                "uncertain parameter {name} is not declared"
            )));
        }
        if uncertain.as_slice()[..i].contains(name) {
            return Err(RunError::Config(format!(
                "uncertain parameter {name} is listed more than once"
            )));
        }
    }

    let sets = (0..nodes.num_evaluations())
        .map(|col| {
            let mut set: ParameterSet = parameters
                .iter()
                .map(|p| (p.name.as_str(), p.value))
                .collect();
            for (name, value) in uncertain.as_slice().iter().zip(nodes.column(col)) {
                set.insert(name.as_str(), value);
            }
            set
        })
        .collect();

    Ok(sets)
}
