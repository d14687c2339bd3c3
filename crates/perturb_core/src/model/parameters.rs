//! Parameter declarations, node matrices and per-evaluation parameter sets.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{EvaluationError, RunError};

/// A declared model parameter with its nominal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Declared parameters in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Parameter>", into = "Vec<Parameter>")]
pub struct Parameters {
    items: Vec<Parameter>,
}

impl Parameters {
    /// Create from a list of parameters. Names must be unique.
    pub fn new(items: Vec<Parameter>) -> Result<Self, RunError> {
        for (i, parameter) in items.iter().enumerate() {
            if items[..i].iter().any(|p| p.name == parameter.name) {
                return Err(RunError::Config(format!(
                    "parameter {} is declared more than once",
                    parameter.name
                )));
            }
        }
        Ok(Self { items })
    }

    /// Create from `(name, nominal value)` pairs
    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, f64)>,
    ) -> Result<Self, RunError> {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, value)| Parameter::new(name, value))
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.items.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Override the nominal value of a declared parameter
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<(), RunError> {
        let parameter = self
            .items
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| RunError::Config(format!("parameter {name} is not declared")))?;
        parameter.value = value;
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<Parameter>> for Parameters {
    type Error = RunError;

    fn try_from(items: Vec<Parameter>) -> Result<Self, Self::Error> {
        Parameters::new(items)
    }
}

impl From<Parameters> for Vec<Parameter> {
    fn from(parameters: Parameters) -> Self {
        parameters.items
    }
}

/// Parameter values for a single evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: FxHashMap<String, f64>,
}

impl ParameterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, returning true if the name was not yet present
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> bool {
        self.values.insert(name.into(), value).is_none()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Look up a value that a model cannot run without
    pub fn require(&self, name: &str) -> Result<f64, EvaluationError> {
        self.get(name)
            .ok_or_else(|| EvaluationError::MissingParameter(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Sampled values of the uncertain parameters.
///
/// Shape is `(num_parameters, num_evaluations)`: row `i` holds every sample of
/// uncertain parameter `i`, column `j` is the node for evaluation `j`. Stored
/// row-major in a flat array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl NodeMatrix {
    /// Matrix of the given shape filled with `fill`
    #[must_use]
    pub fn filled(rows: usize, cols: usize, fill: f64) -> Self {
        Self {
            data: vec![fill; rows * cols],
            rows,
            cols,
        }
    }

    /// Build from one row per uncertain parameter. Rows must have equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RunError> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != cols) {
            return Err(RunError::Config(format!(
                "node row {bad} has {} samples, expected {cols}",
                rows[bad].len()
            )));
        }
        let n_rows = rows.len();
        Ok(Self {
            data: rows.into_iter().flatten().collect(),
            rows: n_rows,
            cols,
        })
    }

    /// Build from one column (node) per evaluation.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, RunError> {
        let rows = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().position(|col| col.len() != rows) {
            return Err(RunError::Config(format!(
                "node {bad} has {} values, expected {rows}",
                columns[bad].len()
            )));
        }
        let cols = columns.len();
        let mut data = vec![0.0; rows * cols];
        for (j, column) in columns.iter().enumerate() {
            for (i, &value) in column.iter().enumerate() {
                data[i * cols + j] = value;
            }
        }
        Ok(Self { data, rows, cols })
    }

    /// One-dimensional nodes: a single uncertain parameter, one scalar per evaluation.
    #[must_use]
    pub fn from_samples(samples: Vec<f64>) -> Self {
        let cols = samples.len();
        Self {
            data: samples,
            rows: 1,
            cols,
        }
    }

    /// Number of uncertain parameters (rows)
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.rows
    }

    /// Number of evaluations (columns)
    #[must_use]
    pub fn num_evaluations(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.data[row * self.cols + col])
    }

    /// Values of node `col`, one per uncertain parameter
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).filter_map(move |row| self.get(row, col))
    }

    /// Samples of uncertain parameter `row`
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.rows).then(|| &self.data[row * self.cols..(row + 1) * self.cols])
    }
}

/// Ordered names of the parameters varied in a run.
///
/// Accepts a single name or a sequence of names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UncertainParameters(Vec<String>);

impl UncertainParameters {
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for UncertainParameters {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for UncertainParameters {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for UncertainParameters {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for UncertainParameters {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for UncertainParameters {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<&[String]> for UncertainParameters {
    fn from(names: &[String]) -> Self {
        Self(names.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for UncertainParameters {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| (*s).to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_parameter_rejected() {
        let result = Parameters::from_pairs([("a", 1.0), ("a", 2.0)]);
        assert!(matches!(result, Err(RunError::Config(_))));
    }

    #[test]
    fn test_columns_and_rows_agree() {
        let by_rows = NodeMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let by_cols =
            NodeMatrix::from_columns(vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]])
                .unwrap();
        assert_eq!(by_rows, by_cols);
        assert_eq!(by_rows.shape(), (2, 3));
        assert_eq!(by_rows.column(1).collect::<Vec<_>>(), vec![2.0, 5.0]);
        assert_eq!(by_rows.row(1), Some(&[4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = NodeMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(RunError::Config(_))));
    }

    #[test]
    fn test_single_name_normalized() {
        let single: UncertainParameters = "kappa".into();
        assert_eq!(single.as_slice(), &["kappa".to_string()]);

        let many: UncertainParameters = ["kappa", "u_env"].into();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_parameters_serialize_as_list() {
        let params = Parameters::from_pairs([("a", 1.0), ("b", 2.0)]).unwrap();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"[{"name":"a","value":1.0},{"name":"b","value":2.0}]"#);
        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
