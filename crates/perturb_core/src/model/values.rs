//! Numeric values produced by one model or feature evaluation.
//!
//! `Values` replaces sentinel NaN markers with an explicit `Invalid` variant so
//! that "no valid value" can never be confused with a numeric result.

use serde::{Deserialize, Serialize};

/// Scalar, 1-D, or 2-D result of an evaluation, or the invalid marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Values {
    /// No valid value for this evaluation
    #[default]
    Invalid,
    Scalar(#[serde(with = "nan_scalar")] f64),
    Vector(#[serde(with = "nan_vector")] Vec<f64>),
    /// Row-major 2-D values. Rows may be ragged when a collaborator returns
    /// malformed output.
    Matrix(#[serde(with = "nan_matrix")] Vec<Vec<f64>>),
}

impl Values {
    /// Normalize a raw scalar: NaN becomes the invalid marker.
    #[must_use]
    pub fn scalar(value: f64) -> Self {
        if value.is_nan() {
            Values::Invalid
        } else {
            Values::Scalar(value)
        }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Values::Invalid)
    }

    /// True when there is no finite-or-infinite number anywhere, i.e. the
    /// values are the invalid marker or consist only of NaN.
    #[must_use]
    pub fn is_all_nan(&self) -> bool {
        match self {
            Values::Invalid => true,
            Values::Scalar(v) => v.is_nan(),
            Values::Vector(v) => v.iter().all(|x| x.is_nan()),
            Values::Matrix(rows) => rows.iter().flatten().all(|x| x.is_nan()),
        }
    }

    /// Number of dimensions. The invalid marker is zero-dimensional.
    #[must_use]
    pub fn ndim(&self) -> usize {
        match self {
            Values::Invalid | Values::Scalar(_) => 0,
            Values::Vector(_) => 1,
            Values::Matrix(_) => 2,
        }
    }

    /// Size of the outermost dimension, 1 for scalars.
    #[must_use]
    pub fn outer_len(&self) -> usize {
        match self {
            Values::Invalid | Values::Scalar(_) => 1,
            Values::Vector(v) => v.len(),
            Values::Matrix(rows) => rows.len(),
        }
    }

    /// Shape of the values, `None` for ragged matrices.
    #[must_use]
    pub fn shape(&self) -> Option<Vec<usize>> {
        match self {
            Values::Invalid | Values::Scalar(_) => Some(Vec::new()),
            Values::Vector(v) => Some(vec![v.len()]),
            Values::Matrix(rows) => {
                let cols = rows.first().map_or(0, Vec::len);
                rows.iter()
                    .all(|row| row.len() == cols)
                    .then(|| vec![rows.len(), cols])
            }
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Values::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Values::Vector(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_matrix(&self) -> Option<&[Vec<f64>]> {
        match self {
            Values::Matrix(rows) => Some(rows),
            _ => None,
        }
    }
}

impl From<f64> for Values {
    fn from(value: f64) -> Self {
        Values::scalar(value)
    }
}

impl From<Vec<f64>> for Values {
    fn from(values: Vec<f64>) -> Self {
        Values::Vector(values)
    }
}

impl From<&[f64]> for Values {
    fn from(values: &[f64]) -> Self {
        Values::Vector(values.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for Values {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Values::Matrix(rows)
    }
}

impl<T: Into<Values>> From<Option<T>> for Values {
    fn from(value: Option<T>) -> Self {
        value.map_or(Values::Invalid, Into::into)
    }
}

// JSON has no NaN, so non-finite-as-NaN entries travel as null.

mod nan_scalar {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

mod nan_vector {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|v| (!v.is_nan()).then_some(*v))
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Ok(Vec::<Option<f64>>::deserialize(deserializer)?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }
}

mod nan_matrix {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|v| (!v.is_nan()).then_some(*v))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<f64>>, D::Error> {
        Ok(Vec::<Vec<Option<f64>>>::deserialize(deserializer)?
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}
