//! Parameter grids and the job assignments expanded from them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single candidate value for a hyperparameter.
///
/// Grids are written by hand in JSON, so values are heterogeneous. The
/// untagged representation keeps the JSON form unchanged on round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Json(serde_json::Value),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Targets are usually Python scripts, which spell booleans this way.
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write_float(f, *v),
            Self::Str(s) => f.write_str(s),
            Self::Json(serde_json::Value::Null) => f.write_str("None"),
            Self::Json(serde_json::Value::String(s)) => f.write_str(s),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Shortest round-trip digits, positional for decimal exponents in
/// `-4..16` and `1e-05` style otherwise; integral values keep a `.0`.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("nan");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
    }

    let scientific = format!("{v:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let positional = v.to_string();
        if positional.contains('.') {
            f.write_str(&positional)
        } else {
            write!(f, "{positional}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<serde_json::Value> for ParameterValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Number(ref n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(x) = n.as_f64() {
                    Self::Float(x)
                } else {
                    Self::Json(v)
                }
            }
            other => Self::Json(other),
        }
    }
}

/// How a job assignment is turned into command-line tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArgStyle {
    /// `--key=value`, for argparse-style programs.
    #[default]
    Flag,
    /// `key=value`, for override-style programs (hydra and friends).
    Bare,
}

impl ArgStyle {
    pub fn from_is_argparse(is_argparse: bool) -> Self {
        if is_argparse {
            Self::Flag
        } else {
            Self::Bare
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Flag => "--",
            Self::Bare => "",
        }
    }
}

/// Declarative sweep: parameter name to the ordered candidate values.
///
/// Dimension order is the declaration order and is significant: the last
/// dimension varies fastest when the grid is expanded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterGrid {
    dimensions: IndexMap<String, Vec<ParameterValue>>,
}

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dimension. Re-adding a name replaces its values in place.
    pub fn add<V: Into<ParameterValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.dimensions
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &[ParameterValue])> {
        self.dimensions
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Number of assignments this grid expands to (`None` on overflow).
    ///
    /// An empty grid counts as one assignment with no parameters; any
    /// dimension with no values makes the whole grid contribute nothing.
    pub fn combination_count(&self) -> Option<usize> {
        self.dimensions
            .values()
            .try_fold(1usize, |total, values| total.checked_mul(values.len()))
    }
}

/// One fully resolved set of hyperparameter values for a single run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobAssignment {
    params: IndexMap<String, ParameterValue>,
}

impl JobAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.params.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Render the assignment as command-line tokens, each followed by a
    /// single space, in key order.
    pub fn to_args(&self, style: ArgStyle) -> String {
        let prefix = style.prefix();
        self.params
            .iter()
            .map(|(k, v)| format!("{prefix}{k}={v} "))
            .collect()
    }
}

/// Ordered sequence of job assignments across every supplied grid.
pub type JobList = Vec<JobAssignment>;
