use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely-typed input to numeric coercion.
///
/// `Absent` and `Null` are kept apart: a missing key or CSV cell is
/// `Absent`, an explicit JSON `null` is `Null`. Both coerce to the default.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Absent,
    Null,
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<f32> for RawValue {
    fn from(n: f32) -> Self {
        RawValue::Number(f64::from(n))
    }
}

macro_rules! raw_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RawValue {
                fn from(n: $t) -> Self {
                    RawValue::Number(n as f64)
                }
            }
        )*
    };
}

raw_value_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<&String> for RawValue {
    fn from(s: &String) -> Self {
        RawValue::Text(s.clone())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Absent)
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            Value::String(s) => RawValue::Text(s),
            // 布林、陣列、物件以 JSON 文字處理，通常會退回預設值
            other => RawValue::Text(other.to_string()),
        }
    }
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => RawValue::Text(s.clone()),
            other => RawValue::from(other.clone()),
        }
    }
}

/// Policy for inputs that are already numeric NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum NanPolicy {
    /// Numeric NaN is returned unchanged.
    #[default]
    Preserve,
    /// Numeric NaN is replaced with the default.
    UseDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing keys read as `Absent`.
    pub fn raw(&self, field: &str) -> RawValue {
        self.data
            .get(field)
            .map(RawValue::from)
            .unwrap_or(RawValue::Absent)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionStats {
    pub records: usize,
    pub fields_coerced: usize,
    pub defaulted: usize,
    pub non_finite: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub columns: Vec<String>,
    pub processed_records: Vec<Record>,
    pub csv_output: Option<String>,
    pub json_output: Option<String>,
    pub stats: CoercionStats,
}
