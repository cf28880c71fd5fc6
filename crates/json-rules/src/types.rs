use serde_json::Value;

/// Any value a rule can produce: a JSON value or `undefined`.
///
/// `Undefined` marks absence (a missing key, an unset cascade) and is kept
/// distinct from JSON `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EvalValue {
    #[default]
    Undefined,
    Json(Value),
}

impl EvalValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, EvalValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, EvalValue::Json(Value::Null))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            EvalValue::Json(v) => Some(v),
            EvalValue::Undefined => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            EvalValue::Json(Value::Array(arr)) => Some(arr),
            _ => None,
        }
    }

    /// Converts into a JSON value, `undefined` becoming `null`.
    pub fn into_json(self) -> Value {
        match self {
            EvalValue::Json(v) => v,
            EvalValue::Undefined => Value::Null,
        }
    }

    /// Converts into an optional JSON value, `undefined` becoming `None`.
    pub fn into_option(self) -> Option<Value> {
        match self {
            EvalValue::Json(v) => Some(v),
            EvalValue::Undefined => None,
        }
    }
}

impl From<Value> for EvalValue {
    fn from(v: Value) -> Self {
        EvalValue::Json(v)
    }
}

impl From<Option<Value>> for EvalValue {
    fn from(v: Option<Value>) -> Self {
        v.map(EvalValue::Json).unwrap_or(EvalValue::Undefined)
    }
}

impl From<bool> for EvalValue {
    fn from(b: bool) -> Self {
        EvalValue::Json(Value::Bool(b))
    }
}

impl From<String> for EvalValue {
    fn from(s: String) -> Self {
        EvalValue::Json(Value::String(s))
    }
}

impl From<&str> for EvalValue {
    fn from(s: &str) -> Self {
        EvalValue::Json(Value::String(s.to_string()))
    }
}

impl From<Vec<Value>> for EvalValue {
    fn from(arr: Vec<Value>) -> Self {
        EvalValue::Json(Value::Array(arr))
    }
}

impl PartialEq<Value> for EvalValue {
    fn eq(&self, other: &Value) -> bool {
        matches!(self, EvalValue::Json(v) if v == other)
    }
}
