use crate::error::{Result, RuleError};
use crate::rule::CastType;
use crate::types::EvalValue;
use crate::util::{describe, f64_to_value, is_truthy, numeric, to_js_string};
use serde_json::Value;

pub(super) fn apply(cast_to: &CastType, path_val: &EvalValue) -> Result<EvalValue> {
    match cast_to {
        CastType::String => Ok(to_js_string(path_val).into()),
        CastType::Boolean => Ok(is_truthy(path_val).into()),
        CastType::Number => numeric(path_val)
            .map(|n| EvalValue::Json(f64_to_value(n)))
            .ok_or_else(|| {
                RuleError::domain(format!(
                    "Cannot cast non-numeric value to number. Value: {}",
                    describe(path_val)
                ))
            }),
        CastType::Json => {
            let text = to_js_string(path_val);
            serde_json::from_str::<Value>(&text)
                .map(EvalValue::Json)
                .map_err(|e| RuleError::domain(format!("Unable to cast to JSON. Value: {text}: {e}")))
        }
        CastType::Unsupported(name) => Err(RuleError::domain(format!(
            "Casting to \"{name}\" not currently supported"
        ))),
    }
}
