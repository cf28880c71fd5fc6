//! Value coercion helpers shared by the condition and rule evaluators.

use crate::error::{Result, RuleError};
use crate::operators::{InversionOperator, ValueArithmeticOperator, ValueOperator};
use crate::types::EvalValue;
use serde_json::Value;
use std::sync::OnceLock;

// ----------------------------------------------------------------- Numbers

fn numeric_literal_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$")
            .expect("numeric literal pattern is valid")
    })
}

/// Parses a string holding a complete decimal literal (surrounding
/// whitespace allowed).
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !numeric_literal_regex().is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// The numeric reading of a value: finite numbers, or strings that hold a
/// complete decimal literal. Everything else is not numeric.
pub fn numeric(value: &EvalValue) -> Option<f64> {
    match value {
        EvalValue::Json(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()),
        EvalValue::Json(Value::String(s)) => parse_numeric_str(s),
        _ => None,
    }
}

/// Converts an `f64` into JSON, keeping integral values as JSON integers.
pub fn f64_to_value(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Wraps a finite arithmetic result, rejecting NaN and infinities.
pub fn finite_number(operator: &str, n: f64) -> Result<EvalValue> {
    if !n.is_finite() {
        return Err(RuleError::domain(format!(
            "Operation \"{operator}\" produced a non-finite result"
        )));
    }
    Ok(EvalValue::Json(f64_to_value(n)))
}

/// Renders a number the way it is printed in rule output and string casts.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        return format!("{n}");
    }
    let s = format!("{n:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}

// ----------------------------------------------------------------- Strings

/// The canonical to-string conversion.
///
/// Numbers print in their shortest decimal form, booleans as
/// `"true"`/`"false"`, `null`/`undefined` by name, objects as compact JSON
/// and arrays as their comma-joined elements (`null` elements join as empty
/// strings).
pub fn to_js_string(value: &EvalValue) -> String {
    match value {
        EvalValue::Undefined => "undefined".to_string(),
        EvalValue::Json(v) => json_to_string(v),
    }
}

fn json_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                number_to_string(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(arr) => arr
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => json_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Short rendering of a value for error messages.
pub fn describe(value: &EvalValue) -> String {
    match value {
        EvalValue::Json(Value::String(s)) => format!("\"{s}\""),
        EvalValue::Json(Value::Array(_)) => value.as_json().map(Value::to_string).unwrap_or_default(),
        other => to_js_string(other),
    }
}

// -------------------------------------------------------------- Truthiness

pub fn is_truthy(value: &EvalValue) -> bool {
    match value {
        EvalValue::Undefined => false,
        EvalValue::Json(v) => match v {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        },
    }
}

// -------------------------------------------------------------- Comparison

/// Strict equality: same kind and same value. Numbers compare by value,
/// arrays and objects compare element by element.
pub fn strict_equals(a: &EvalValue, b: &EvalValue) -> bool {
    match (a, b) {
        (EvalValue::Undefined, EvalValue::Undefined) => true,
        (EvalValue::Json(a), EvalValue::Json(b)) => json_strict_equals(a, b),
        _ => false,
    }
}

fn json_strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_strict_equals(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, xv)| y.get(k).is_some_and(|yv| json_strict_equals(xv, yv)))
        }
        _ => a == b,
    }
}

/// A value reduced to a primitive for relational comparison and `+`.
enum Primitive {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

fn to_primitive(value: &EvalValue) -> Primitive {
    match value {
        EvalValue::Undefined => Primitive::Undefined,
        EvalValue::Json(v) => match v {
            Value::Null => Primitive::Null,
            Value::Bool(b) => Primitive::Bool(*b),
            Value::Number(n) => Primitive::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Primitive::Str(s.clone()),
            Value::Array(_) | Value::Object(_) => Primitive::Str(json_to_string(v)),
        },
    }
}

fn primitive_to_number(p: &Primitive) -> f64 {
    match p {
        Primitive::Undefined => f64::NAN,
        Primitive::Null => 0.0,
        Primitive::Bool(b) => f64::from(u8::from(*b)),
        Primitive::Number(n) => *n,
        Primitive::Str(s) if s.trim().is_empty() => 0.0,
        Primitive::Str(s) => parse_numeric_str(s).unwrap_or(f64::NAN),
    }
}

fn primitive_to_string(p: Primitive) -> String {
    match p {
        Primitive::Undefined => "undefined".to_string(),
        Primitive::Null => "null".to_string(),
        Primitive::Bool(b) => b.to_string(),
        Primitive::Number(n) => number_to_string(n),
        Primitive::Str(s) => s,
    }
}

/// `Some(a < b)`, or `None` when the operands are not comparable (a NaN
/// reading on either side). Two strings compare lexicographically, every
/// other pairing compares numerically.
fn less_than(a: &EvalValue, b: &EvalValue) -> Option<bool> {
    let (pa, pb) = (to_primitive(a), to_primitive(b));
    if let (Primitive::Str(sa), Primitive::Str(sb)) = (&pa, &pb) {
        return Some(sa < sb);
    }
    let (na, nb) = (primitive_to_number(&pa), primitive_to_number(&pb));
    if na.is_nan() || nb.is_nan() {
        return None;
    }
    Some(na < nb)
}

pub fn js_lt(a: &EvalValue, b: &EvalValue) -> bool {
    less_than(a, b) == Some(true)
}

pub fn js_gt(a: &EvalValue, b: &EvalValue) -> bool {
    less_than(b, a) == Some(true)
}

pub fn js_lte(a: &EvalValue, b: &EvalValue) -> bool {
    less_than(b, a) == Some(false)
}

pub fn js_gte(a: &EvalValue, b: &EvalValue) -> bool {
    less_than(a, b) == Some(false)
}

/// Applies a value operator (`=`, `>`, `<`, `>=`, `<=`).
pub fn compare(left: &EvalValue, operator: ValueOperator, right: &EvalValue) -> bool {
    match operator {
        ValueOperator::Eq => strict_equals(left, right),
        ValueOperator::Gt => js_gt(left, right),
        ValueOperator::Lt => js_lt(left, right),
        ValueOperator::Gte => js_gte(left, right),
        ValueOperator::Lte => js_lte(left, right),
    }
}

/// Applies an inversion operator: the negation of its positive counterpart.
pub fn compare_inverted(left: &EvalValue, operator: InversionOperator, right: &EvalValue) -> bool {
    !compare(left, operator.positive(), right)
}

// -------------------------------------------------------------- Arithmetic

/// `+`: concatenation when either side reads as a string, addition otherwise.
pub fn js_add(a: &EvalValue, b: &EvalValue) -> Result<EvalValue> {
    let (pa, pb) = (to_primitive(a), to_primitive(b));
    if matches!(pa, Primitive::Str(_)) || matches!(pb, Primitive::Str(_)) {
        let mut s = primitive_to_string(pa);
        s.push_str(&primitive_to_string(pb));
        return Ok(EvalValue::from(s));
    }
    finite_number(
        ValueArithmeticOperator::Add.symbol(),
        primitive_to_number(&pa) + primitive_to_number(&pb),
    )
}

/// Arithmetic on two numeric operands.
pub fn numeric_binary(
    operator: ValueArithmeticOperator,
    left: &EvalValue,
    right: &EvalValue,
) -> Result<f64> {
    let (Some(a), Some(b)) = (numeric(left), numeric(right)) else {
        return Err(RuleError::domain(format!(
            "Cannot perform operation on non-numeric. Attempted \"{operator}\" between {} and {}",
            describe(left),
            describe(right)
        )));
    };
    let result = match operator {
        ValueArithmeticOperator::Add => a + b,
        ValueArithmeticOperator::Sub => a - b,
        ValueArithmeticOperator::Mul => a * b,
        ValueArithmeticOperator::Div | ValueArithmeticOperator::Rem if b == 0.0 => {
            return Err(RuleError::domain(format!(
                "Cannot perform \"{operator}\" with a zero divisor. Value: {}",
                describe(left)
            )));
        }
        ValueArithmeticOperator::Div => a / b,
        ValueArithmeticOperator::Rem => a % b,
        ValueArithmeticOperator::Pow => a.powf(b),
    };
    if !result.is_finite() {
        return Err(RuleError::domain(format!(
            "Operation \"{operator}\" produced a non-finite result"
        )));
    }
    Ok(result)
}
