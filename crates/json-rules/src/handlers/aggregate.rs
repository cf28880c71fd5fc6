use super::expect_array;
use crate::error::{Result, RuleError};
use crate::operators::ArrayArithmeticOperator;
use crate::types::EvalValue;
use crate::util::{describe, finite_number, js_add, js_gt, js_lt, numeric, to_js_string};
use serde_json::Value;
use std::collections::HashMap;

pub(super) fn apply(operator: ArrayArithmeticOperator, path_val: &EvalValue) -> Result<EvalValue> {
    let arr = expect_array(operator.symbol(), path_val)?;
    if arr.is_empty() {
        return Err(RuleError::domain(format!(
            "Cannot perform \"{operator}\" on an empty array"
        )));
    }
    let values: Vec<EvalValue> = arr.iter().cloned().map(EvalValue::Json).collect();
    match operator {
        ArrayArithmeticOperator::Min => Ok(pick(&values, js_lt)),
        ArrayArithmeticOperator::Max => Ok(pick(&values, js_gt)),
        ArrayArithmeticOperator::Sum => values[1..]
            .iter()
            .try_fold(values[0].clone(), |acc, v| js_add(&acc, v)),
        ArrayArithmeticOperator::Mean => {
            let nums = numbers(operator, &values)?;
            finite_number(operator.symbol(), nums.iter().sum::<f64>() / nums.len() as f64)
        }
        ArrayArithmeticOperator::Median => {
            let mut nums = numbers(operator, &values)?;
            nums.sort_by(f64::total_cmp);
            let mid = nums.len() / 2;
            let median = if nums.len() % 2 == 0 {
                (nums[mid - 1] + nums[mid]) / 2.0
            } else {
                nums[mid]
            };
            finite_number(operator.symbol(), median)
        }
        ArrayArithmeticOperator::Mode => Ok(mode(&values).into()),
    }
}

/// The first element no other element beats.
fn pick(values: &[EvalValue], beats: fn(&EvalValue, &EvalValue) -> bool) -> EvalValue {
    let mut best = &values[0];
    for v in &values[1..] {
        if beats(v, best) {
            best = v;
        }
    }
    best.clone()
}

fn numbers(operator: ArrayArithmeticOperator, values: &[EvalValue]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|v| {
            numeric(v).ok_or_else(|| {
                RuleError::domain(format!(
                    "Cannot perform \"{operator}\" on non-numeric element. Value: {}",
                    describe(v)
                ))
            })
        })
        .collect()
}

/// Most frequent string form. Ties go to the form that reached the top count
/// first.
fn mode(values: &[EvalValue]) -> Value {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut best: Option<(String, usize)> = None;
    for v in values {
        let key = to_js_string(v);
        let count = counts.entry(key.clone()).or_insert(0);
        *count += 1;
        if best.as_ref().map_or(true, |(_, max)| *count > *max) {
            best = Some((key, *count));
        }
    }
    best.map(|(key, _)| Value::String(key)).unwrap_or(Value::Null)
}
