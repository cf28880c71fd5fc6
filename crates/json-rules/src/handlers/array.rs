use super::expect_array;
use crate::error::{Result, RuleError};
use crate::eval_ctx::{element_point, EvalCtx};
use crate::operators::{
    ArrayOperator, SortComparison, SortOrder, LENGTH_OPERATOR, SLICE_OPERATOR, SORT_OPERATOR,
    SPLICE_OPERATOR,
};
use crate::rule::{Rule, Target};
use crate::types::EvalValue;
use crate::util::{js_gt, js_lt, numeric_binary, strict_equals};
use json_rules_pointer::RefPoint;
use serde_json::Value;
use std::cmp::Ordering;
use std::rc::Rc;

pub(super) fn length(path_val: &EvalValue) -> Result<EvalValue> {
    let arr = expect_array(LENGTH_OPERATOR, path_val)?;
    Ok(Value::from(arr.len()).into())
}

/// Reads an index field, counting negative values from the end and clamping
/// to `0..=len`.
fn relative_index(operator: &str, field: &str, value: &Value, len: usize) -> Result<usize> {
    let n = value.as_f64().ok_or_else(|| {
        RuleError::domain(format!("\"{field}\" for \"{operator}\" must be a number, got {value}"))
    })?;
    let n = n.trunc();
    let len_f = len as f64;
    let idx = if n < 0.0 { (len_f + n).max(0.0) } else { n.min(len_f) };
    Ok(idx as usize)
}

pub(super) fn slice(
    start_index: Option<&Value>,
    end_index: Option<&Value>,
    path_val: &EvalValue,
) -> Result<EvalValue> {
    let arr = expect_array(SLICE_OPERATOR, path_val)?;
    let len = arr.len();
    let (from, to) = match (start_index, end_index) {
        (None, None) => (0, len),
        (Some(start), None) => (relative_index(SLICE_OPERATOR, "startIndex", start, len)?, len),
        (None, Some(end)) => (relative_index(SLICE_OPERATOR, "endIndex", end, len)?, len),
        (Some(start), Some(end)) => (
            relative_index(SLICE_OPERATOR, "startIndex", start, len)?,
            relative_index(SLICE_OPERATOR, "endIndex", end, len)?,
        ),
    };
    let out = if from < to { arr[from..to].to_vec() } else { Vec::new() };
    Ok(out.into())
}

pub(super) fn splice(
    start_index: Option<&Value>,
    delete_count: Option<&Value>,
    items_to_add: Option<&Value>,
    path_val: EvalValue,
) -> Result<EvalValue> {
    let Some(start_index) = start_index else {
        return Ok(path_val);
    };
    let arr = expect_array(SPLICE_OPERATOR, &path_val)?;
    let len = arr.len();
    let start = relative_index(SPLICE_OPERATOR, "startIndex", start_index, len)?;
    let delete = match delete_count {
        None => len - start,
        Some(count) => {
            let n = count.as_f64().ok_or_else(|| {
                RuleError::domain(format!("\"deleteCount\" for \"splice\" must be a number, got {count}"))
            })?;
            n.trunc().clamp(0.0, (len - start) as f64) as usize
        }
    };
    let items = match items_to_add {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(RuleError::domain(format!(
                "\"itemsToAdd\" for \"splice\" must be an array, got {other}"
            )))
        }
    };
    let mut out = arr.clone();
    out.splice(start..start + delete, items);
    Ok(out.into())
}

pub(super) fn contains(
    ctx: &mut EvalCtx,
    target: Option<&Target>,
    path_val: &EvalValue,
    current: &Rc<RefPoint>,
    live: bool,
) -> Result<EvalValue> {
    let arr = expect_array(ArrayOperator::Contains.symbol(), path_val)?;
    for (idx, element) in arr.iter().enumerate() {
        let element_val = EvalValue::Json(element.clone());
        let wanted = match target {
            Some(Target::Derived(rules)) => {
                let point = element_point(current, idx, element, live);
                ctx.run_sequence(rules, &point, element_val.clone())?
            }
            Some(Target::Value(v)) => EvalValue::Json(v.clone()),
            None => EvalValue::Undefined,
        };
        if strict_equals(&element_val, &wanted) {
            return Ok(true.into());
        }
    }
    Ok(false.into())
}

pub(super) fn sort(
    ctx: &mut EvalCtx,
    key_rules: &[Rule],
    comparison: SortComparison,
    path_val: &EvalValue,
    current: &Rc<RefPoint>,
    live: bool,
) -> Result<EvalValue> {
    let arr = expect_array(SORT_OPERATOR, path_val)?;
    let mut keys = Vec::with_capacity(arr.len());
    for (idx, element) in arr.iter().enumerate() {
        let point = element_point(current, idx, element, live);
        keys.push(ctx.run_sequence(key_rules, &point, element.clone().into())?);
    }
    let mut order: Vec<usize> = (0..arr.len()).collect();
    insertion_sort_by(&mut order, |&a, &b| compare_keys(comparison, a, &keys[a], b, &keys[b]))?;
    Ok(order.into_iter().map(|i| arr[i].clone()).collect::<Vec<_>>().into())
}

fn ordering(a: &EvalValue, b: &EvalValue) -> Ordering {
    if js_gt(a, b) {
        Ordering::Greater
    } else if js_lt(a, b) {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Orders two elements by their keys. Ties-reversed orderings put the later
/// element first among equal keys.
fn compare_keys(
    comparison: SortComparison,
    a_idx: usize,
    a: &EvalValue,
    b_idx: usize,
    b: &EvalValue,
) -> Result<Ordering> {
    let ord = match comparison {
        SortComparison::Order(SortOrder::Ascending) => ordering(a, b),
        SortComparison::Order(SortOrder::Descending) => ordering(b, a),
        SortComparison::Order(SortOrder::AscendingTiesReversed) => {
            ordering(a, b).then(b_idx.cmp(&a_idx))
        }
        SortComparison::Order(SortOrder::DescendingTiesReversed) => {
            ordering(b, a).then(b_idx.cmp(&a_idx))
        }
        SortComparison::Arithmetic(op) => numeric_binary(op, a, b)?
            .partial_cmp(&0.0)
            .unwrap_or(Ordering::Equal),
    };
    Ok(ord)
}

/// Stable insertion sort with a fallible comparator. Tolerates comparators
/// that are not a total order.
fn insertion_sort_by<T, F>(items: &mut [T], mut compare: F) -> Result<()>
where
    F: FnMut(&T, &T) -> Result<Ordering>,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j])? == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(())
}
