use super::expect_array;
use crate::error::{Result, RuleError};
use crate::eval_ctx::{element_point, EvalCtx};
use crate::evaluate::Outcome;
use crate::operators::ArrayInspectionOperator;
use crate::rule::Rule;
use crate::types::EvalValue;
use crate::util::is_truthy;
use json_rules_pointer::RefPoint;
use serde_json::Value;
use std::rc::Rc;

/// `filter` and `map`. The result replaces the value at the current
/// reference point, so later relative paths index into it.
pub(super) fn apply(
    ctx: &mut EvalCtx,
    operator: ArrayInspectionOperator,
    rules: Option<&[Rule]>,
    path_val: &EvalValue,
    current: Rc<RefPoint>,
    live: bool,
) -> Result<Outcome> {
    let arr = expect_array(operator.symbol(), path_val)?;
    let rules = rules.ok_or_else(|| {
        RuleError::domain(format!("No rules array provided for array \"{operator}\""))
    })?;
    let mut out = Vec::with_capacity(arr.len());
    for (idx, element) in arr.iter().enumerate() {
        let point = element_point(&current, idx, element, live);
        let result = ctx.run_sequence(rules, &point, element.clone().into())?;
        match operator {
            ArrayInspectionOperator::Filter => {
                if is_truthy(&result) {
                    out.push(element.clone());
                }
            }
            // undefined has no JSON form inside an array
            ArrayInspectionOperator::Map => out.push(result.into_json()),
        }
    }
    let ref_point = current.with_obj(Some(Value::Array(out.clone())));
    Ok(Outcome::at(out.into(), ref_point))
}
