//! Operator handlers, one module per operator family.

mod aggregate;
mod array;
mod cast;
mod end;
mod inspect;
mod set;
mod value;

use crate::error::{Result, RuleError};
use crate::eval_ctx::EvalCtx;
use crate::evaluate::{Located, Outcome};
use crate::rule::Action;
use crate::types::EvalValue;
use crate::util::describe;
use serde_json::Value;

/// Applies `action` to the value read by its rule. Handlers that do not move
/// the reference point return the value at `current`.
pub(crate) fn dispatch(ctx: &mut EvalCtx, action: &Action, located: Located) -> Result<Outcome> {
    let Located {
        value: path_val,
        point: current,
        live,
    } = located;
    let result = match action {
        Action::End(op) => end::apply(*op, &path_val)?,
        Action::Cast(cast_to) => cast::apply(cast_to, &path_val)?,
        Action::Length => array::length(&path_val)?,
        Action::Slice {
            start_index,
            end_index,
        } => array::slice(start_index.as_ref(), end_index.as_ref(), &path_val)?,
        Action::Splice {
            start_index,
            delete_count,
            items_to_add,
        } => array::splice(
            start_index.as_ref(),
            delete_count.as_ref(),
            items_to_add.as_ref(),
            path_val,
        )?,
        Action::Sort {
            get_comparison_value,
            comparison,
        } => array::sort(ctx, get_comparison_value, *comparison, &path_val, &current, live)?,
        Action::Inspect { operator, rules } => {
            return inspect::apply(ctx, *operator, rules.as_deref(), &path_val, current, live)
        }
        Action::Aggregate(op) => aggregate::apply(*op, &path_val)?,
        Action::Contains(target) => array::contains(ctx, target.as_ref(), &path_val, &current, live)?,
        Action::NonTargetArithmetic(op) => value::non_target(*op, &path_val)?,
        Action::Set { set_path, target } => {
            set::apply(ctx, set_path, target.as_ref(), &path_val, &current)?;
            path_val
        }
        Action::Binary { operator, target } => {
            let target_val = ctx.derive_target(target, &path_val, &current)?;
            value::apply(*operator, &path_val, &target_val)?
        }
    };
    Ok(Outcome::at(result, current))
}

/// The array inside `value`, or a domain error naming `operator`.
fn expect_array<'a>(operator: &str, value: &'a EvalValue) -> Result<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| {
        RuleError::domain(format!(
            "Cannot perform \"{operator}\" on non-array. Value: {}",
            describe(value)
        ))
    })
}
