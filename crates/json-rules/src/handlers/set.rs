use crate::error::Result;
use crate::eval_ctx::EvalCtx;
use crate::rule::Target;
use crate::types::EvalValue;
use json_rules_pointer::RefPoint;
use std::rc::Rc;

/// Writes the target value, or the path value when the rule has no target,
/// at `set_path`. `undefined` is written as `null`.
pub(super) fn apply(
    ctx: &mut EvalCtx,
    set_path: &str,
    target: Option<&Target>,
    path_val: &EvalValue,
    current: &Rc<RefPoint>,
) -> Result<()> {
    let value = match target {
        Some(target) => ctx.derive_target(target, path_val, current)?,
        None => path_val.clone(),
    };
    ctx.write(set_path, current, value.into_json())
}
