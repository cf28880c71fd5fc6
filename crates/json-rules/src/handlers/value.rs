use crate::error::{Result, RuleError};
use crate::operators::{NonTargetArithmeticOperator, ValueArithmeticOperator};
use crate::rule::BinaryOperator;
use crate::types::EvalValue;
use crate::util::{compare, compare_inverted, describe, finite_number, js_add, numeric, numeric_binary};

/// Comparison and arithmetic between the path value and the target value.
pub(super) fn apply(
    operator: BinaryOperator,
    left: &EvalValue,
    right: &EvalValue,
) -> Result<EvalValue> {
    match operator {
        BinaryOperator::Value(op) => Ok(compare(left, op, right).into()),
        BinaryOperator::Inversion(op) => Ok(compare_inverted(left, op, right).into()),
        BinaryOperator::Arithmetic(ValueArithmeticOperator::Add) => js_add(left, right),
        BinaryOperator::Arithmetic(op) => {
            finite_number(op.symbol(), numeric_binary(op, left, right)?)
        }
    }
}

pub(super) fn non_target(
    operator: NonTargetArithmeticOperator,
    path_val: &EvalValue,
) -> Result<EvalValue> {
    let n = numeric(path_val).ok_or_else(|| {
        RuleError::domain(format!(
            "Cannot perform operation \"{operator}\" on non-numeric. Value: {}",
            describe(path_val)
        ))
    })?;
    match operator {
        NonTargetArithmeticOperator::Sqrt => finite_number(operator.symbol(), n.sqrt()),
    }
}
