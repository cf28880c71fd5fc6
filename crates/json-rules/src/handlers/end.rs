use crate::error::{Result, RuleError};
use crate::operators::EndOperator;
use crate::types::EvalValue;
use crate::util::{describe, finite_number, numeric};

pub(super) fn apply(operator: EndOperator, path_val: &EvalValue) -> Result<EvalValue> {
    let result = match operator {
        EndOperator::IsUndefined => path_val.is_undefined(),
        EndOperator::IsNotUndefined => !path_val.is_undefined(),
        EndOperator::IsNull => path_val.is_null(),
        EndOperator::IsNotNull => !path_val.is_null(),
        EndOperator::Abs => {
            let n = numeric(path_val).ok_or_else(|| {
                RuleError::domain(format!(
                    "Cannot perform operation \"abs\" on non-number. Value: {}",
                    describe(path_val)
                ))
            })?;
            return finite_number(operator.symbol(), n.abs());
        }
    };
    Ok(result.into())
}
