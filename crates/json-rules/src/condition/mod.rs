//! Boolean conditions over a single JSON value.
//!
//! A [`Condition`] combines checks with `and`/`or`. Checks address the data
//! with dotted paths (`a.b.c`):
//!
//! ```json
//! {
//!   "operator": "and",
//!   "checks": [
//!     { "path": "a", "operator": ">=", "value": 3 },
//!     { "path": "xs", "operator": "contains",
//!       "condition": { "operator": "or", "checks": [{ "path": "id", "operator": "=", "value": 7 }] } },
//!     { "operator": "not", "target": { "path": "b", "operator": "=", "value": "x" } }
//!   ]
//! }
//! ```

mod check;

pub use check::{check_condition, resolve_dotted, CheckOptions};

use crate::error::{Result, RuleError};
use crate::operators::{classify, InversionOperator, LogicalOperator, OperatorClass, ValueOperator};
use crate::parse::{as_object, optional_str, required_array, required_str};
use crate::types::EvalValue;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Condition {
    pub operator: LogicalOperator,
    pub checks: Vec<CheckNode>,
}

/// A child of a condition: a nested condition or a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckNode {
    Condition(Condition),
    Check(Check),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Compares the value at `path` with `value`. A missing `value` is
    /// `undefined`.
    Value {
        path: String,
        operator: ValueOperator,
        value: EvalValue,
    },
    /// True when some element of the array at `path` satisfies `condition`.
    Contains { path: String, condition: Condition },
    /// Negates its target.
    Not { target: Box<CheckNode> },
}

impl Condition {
    pub fn and(checks: impl IntoIterator<Item = CheckNode>) -> Self {
        Condition {
            operator: LogicalOperator::And,
            checks: checks.into_iter().collect(),
        }
    }

    pub fn or(checks: impl IntoIterator<Item = CheckNode>) -> Self {
        Condition {
            operator: LogicalOperator::Or,
            checks: checks.into_iter().collect(),
        }
    }
}

impl Check {
    pub fn value(path: impl Into<String>, operator: ValueOperator, value: impl Into<EvalValue>) -> Self {
        Check::Value {
            path: path.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn contains(path: impl Into<String>, condition: Condition) -> Self {
        Check::Contains {
            path: path.into(),
            condition,
        }
    }

    pub fn not(target: impl Into<CheckNode>) -> Self {
        Check::Not {
            target: Box::new(target.into()),
        }
    }
}

impl From<Condition> for CheckNode {
    fn from(c: Condition) -> Self {
        CheckNode::Condition(c)
    }
}

impl From<Check> for CheckNode {
    fn from(c: Check) -> Self {
        CheckNode::Check(c)
    }
}

// ------------------------------------------------------------------ Parsing

impl TryFrom<&Value> for CheckNode {
    type Error = RuleError;

    fn try_from(value: &Value) -> Result<Self> {
        let obj = as_object(value, "Check")?;
        let operator = optional_str(obj, "operator")?
            .ok_or_else(|| RuleError::structural(format!("Check has no operator: {value}")))?;

        match classify(operator) {
            Some(OperatorClass::Logical) => {
                let operator = LogicalOperator::from_symbol(operator)
                    .ok_or_else(|| RuleError::InvalidOperator(operator.to_string()))?;
                let checks = required_array(obj, "checks", "Condition")?
                    .iter()
                    .map(CheckNode::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok(CheckNode::Condition(Condition { operator, checks }))
            }
            Some(OperatorClass::Value) => {
                let operator = ValueOperator::from_symbol(operator)
                    .ok_or_else(|| RuleError::InvalidOperator(operator.to_string()))?;
                let path = required_str(obj, "path", "Value check")?;
                Ok(Check::value(path, operator, obj.get("value").cloned()).into())
            }
            Some(OperatorClass::Array) => {
                let path = required_str(obj, "path", "Array check")?;
                let condition = obj
                    .get("condition")
                    .ok_or_else(|| RuleError::structural("Array check requires a \"condition\""))?;
                Ok(Check::contains(path, Condition::try_from(condition)?).into())
            }
            Some(OperatorClass::Inversion)
                if InversionOperator::from_symbol(operator) == Some(InversionOperator::Not) =>
            {
                let target = obj
                    .get("target")
                    .ok_or_else(|| RuleError::structural("Inversion check requires a \"target\""))?;
                Ok(Check::not(CheckNode::try_from(target)?).into())
            }
            _ => Err(RuleError::InvalidOperator(operator.to_string())),
        }
    }
}

impl TryFrom<&Value> for Condition {
    type Error = RuleError;

    fn try_from(value: &Value) -> Result<Self> {
        match CheckNode::try_from(value)? {
            CheckNode::Condition(condition) => Ok(condition),
            CheckNode::Check(_) => Err(RuleError::structural(format!(
                "Expected a condition with \"and\"/\"or\" and \"checks\", got {value}"
            ))),
        }
    }
}

impl TryFrom<Value> for Condition {
    type Error = RuleError;

    fn try_from(value: Value) -> Result<Self> {
        Condition::try_from(&value)
    }
}
