//! Rule trees.
//!
//! Rules arrive as JSON objects and are parsed up front into [`Rule`]. The
//! shape is decided by the operator's [`OperatorClass`] plus the fields
//! present, so structural mistakes (no operator, an unknown operator, a
//! comparison without a target) are reported before anything runs.

use crate::error::{Result, RuleError};
use crate::operators::{
    classify, ArrayArithmeticOperator, ArrayInspectionOperator, EndOperator, InversionOperator,
    LogicalOperator, NonTargetArithmeticOperator, OperatorClass, SortComparison,
    ValueArithmeticOperator, ValueOperator,
};
use crate::parse::{as_object, optional_str};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Rule {
    /// `{"operator": "and"|"or", "rules": [...]}`
    LogicalGrouping {
        operator: LogicalOperator,
        rules: Vec<Rule>,
    },
    /// `{"path": "..."}` with no other field.
    PathResolution { path: String },
    /// Any rule carrying an operator.
    Action(ActionRule),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionRule {
    /// Where the rule reads its input. Without a path the rule works on the
    /// cascade value at the previous reference point.
    pub path: Option<String>,
    pub action: Action,
}

/// A target operand: a literal `value` or a `getValue` rule sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Value(Value),
    Derived(Vec<Rule>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    End(EndOperator),
    Cast(CastType),
    Length,
    /// Index fields are kept raw and checked when the rule runs.
    Slice {
        start_index: Option<Value>,
        end_index: Option<Value>,
    },
    Splice {
        start_index: Option<Value>,
        delete_count: Option<Value>,
        items_to_add: Option<Value>,
    },
    Sort {
        get_comparison_value: Vec<Rule>,
        comparison: SortComparison,
    },
    Inspect {
        operator: ArrayInspectionOperator,
        rules: Option<Vec<Rule>>,
    },
    Aggregate(ArrayArithmeticOperator),
    Contains(Option<Target>),
    NonTargetArithmetic(NonTargetArithmeticOperator),
    Set {
        set_path: String,
        target: Option<Target>,
    },
    Binary {
        operator: BinaryOperator,
        target: Target,
    },
}

/// Operators taking the path value on the left and a target on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Value(ValueOperator),
    Inversion(InversionOperator),
    Arithmetic(ValueArithmeticOperator),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastType {
    String,
    Boolean,
    Number,
    Json,
    /// Anything else; casting to it fails at evaluation.
    Unsupported(String),
}

impl From<Option<&Value>> for CastType {
    fn from(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => match s.as_str() {
                "string" => CastType::String,
                "boolean" => CastType::Boolean,
                "number" => CastType::Number,
                "JSON" => CastType::Json,
                other => CastType::Unsupported(other.to_string()),
            },
            Some(other) => CastType::Unsupported(other.to_string()),
            None => CastType::Unsupported("undefined".to_string()),
        }
    }
}

impl Action {
    /// The operator symbol, for logging.
    pub fn symbol(&self) -> &'static str {
        use crate::operators::*;
        match self {
            Action::End(op) => op.symbol(),
            Action::Cast(_) => CAST_OPERATOR,
            Action::Length => LENGTH_OPERATOR,
            Action::Slice { .. } => SLICE_OPERATOR,
            Action::Splice { .. } => SPLICE_OPERATOR,
            Action::Sort { .. } => SORT_OPERATOR,
            Action::Inspect { operator, .. } => operator.symbol(),
            Action::Aggregate(op) => op.symbol(),
            Action::Contains(_) => ArrayOperator::Contains.symbol(),
            Action::NonTargetArithmetic(op) => op.symbol(),
            Action::Set { .. } => SET_OPERATOR,
            Action::Binary { operator, .. } => operator.symbol(),
        }
    }
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Value(op) => op.symbol(),
            BinaryOperator::Inversion(op) => op.symbol(),
            BinaryOperator::Arithmetic(op) => op.symbol(),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ------------------------------------------------------------------ Parsing

/// Parses a JSON array of rules.
pub fn parse_rules(value: &Value) -> Result<Vec<Rule>> {
    let items = value
        .as_array()
        .ok_or_else(|| RuleError::structural(format!("Rules must be an array, got {value}")))?;
    parse_rule_list(items)
}

fn parse_rule_list(items: &[Value]) -> Result<Vec<Rule>> {
    items.iter().map(Rule::try_from).collect()
}

fn unknown(operator: &str) -> RuleError {
    RuleError::structural(format!("Operator '{operator}' not implemented"))
}

fn parse_target(obj: &Map<String, Value>) -> Result<Option<Target>> {
    if let Some(get_value) = obj.get("getValue") {
        let rules = get_value.as_array().ok_or_else(|| {
            RuleError::structural(format!("\"getValue\" must be an array of rules, got {get_value}"))
        })?;
        return Ok(Some(Target::Derived(parse_rule_list(rules)?)));
    }
    Ok(obj.get("value").cloned().map(Target::Value))
}

fn parse_action(operator: &str, obj: &Map<String, Value>) -> Result<Action> {
    let class = classify(operator).ok_or_else(|| unknown(operator))?;
    let action = match class {
        OperatorClass::End => Action::End(EndOperator::from_symbol(operator).ok_or_else(|| unknown(operator))?),
        OperatorClass::Cast => Action::Cast(CastType::from(obj.get("castTo"))),
        OperatorClass::Length => Action::Length,
        OperatorClass::Slice => Action::Slice {
            start_index: obj.get("startIndex").cloned(),
            end_index: obj.get("endIndex").cloned(),
        },
        OperatorClass::Splice => Action::Splice {
            start_index: obj.get("startIndex").cloned(),
            delete_count: obj.get("deleteCount").cloned(),
            items_to_add: obj.get("itemsToAdd").cloned(),
        },
        OperatorClass::Sort => {
            let get_comparison_value = match obj.get("getComparisonValue") {
                None => Vec::new(),
                Some(Value::Array(items)) => parse_rule_list(items)?,
                Some(other) => {
                    return Err(RuleError::structural(format!(
                        "\"getComparisonValue\" must be an array of rules, got {other}"
                    )))
                }
            };
            let comparison = match optional_str(obj, "comparisonOperator")? {
                None => SortComparison::default(),
                Some(symbol) => SortComparison::from_symbol(symbol).ok_or_else(|| {
                    RuleError::structural(format!("Sort comparison operator '{symbol}' not implemented"))
                })?,
            };
            Action::Sort {
                get_comparison_value,
                comparison,
            }
        }
        OperatorClass::ArrayInspection => Action::Inspect {
            operator: ArrayInspectionOperator::from_symbol(operator).ok_or_else(|| unknown(operator))?,
            rules: match obj.get("rules") {
                Some(Value::Array(items)) => Some(parse_rule_list(items)?),
                _ => None,
            },
        },
        OperatorClass::ArrayArithmetic => Action::Aggregate(
            ArrayArithmeticOperator::from_symbol(operator).ok_or_else(|| unknown(operator))?,
        ),
        OperatorClass::Array => Action::Contains(parse_target(obj)?),
        OperatorClass::NonTargetArithmetic => Action::NonTargetArithmetic(
            NonTargetArithmeticOperator::from_symbol(operator).ok_or_else(|| unknown(operator))?,
        ),
        OperatorClass::Set => Action::Set {
            set_path: optional_str(obj, "setPath")?
                .ok_or_else(|| RuleError::structural("Set rule requires a \"setPath\""))?
                .to_string(),
            target: parse_target(obj)?,
        },
        OperatorClass::Value | OperatorClass::Inversion | OperatorClass::ValueArithmetic => {
            let binary = ValueOperator::from_symbol(operator)
                .map(BinaryOperator::Value)
                .or_else(|| InversionOperator::from_symbol(operator).map(BinaryOperator::Inversion))
                .or_else(|| ValueArithmeticOperator::from_symbol(operator).map(BinaryOperator::Arithmetic))
                .ok_or_else(|| unknown(operator))?;
            let target = parse_target(obj)?.ok_or_else(|| {
                RuleError::structural(format!(
                    "Operator '{operator}' requires a \"value\" or \"getValue\""
                ))
            })?;
            Action::Binary {
                operator: binary,
                target,
            }
        }
        // `and`/`or` without a rules array
        OperatorClass::Logical => return Err(unknown(operator)),
    };
    Ok(action)
}

impl TryFrom<&Value> for Rule {
    type Error = RuleError;

    fn try_from(value: &Value) -> Result<Self> {
        let obj = as_object(value, "Rule")?;
        let operator = optional_str(obj, "operator")?;

        if let (Some(op), Some(Value::Array(rules))) =
            (operator.and_then(LogicalOperator::from_symbol), obj.get("rules"))
        {
            return Ok(Rule::LogicalGrouping {
                operator: op,
                rules: parse_rule_list(rules)?,
            });
        }

        // an empty path is no path
        let path = optional_str(obj, "path")?
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if let (Some(path), 1) = (&path, obj.len()) {
            return Ok(Rule::PathResolution { path: path.clone() });
        }

        let operator = operator.ok_or_else(|| {
            RuleError::structural(format!("Unable to process rule. No action defined: {value}"))
        })?;
        Ok(Rule::Action(ActionRule {
            path,
            action: parse_action(operator, obj)?,
        }))
    }
}

impl TryFrom<Value> for Rule {
    type Error = RuleError;

    fn try_from(value: Value) -> Result<Self> {
        Rule::try_from(&value)
    }
}
