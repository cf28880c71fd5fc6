use super::{Check, CheckNode, Condition};
use crate::error::{Result, RuleError};
use crate::operators::{LogicalOperator, ValueOperator};
use crate::types::EvalValue;
use crate::util::{compare, to_js_string};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Options for [`check_condition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Compare the string forms of both operands in value checks.
    pub auto_cast: bool,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_cast(mut self, auto_cast: bool) -> Self {
        self.auto_cast = auto_cast;
        self
    }
}

/// Evaluates `condition` against `data`.
///
/// # Errors
///
/// [`RuleError::InvalidCheckTarget`] when a `contains` check resolves to
/// something other than an array.
///
/// # Example
///
/// ```
/// use json_rules::{check_condition, CheckOptions, Condition};
/// use serde_json::json;
///
/// let condition = Condition::try_from(&json!({
///     "operator": "and",
///     "checks": [{"path": "a", "operator": "=", "value": "5"}]
/// }))
/// .unwrap();
/// let data = json!({"a": 5});
/// assert!(!check_condition(&condition, &data, CheckOptions::default()).unwrap());
/// assert!(check_condition(&condition, &data, CheckOptions::new().with_auto_cast(true)).unwrap());
/// ```
#[instrument(level = "debug", skip_all, fields(auto_cast = options.auto_cast))]
pub fn check_condition(condition: &Condition, data: &Value, options: CheckOptions) -> Result<bool> {
    let result = Scope::new(data, options).condition(condition)?;
    debug!(result, "condition checked");
    Ok(result)
}

/// Resolves a dotted path (`a.b.c`) field by field. Anything other than an
/// object on the way yields `undefined`.
pub fn resolve_dotted(data: &Value, path: &str) -> EvalValue {
    let mut current = Some(data);
    for part in path.split('.') {
        current = match current {
            Some(Value::Object(map)) => map.get(part),
            _ => None,
        };
    }
    current.cloned().into()
}

/// One data scope. `contains` checks evaluate their condition in a fresh
/// scope per element.
struct Scope<'a> {
    data: &'a Value,
    options: CheckOptions,
    path_cache: HashMap<String, EvalValue>,
}

impl<'a> Scope<'a> {
    fn new(data: &'a Value, options: CheckOptions) -> Self {
        Scope {
            data,
            options,
            path_cache: HashMap::new(),
        }
    }

    fn lookup(&mut self, path: &str) -> EvalValue {
        if let Some(hit) = self.path_cache.get(path) {
            return hit.clone();
        }
        let value = resolve_dotted(self.data, path);
        self.path_cache.insert(path.to_string(), value.clone());
        value
    }

    fn condition(&mut self, condition: &Condition) -> Result<bool> {
        for node in &condition.checks {
            let passed = self.node(node)?;
            match condition.operator {
                LogicalOperator::And if !passed => return Ok(false),
                LogicalOperator::Or if passed => return Ok(true),
                _ => {}
            }
        }
        Ok(condition.operator == LogicalOperator::And)
    }

    fn node(&mut self, node: &CheckNode) -> Result<bool> {
        match node {
            CheckNode::Condition(condition) => self.condition(condition),
            CheckNode::Check(check) => self.check(check),
        }
    }

    fn check(&mut self, check: &Check) -> Result<bool> {
        match check {
            Check::Value {
                path,
                operator,
                value,
            } => {
                let actual = self.lookup(path);
                Ok(self.compare(&actual, *operator, value))
            }
            Check::Contains { path, condition } => {
                let target = self.lookup(path);
                let items = target.as_array().ok_or_else(|| {
                    RuleError::InvalidCheckTarget(format!("\"{path}\" does not resolve to an array"))
                })?;
                for item in items {
                    if Scope::new(item, self.options).condition(condition)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            // A bare check behaves as a single-check `and`.
            Check::Not { target } => Ok(!self.node(target)?),
        }
    }

    fn compare(&self, actual: &EvalValue, operator: ValueOperator, expected: &EvalValue) -> bool {
        if self.options.auto_cast {
            let actual = EvalValue::from(to_js_string(actual));
            let expected = EvalValue::from(to_js_string(expected));
            return compare(&actual, operator, &expected);
        }
        compare(actual, operator, expected)
    }
}
