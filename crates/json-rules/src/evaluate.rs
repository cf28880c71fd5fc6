//! Cascading rule evaluation.

use crate::documents::DocumentMap;
use crate::error::{Result, RuleError};
use crate::eval_ctx::EvalCtx;
use crate::handlers;
use crate::operators::LogicalOperator;
use crate::rule::Rule;
use crate::types::EvalValue;
use crate::util::is_truthy;
use json_rules_pointer::{build_tree, RefPoint};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// Options for [`evaluate_rules`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Document that unprefixed paths start in. Defaults to the first
    /// document.
    pub primary_document: Option<String>,
}

impl EvaluateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary_document(mut self, id: impl Into<String>) -> Self {
        self.primary_document = Some(id.into());
        self
    }
}

/// Result of processing one rule: the new cascade value and the reference
/// point the next rule continues from.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outcome {
    pub result: EvalValue,
    pub ref_point: Option<Rc<RefPoint>>,
}

impl Outcome {
    pub(crate) fn at(result: EvalValue, ref_point: Rc<RefPoint>) -> Self {
        Outcome {
            result,
            ref_point: Some(ref_point),
        }
    }
}

/// Evaluates a rule list over a set of documents.
///
/// The evaluator works on deep copies of `documents`; use
/// [`RuleEvaluator::document`] to inspect them after `set` rules ran.
#[derive(Debug)]
pub struct RuleEvaluator<'r> {
    rules: &'r [Rule],
    primary_document: String,
    ctx: EvalCtx,
}

impl<'r> RuleEvaluator<'r> {
    /// # Errors
    ///
    /// [`RuleError::Structural`] when `rules` or `documents` is empty, a
    /// document is not an object with a string `$id`, or the primary document
    /// is unknown.
    pub fn new(rules: &'r [Rule], documents: &[Value], options: EvaluateOptions) -> Result<Self> {
        if rules.is_empty() {
            return Err(RuleError::structural("No rules provided"));
        }
        let documents = DocumentMap::new(documents)?;
        let primary_document = match options.primary_document {
            Some(id) if documents.contains(&id) => id,
            Some(id) => {
                return Err(RuleError::structural(format!(
                    "Primary document \"{id}\" not found"
                )))
            }
            None => documents.first_id().to_string(),
        };
        Ok(RuleEvaluator {
            rules,
            ctx: EvalCtx::new(documents, primary_document.clone()),
            primary_document,
        })
    }

    /// Runs the rules in order, threading the cascade value and reference
    /// point, and returns the final cascade value.
    #[instrument(level = "debug", skip_all, fields(rules = self.rules.len(), primary = %self.primary_document))]
    pub fn evaluate(&mut self) -> Result<EvalValue> {
        self.ctx.current_document = self.primary_document.clone();
        let mut cascade = Outcome::default();
        for rule in self.rules {
            cascade = self
                .ctx
                .process(rule, cascade.ref_point.as_ref(), cascade.result)?;
        }
        debug!(result = ?cascade.result, "rules evaluated");
        Ok(cascade.result)
    }

    /// The evaluator's copy of a document.
    pub fn document(&self, id: &str) -> Option<&Value> {
        self.ctx.documents.get(id)
    }

    pub fn documents(&self) -> &DocumentMap {
        &self.ctx.documents
    }
}

/// Evaluates `rules` against `documents` and returns the final cascade
/// value.
///
/// # Example
///
/// ```
/// use json_rules::{evaluate_rules, parse_rules, EvaluateOptions};
/// use serde_json::json;
///
/// let rules = parse_rules(&json!([
///     {"path": "/items", "operator": "map", "rules": [{"path": "/price"}]},
///     {"operator": "sum"}
/// ]))
/// .unwrap();
/// let docs = [json!({"$id": "D", "items": [{"price": 2}, {"price": 3}, {"price": 5}]})];
/// let result = evaluate_rules(&rules, &docs, EvaluateOptions::default()).unwrap();
/// assert_eq!(result, json!(10));
/// ```
pub fn evaluate_rules(rules: &[Rule], documents: &[Value], options: EvaluateOptions) -> Result<EvalValue> {
    RuleEvaluator::new(rules, documents, options)?.evaluate()
}

impl EvalCtx {
    /// One step of the cascade.
    pub(crate) fn process(
        &mut self,
        rule: &Rule,
        prev: Option<&Rc<RefPoint>>,
        cascade: EvalValue,
    ) -> Result<Outcome> {
        match rule {
            Rule::LogicalGrouping { operator, rules } => {
                self.logical_grouping(*operator, rules, prev, &cascade)
            }
            Rule::PathResolution { path } => {
                let located = self.establish(Some(path), prev, cascade)?;
                Ok(Outcome::at(located.value, located.point))
            }
            Rule::Action(action_rule) => {
                let located = self.establish(action_rule.path.as_deref(), prev, cascade)?;
                trace!(
                    operator = action_rule.action.symbol(),
                    document = %self.current_document,
                    path = %located.point.normalized_path,
                    "dispatching rule"
                );
                handlers::dispatch(self, &action_rule.action, located)
            }
        }
    }

    fn logical_grouping(
        &mut self,
        operator: LogicalOperator,
        rules: &[Rule],
        prev: Option<&Rc<RefPoint>>,
        cascade: &EvalValue,
    ) -> Result<Outcome> {
        let document = self.current_document.clone();
        let mut result = operator == LogicalOperator::And;
        for rule in rules {
            let truthy = is_truthy(&self.process(rule, prev, cascade.clone())?.result);
            match operator {
                LogicalOperator::Or if truthy => {
                    result = true;
                    break;
                }
                LogicalOperator::And if !truthy => {
                    result = false;
                    break;
                }
                _ => {}
            }
        }
        // the group hands back the incoming point, so it stays in its document
        self.current_document = document;
        Ok(Outcome {
            result: result.into(),
            ref_point: prev.cloned(),
        })
    }

    /// Resolves the rule's path, if any, and returns the value it reads and
    /// the reference point it works at.
    fn establish(
        &mut self,
        path: Option<&str>,
        prev: Option<&Rc<RefPoint>>,
        cascade: EvalValue,
    ) -> Result<Located> {
        let prev_tree = prev
            .map(build_tree)
            .transpose()
            .map_err(|e| RuleError::structural(e.to_string()))?;
        match path {
            Some(path) => {
                let (document, point) = self.locate(path, prev_tree.as_deref())?;
                build_tree(&point).map_err(|e| RuleError::from_pointer(path, e))?;
                let value = self.read(&document, &point);
                self.current_document = document;
                Ok(Located {
                    value,
                    point,
                    live: true,
                })
            }
            None => {
                let current = prev_tree.and_then(|mut t| t.pop()).ok_or_else(|| {
                    RuleError::structural(
                        "Unable to traverse JSON document: no path and no previous reference point",
                    )
                })?;
                Ok(Located {
                    value: cascade,
                    point: current,
                    live: false,
                })
            }
        }
    }
}

/// The value a rule works on and the reference point it works at.
#[derive(Debug)]
pub(crate) struct Located {
    pub value: EvalValue,
    pub point: Rc<RefPoint>,
    /// Whether `value` was read at `point` rather than taken from the cascade.
    pub live: bool,
}
