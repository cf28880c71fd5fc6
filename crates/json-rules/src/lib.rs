//! Declarative rules over JSON documents.
//!
//! # Overview
//!
//! Two evaluators share one value model:
//!
//! - [`check_condition`] decides a boolean [`Condition`] (`and`/`or` over
//!   checks addressed with dotted paths) against a single JSON value.
//! - [`evaluate_rules`] runs an ordered list of [`Rule`]s over one or more
//!   documents, each identified by its `$id`. Every rule reads a value
//!   (through a JSON Pointer path, or the previous rule's result), applies
//!   its operator and hands the result to the next rule.
//!
//! Rule paths are JSON Pointers. Paths without a leading `/` may start with
//! a document id (`Orders/items/0`). Without a document prefix, a path
//! continues from where the previous rule stopped, and `..` moves up one
//! level. The scratch document `$vars` is always present for `set` rules.
//!
//! # Example
//!
//! ```
//! use json_rules::{parse_rules, EvaluateOptions, RuleEvaluator};
//! use serde_json::json;
//!
//! let rules = parse_rules(&json!([
//!     {"path": "D2/x"},
//!     {"operator": "+", "value": 1},
//!     {"operator": "set", "setPath": "D1/y"}
//! ]))
//! .unwrap();
//! let docs = [json!({"$id": "D1", "y": 0}), json!({"$id": "D2", "x": 41})];
//!
//! let options = EvaluateOptions::new().with_primary_document("D1");
//! let mut evaluator = RuleEvaluator::new(&rules, &docs, options).unwrap();
//! assert_eq!(evaluator.evaluate().unwrap(), json!(42));
//! assert_eq!(evaluator.document("D1").unwrap()["y"], json!(42));
//! // the caller's documents are untouched
//! assert_eq!(docs[0]["y"], json!(0));
//! ```

pub mod condition;
pub mod documents;
pub mod error;
pub mod eval_ctx;
pub mod evaluate;
mod handlers;
pub mod operators;
mod parse;
pub mod rule;
pub mod types;
pub mod util;

pub use condition::{check_condition, Check, CheckNode, CheckOptions, Condition};
pub use documents::{DocumentMap, ID_KEY, VARS_DOCUMENT};
pub use error::RuleError;
pub use evaluate::{evaluate_rules, EvaluateOptions, RuleEvaluator};
pub use operators::{classify, OperatorClass};
pub use rule::{parse_rules, Action, ActionRule, BinaryOperator, CastType, Rule, Target};
pub use types::EvalValue;
