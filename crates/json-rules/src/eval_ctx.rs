use crate::documents::DocumentMap;
use crate::error::{Result, RuleError};
use crate::rule::{Rule, Target};
use crate::types::EvalValue;
use json_rules_pointer::{build_tree, resolve, set, tokenize, RefPoint};
use serde_json::Value;
use std::rc::Rc;
use tracing::debug;

/// Per-evaluation state handed to every rule handler.
#[derive(Debug)]
pub struct EvalCtx {
    pub(crate) documents: DocumentMap,
    /// Document that paths without a document prefix resolve against.
    pub(crate) current_document: String,
}

impl EvalCtx {
    pub(crate) fn new(documents: DocumentMap, current_document: String) -> Self {
        EvalCtx {
            documents,
            current_document,
        }
    }

    /// Resolves `path` against the current document, or against another
    /// document when the path is not rooted (`/`) and its first segment is a
    /// document id. With a `tree`, unprefixed paths resolve relative to the
    /// tree's last node.
    pub(crate) fn locate(
        &self,
        path: &str,
        tree: Option<&[Rc<RefPoint>]>,
    ) -> Result<(String, Rc<RefPoint>)> {
        let mut tokens = tokenize(path).map_err(|e| RuleError::from_pointer(path, e))?;
        let mut document = self.current_document.clone();
        let mut tree = tree;
        if !path.starts_with('/') && tokens.first().is_some_and(|t| self.documents.contains(t)) {
            document = tokens.remove(0);
            tree = None;
        }
        if !self.documents.contains(&document) {
            return Err(RuleError::structural(format!("Unknown document \"{document}\"")));
        }
        let point = resolve(&tokens, tree).map_err(|e| RuleError::from_pointer(path, e))?;
        Ok((document, point))
    }

    /// The value at `point` in `document`, as it is now.
    pub(crate) fn read(&self, document: &str, point: &RefPoint) -> EvalValue {
        match self.documents.get(document) {
            Some(doc) => point.value(doc).cloned().into(),
            None => EvalValue::Undefined,
        }
    }

    /// Writes `value` at `set_path`, resolved from `current` like a rule path.
    /// The current document is left unchanged.
    pub(crate) fn write(&mut self, set_path: &str, current: &Rc<RefPoint>, value: Value) -> Result<()> {
        let tree = build_tree(current).map_err(|e| RuleError::from_pointer(set_path, e))?;
        let (document, point) = self
            .locate(set_path, Some(tree.as_slice()))
            .map_err(|e| RuleError::domain(format!("Unable to set \"{set_path}\": {e}")))?;
        let tokens: Vec<String> = point.keys().into_iter().map(str::to_string).collect();
        let doc = self
            .documents
            .get_mut(&document)
            .ok_or_else(|| RuleError::domain(format!("Unknown document \"{document}\"")))?;
        set(doc, &tokens, value)
            .map_err(|e| RuleError::domain(format!("Unable to set \"{set_path}\": {e}")))?;
        debug!(document = %document, path = %point.normalized_path, "document updated");
        Ok(())
    }

    /// Runs a sub-rule sequence at a fixed reference point, threading only
    /// the cascade value. Document switches made by the sub-rules do not
    /// outlive the sequence.
    pub(crate) fn run_sequence(
        &mut self,
        rules: &[Rule],
        point: &Rc<RefPoint>,
        cascade: EvalValue,
    ) -> Result<EvalValue> {
        let document = self.current_document.clone();
        let mut value = cascade;
        for rule in rules {
            value = self.process(rule, Some(point), value)?.result;
        }
        self.current_document = document;
        Ok(value)
    }

    /// The right-hand operand of a rule: its literal `value`, or what its
    /// `getValue` rules derive from `path_val`.
    pub(crate) fn derive_target(
        &mut self,
        target: &Target,
        path_val: &EvalValue,
        current: &Rc<RefPoint>,
    ) -> Result<EvalValue> {
        match target {
            Target::Value(v) => Ok(EvalValue::Json(v.clone())),
            Target::Derived(rules) => self.run_sequence(rules, current, path_val.clone()),
        }
    }
}

/// Reference point of the element at `index` of the array held by `parent`.
///
/// A `live` array is the one stored at `parent`, so its elements are read
/// from the document; any other array (a cascade result) is carried along.
pub(crate) fn element_point(parent: &Rc<RefPoint>, index: usize, element: &Value, live: bool) -> Rc<RefPoint> {
    if live && !parent.is_detached() {
        RefPoint::child(parent, &index.to_string())
    } else {
        RefPoint::child_with(parent, &index.to_string(), Some(element.clone()))
    }
}
