//! The reference point record produced by path resolution.

use crate::{escape_component, step};
use serde_json::Value;
use std::rc::Rc;

/// Where a [`RefPoint`] reads its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// The live document, at the point's position.
    Document,
    /// A value carried by the point itself (an iterated element, a derived
    /// array). `None` when nothing exists there.
    Detached(Option<Value>),
}

/// A resolved position inside a document.
///
/// `parent` links back towards the document root, so a chain of reference
/// points encodes the traversal that produced it. The root has no parent and
/// an empty `normalized_path`; every child extends its parent's
/// `normalized_path` by exactly one escaped segment.
///
/// Document-backed points hold no value: [`RefPoint::value`] reads them from
/// the document they were resolved in, so writes made after resolution are
/// visible. Children of a detached point are detached too.
#[derive(Debug, Clone, PartialEq)]
pub struct RefPoint {
    pub source: Source,
    /// The key used to reach this position from its parent.
    pub key: String,
    /// Absolute JSON pointer of this position within its document.
    pub normalized_path: String,
    /// The position this one was reached from.
    pub parent: Option<Rc<RefPoint>>,
}

impl RefPoint {
    /// The root of a document.
    pub fn root() -> Rc<Self> {
        Rc::new(RefPoint {
            source: Source::Document,
            key: String::new(),
            normalized_path: String::new(),
            parent: None,
        })
    }

    /// Steps from `parent` into `key`. Only detached parents hand a copy of
    /// the child value down.
    pub fn child(parent: &Rc<RefPoint>, key: &str) -> Rc<Self> {
        let source = match &parent.source {
            Source::Document => Source::Document,
            Source::Detached(obj) => Source::Detached(obj.as_ref().and_then(|v| step(v, key)).cloned()),
        };
        Self::extend(parent, key, source)
    }

    /// Steps from `parent` into `key` with an explicitly supplied value.
    ///
    /// Used when iterating an array whose elements are already at hand.
    pub fn child_with(parent: &Rc<RefPoint>, key: &str, obj: Option<Value>) -> Rc<Self> {
        Self::extend(parent, key, Source::Detached(obj))
    }

    fn extend(parent: &Rc<RefPoint>, key: &str, source: Source) -> Rc<Self> {
        let mut normalized_path = String::with_capacity(parent.normalized_path.len() + key.len() + 1);
        normalized_path.push_str(&parent.normalized_path);
        normalized_path.push('/');
        normalized_path.push_str(&escape_component(key));
        Rc::new(RefPoint {
            source,
            key: key.to_string(),
            normalized_path,
            parent: Some(Rc::clone(parent)),
        })
    }

    /// The same position carrying a different value.
    pub fn with_obj(&self, obj: Option<Value>) -> Rc<Self> {
        Rc::new(RefPoint {
            source: Source::Detached(obj),
            key: self.key.clone(),
            normalized_path: self.normalized_path.clone(),
            parent: self.parent.clone(),
        })
    }

    /// The value at this point. Document-backed points are read from
    /// `document` by reference.
    pub fn value<'a>(&'a self, document: &'a Value) -> Option<&'a Value> {
        match &self.source {
            Source::Detached(obj) => obj.as_ref(),
            Source::Document => self.keys().into_iter().try_fold(document, |v, k| step(v, k)),
        }
    }

    /// Unescaped keys from the root down to this point.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            if node.parent.is_some() {
                keys.push(node.key.as_str());
            }
            cursor = node.parent.as_deref();
        }
        keys.reverse();
        keys
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.source, Source::Detached(_))
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
