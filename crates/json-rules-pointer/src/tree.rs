//! Ancestor chains of reference points.

use crate::{PointerError, RefPoint};
use std::collections::HashSet;
use std::rc::Rc;

/// Rebuilds the ordered chain from the document root down to `point`.
///
/// # Errors
///
/// [`PointerError::Cycle`] when two nodes of the chain share a
/// `normalized_path`.
pub fn build_tree(point: &Rc<RefPoint>) -> Result<Vec<Rc<RefPoint>>, PointerError> {
    let mut seen = HashSet::new();
    let mut tree = Vec::new();
    let mut cursor = Some(Rc::clone(point));
    while let Some(node) = cursor {
        if !seen.insert(node.normalized_path.clone()) {
            return Err(PointerError::Cycle(node.normalized_path.clone()));
        }
        cursor = node.parent.clone();
        tree.push(node);
    }
    tree.reverse();
    Ok(tree)
}
