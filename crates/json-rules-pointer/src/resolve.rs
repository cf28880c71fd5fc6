//! Resolution of tokenized paths into reference points.

use crate::{PointerError, RefPoint};
use std::rc::Rc;

/// The segment that moves one level up the reference tree.
pub const PARENT_SEGMENT: &str = "..";

/// Resolves `tokens` into a [`RefPoint`].
///
/// Without a `tree` resolution starts at the document root. With a tree (as
/// produced by [`crate::build_tree`]) it starts at the tree's last node:
/// [`PARENT_SEGMENT`] pops back to the previous node, any other token
/// descends. Only positions are computed; read the value with
/// [`RefPoint::value`]. Missing keys are not an error.
///
/// # Errors
///
/// [`PointerError::AboveRoot`] when `..` would leave the root.
pub fn resolve(tokens: &[String], tree: Option<&[Rc<RefPoint>]>) -> Result<Rc<RefPoint>, PointerError> {
    let (mut ancestors, mut current) = match tree.and_then(|t| t.split_last()) {
        Some((last, rest)) => (rest.to_vec(), Rc::clone(last)),
        None => (Vec::new(), RefPoint::root()),
    };
    for token in tokens {
        if token == PARENT_SEGMENT {
            current = ancestors.pop().ok_or(PointerError::AboveRoot)?;
        } else {
            let next = RefPoint::child(&current, token);
            ancestors.push(std::mem::replace(&mut current, next));
        }
    }
    Ok(current)
}
