//! JSON Pointer utilities with relational reference points.
//!
//! Paths are RFC 6901 pointers, optionally without the leading `/`, where
//! the `..` segment walks one level up from a previously resolved point.
//! Every resolution yields a [`RefPoint`] whose `parent` chain leads back to
//! the document root.
//!
//! # Example
//!
//! ```
//! use json_rules_pointer::{resolve, tokenize, build_tree};
//! use serde_json::json;
//!
//! let doc = json!({"items": [{"price": 2}, {"price": 3}]});
//! let point = resolve(&tokenize("/items/1").unwrap(), None).unwrap();
//! assert_eq!(point.value(&doc), Some(&json!({"price": 3})));
//! assert_eq!(point.normalized_path, "/items/1");
//!
//! // Relative navigation from the resolved point.
//! let tree = build_tree(&point).unwrap();
//! let sibling = resolve(&tokenize("../0/price").unwrap(), Some(tree.as_slice())).unwrap();
//! assert_eq!(sibling.value(&doc), Some(&json!(2)));
//! assert_eq!(sibling.normalized_path, "/items/0/price");
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod types;
pub use types::{RefPoint, Source};

pub mod validate;
pub use validate::{validate_path, validate_pointer, MAX_PATH_LENGTH, MAX_POINTER_LENGTH};

pub mod resolve;
pub use resolve::{resolve, PARENT_SEGMENT};

pub mod tree;
pub use tree::build_tree;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("POINTER_INVALID: bad escape sequence in \"{0}\"")]
    InvalidEscape(String),
    #[error("POINTER_TOO_LONG")]
    PointerTooLong,
    #[error("Path too long")]
    PathTooLong,
    #[error("Cannot navigate above the document root")]
    AboveRoot,
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(String),
    #[error("NOT_CONTAINER: {0}")]
    NotContainer(String),
    #[error("infinite loop detected at \"{0}\"")]
    Cycle(String),
}

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// ```
/// use json_rules_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 first, so that "~01" becomes "~1" and not "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// ```
/// use json_rules_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Splits a path into unescaped tokens.
///
/// One leading `/` is optional, so `"/a/b"` and `"a/b"` tokenize the same
/// way. The empty path and `"/"` both address the starting point and
/// produce no tokens.
///
/// ```
/// use json_rules_pointer::tokenize;
///
/// assert_eq!(tokenize("/foo/bar").unwrap(), vec!["foo", "bar"]);
/// assert_eq!(tokenize("doc/a~1b").unwrap(), vec!["doc", "a/b"]);
/// assert_eq!(tokenize("../x").unwrap(), vec!["..", "x"]);
/// assert!(tokenize("").unwrap().is_empty());
/// assert!(tokenize("/bad~2").is_err());
/// ```
pub fn tokenize(path: &str) -> Result<Vec<String>, PointerError> {
    validate_pointer(path)?;
    let body = path.strip_prefix('/').unwrap_or(path);
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let tokens: Vec<String> = body.split('/').map(unescape_component).collect();
    validate_path(&tokens)?;
    Ok(tokens)
}

/// Formats tokens as an absolute JSON Pointer. The root is `""`.
///
/// ```
/// use json_rules_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["a/b".to_string(), "0".to_string()]), "/a~1b/0");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Check if a string is a valid array index: digits only, no leading zero.
///
/// ```
/// use json_rules_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Takes a single step from `val` into its child `key`.
///
/// Returns `None` when the key is missing, the index is not a valid array
/// index, or `val` is not a container.
pub fn step<'a>(val: &'a Value, key: &str) -> Option<&'a Value> {
    match val {
        Value::Object(map) => map.get(key),
        Value::Array(arr) => {
            if !is_valid_index(key) {
                return None;
            }
            arr.get(key.parse::<usize>().ok()?)
        }
        _ => None,
    }
}

/// Get a value from a JSON document by path.
///
/// ```
/// use json_rules_pointer::get;
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": [1, 2]}});
/// assert_eq!(get(&doc, &["foo".into(), "bar".into(), "1".into()]), Some(&json!(2)));
/// assert_eq!(get(&doc, &["missing".into()]), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(val, |current, key| step(current, key))
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for key in path {
        current = match current {
            Value::Object(map) => map.get_mut(key)?,
            Value::Array(arr) => {
                if !is_valid_index(key) {
                    return None;
                }
                arr.get_mut(key.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `path` inside `doc`, returning the value it replaced.
///
/// The parent of the target must already exist. Object parents gain or
/// replace the key; array parents replace an existing index or append when
/// the index equals the length (or is `-`). An empty path replaces `doc`.
///
/// ```
/// use json_rules_pointer::set;
/// use serde_json::json;
///
/// let mut doc = json!({"a": {"list": [1]}});
/// set(&mut doc, &["a".into(), "b".into()], json!(true)).unwrap();
/// set(&mut doc, &["a".into(), "list".into(), "-".into()], json!(2)).unwrap();
/// assert_eq!(doc, json!({"a": {"list": [1, 2], "b": true}}));
/// assert!(set(&mut doc, &["x".into(), "y".into()], json!(0)).is_err());
/// ```
pub fn set(doc: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PointerError> {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    let parent = get_mut(doc, parent_path)
        .ok_or_else(|| PointerError::NotFound(format_json_pointer(parent_path)))?;
    match parent {
        Value::Object(map) => Ok(map.insert(key.clone(), value)),
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(None);
            }
            if !is_valid_index(key) {
                return Err(PointerError::InvalidIndex(format_json_pointer(path)));
            }
            let idx: usize = key
                .parse()
                .map_err(|_| PointerError::InvalidIndex(format_json_pointer(path)))?;
            match idx.cmp(&arr.len()) {
                std::cmp::Ordering::Less => Ok(Some(std::mem::replace(&mut arr[idx], value))),
                std::cmp::Ordering::Equal => {
                    arr.push(value);
                    Ok(None)
                }
                std::cmp::Ordering::Greater => {
                    Err(PointerError::InvalidIndex(format_json_pointer(path)))
                }
            }
        }
        _ => Err(PointerError::NotContainer(format_json_pointer(parent_path))),
    }
}
