use crate::error::{Result, RuleError};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Id of the scratch document every evaluation carries.
pub const VARS_DOCUMENT: &str = "$vars";

/// Key holding a document's id.
pub const ID_KEY: &str = "$id";

/// Documents addressable by id, owned by one evaluation.
///
/// The documents are deep copies of the caller's, so writes made by `set`
/// rules never reach the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMap {
    docs: HashMap<String, Value>,
    first: String,
}

impl DocumentMap {
    pub fn new(documents: &[Value]) -> Result<Self> {
        if documents.is_empty() {
            return Err(RuleError::structural("No documents provided"));
        }
        let mut docs = HashMap::with_capacity(documents.len() + 1);
        let mut first = None;
        for doc in documents {
            let id = document_id(doc)?;
            if id == VARS_DOCUMENT {
                return Err(RuleError::structural(format!(
                    "Document id \"{VARS_DOCUMENT}\" is reserved"
                )));
            }
            if docs.insert(id.to_string(), doc.clone()).is_some() {
                return Err(RuleError::structural(format!("Duplicate document id \"{id}\"")));
            }
            first.get_or_insert_with(|| id.to_string());
        }
        docs.insert(VARS_DOCUMENT.to_string(), Value::Object(Map::new()));
        Ok(DocumentMap {
            docs,
            first: first.unwrap_or_default(),
        })
    }

    /// Id of the first document passed in.
    pub fn first_id(&self) -> &str {
        &self.first
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.docs.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.docs.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.docs.keys().map(String::as_str)
    }
}

fn document_id(doc: &Value) -> Result<&str> {
    let obj = doc
        .as_object()
        .ok_or_else(|| RuleError::structural(format!("Document must be an object, got {doc}")))?;
    match obj.get(ID_KEY) {
        Some(Value::String(id)) => Ok(id),
        Some(other) => Err(RuleError::structural(format!(
            "Document \"{ID_KEY}\" must be a string, got {other}"
        ))),
        None => Err(RuleError::structural(format!("Document is missing \"{ID_KEY}\""))),
    }
}
