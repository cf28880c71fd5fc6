use json_rules_pointer::PointerError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// Ill-formed rule or condition tree, or unusable evaluator input.
    #[error("{0}")]
    Structural(String),

    /// A value of the wrong kind reached an operator at runtime.
    #[error("{0}")]
    Domain(String),

    #[error("Invalid target for check: {0}")]
    InvalidCheckTarget(String),

    #[error("Invalid operator for check: {0}")]
    InvalidOperator(String),

    #[error("Invalid path \"{path}\": {source}")]
    InvalidPath { path: String, source: PointerError },
}

impl RuleError {
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        RuleError::Structural(msg.into())
    }

    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        RuleError::Domain(msg.into())
    }

    /// Maps a pointer failure hit while resolving `path`.
    pub(crate) fn from_pointer(path: &str, err: PointerError) -> Self {
        match err {
            PointerError::Cycle(_) => RuleError::Structural(err.to_string()),
            source => RuleError::InvalidPath {
                path: path.to_string(),
                source,
            },
        }
    }
}

pub type Result<T, E = RuleError> = std::result::Result<T, E>;
