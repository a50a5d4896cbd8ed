use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkageError {
    /// Two value shapes have no comparison rule (e.g. left- vs right-aligned masks).
    #[error("cannot compare {left} with {right}")]
    UnsupportedComparison { left: &'static str, right: &'static str },
    /// Two value shapes have no merge rule (e.g. two masked values).
    #[error("cannot merge {left} with {right}")]
    UnsupportedMerge { left: &'static str, right: &'static str },
    /// Defined but unimplemented extension point.
    #[error("not supported: {0}")]
    NotSupported(&'static str),
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad placeholder, alias cycle, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}
