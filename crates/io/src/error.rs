use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Input is not UTF-8. Never transcoded silently.
    #[error("{}: invalid UTF-8 at byte {valid_up_to}", path.display())]
    Encoding { path: PathBuf, valid_up_to: usize },
    #[error("{source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
    #[error("{source_name}: no header row")]
    MissingHeader { source_name: String },
    #[error("{source_name}: duplicate column '{column}'")]
    DuplicateColumn { source_name: String, column: String },
    /// Header cell with no name; `position` is 1-based.
    #[error("{source_name}: column {position} has a blank header")]
    BlankColumn { source_name: String, position: usize },
    #[error("{source_name}, line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        source_name: String,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("{source_name}: {source}")]
    Sqlite {
        source_name: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A narrow-table cell that cannot become attribute text.
    #[error("{source_name}: unsupported {kind} in column '{column}'")]
    UnsupportedValue {
        source_name: String,
        column: String,
        kind: &'static str,
    },
}
