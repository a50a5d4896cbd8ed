//! CLI Exit Code Registry
//!
//! Single source of truth for `reident` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (output could not be written, etc.)       |
//! | 2    | Usage error (bad arguments, unreadable config file)      |
//! | 3    | Config parsed or validated badly                         |
//! | 4    | A source could not be loaded                             |
//! | 5    | Linkage aborted on an unsupported comparison or merge    |

use reident_linkage::LinkageError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing config file.
pub const EXIT_USAGE: u8 = 2;

/// Config is not valid TOML, has unknown fields, or fails validation.
pub const EXIT_CONFIG: u8 = 3;

/// A source file is missing, not UTF-8, malformed, or unreadable.
pub const EXIT_LOAD: u8 = 4;

/// The engine met a value pair it cannot compare or merge.
pub const EXIT_LINKAGE: u8 = 5;

/// Map a linkage error to its exit code.
pub fn linkage_exit_code(err: &LinkageError) -> u8 {
    match err {
        LinkageError::ConfigParse(_) | LinkageError::ConfigValidation(_) => EXIT_CONFIG,
        LinkageError::UnsupportedComparison { .. }
        | LinkageError::UnsupportedMerge { .. }
        | LinkageError::NotSupported(_) => EXIT_LINKAGE,
    }
}
