//! `reident-linkage`: record linkage engine.
//!
//! Pure engine crate: receives pre-loaded records, returns the outer-joined
//! dataset. No CLI or IO dependencies.

pub mod config;
pub mod equivalence;
pub mod error;
pub mod join;
pub mod merge;
pub mod narrow;
pub mod normalize;
pub mod query;
pub mod record;
pub mod rule;
pub mod value;

pub use config::ReidentConfig;
pub use equivalence::mergeable;
pub use error::LinkageError;
pub use join::{join, JoinResult, JoinStats};
pub use merge::merge;
pub use query::{find, unique, Query};
pub use record::{Dataset, Record};
pub use rule::{Rule, RuleSet};
pub use value::{Alignment, Masked, Value, ValueSet};
