// Dataset loaders

pub mod csv;
pub mod error;
pub mod narrow;
pub mod source;

pub use error::LoadError;
pub use source::load_source;
