pub mod types;

pub use types::{CatalogError, PlaybackError, SourceError};
