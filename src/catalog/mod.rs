//! Category classification, grouping and windowed loading.
//!
//! The classifier routes records into tabs, the grouper partitions the
//! active tab into named groups with bounded windows, and the loader grows
//! those windows from scroll/hover/sentinel triggers.

pub mod category_names;
pub mod classifier;
pub mod grouper;
pub mod loader;

pub use category_names::CategoryNameMap;
pub use classifier::{Classifier, ClassifierRules};
pub use grouper::{CategoryGrouper, GrouperSettings};
pub use loader::{LoaderSettings, ScrollMetrics, WindowedLoader};
