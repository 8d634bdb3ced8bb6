//! Page splitting.

mod options;
mod splitter;

pub use options::{PageSelection, SplitOptions, DEFAULT_SUBDIR};
pub use splitter::{PageSplitter, SplitEvent};
