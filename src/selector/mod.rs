pub mod errors;
pub mod path;
pub mod read;
pub mod write;

pub use errors::{ApplyError, SyntaxError};
pub use path::{PathSegment, SegmentIndex, SelectorPath, ANY_TYPE};
pub use read::DataSelector;
pub use write::WritableSelector;
