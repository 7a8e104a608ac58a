//! Value objects - immutable types that represent domain concepts

mod cursor;
mod ids;
mod ordering;

pub use cursor::{CursorPosition, CursorToken, PageCursor};
pub use ids::{DocumentId, ParentId};
pub use ordering::{ChildQuery, OrderingMode, COMMENTS_PER_PAGE};
