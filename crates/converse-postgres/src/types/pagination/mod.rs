//! Offset pagination for list queries.

mod offset;

pub use self::offset::{MAX_LIMIT, OffsetPage, OffsetPagination};
