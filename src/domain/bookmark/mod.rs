//! Bookmark Context - 书签限界上下文

mod entities;

pub use entities::{Bookmark, BookmarkId, BookmarkOptions, BookmarkUpdate};
