//! Recent and bookmarked files shown on the start page

pub mod bookmarks;
pub mod recent;

pub use bookmarks::{BookmarkSource, BookmarkedFile, BookmarkedFileManager, HostBookmark, JsonBookmarks};
pub use recent::{RecentFile, RecentFileManager, RecentFiles};
