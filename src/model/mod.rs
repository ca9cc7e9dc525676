//! Data model shared by the index, matcher and strategies

pub mod file_type;
pub mod filter;
pub mod record;

pub use file_type::{FileType, SUPPORTED_FILE_TYPES, is_supported_extension, supported_extensions};
pub use filter::{FilterSpec, FilterType, filter_type_for_key};
pub use record::{IconRecord, LinkRecord, LinkType, RecordKind, SearchRecord};
