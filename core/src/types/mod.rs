pub mod config;
pub mod protocol;
pub mod record;

pub use config::{Settings, SuggestionOrder};
pub use protocol::Response;
pub use record::{Entries, MediaItem, Record, Status, StatusSymbol, MEDIA_FIELD, STATUS_FIELD};
