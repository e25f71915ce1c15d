use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ordering of lookup-miss suggestions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionOrder {
    /// Highest similarity first.
    #[default]
    MostSimilarFirst,
    /// Lowest similarity first, as the legacy bot listed them.
    LeastSimilarFirst,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one state file and one backup file per namespace.
    pub save_dir: PathBuf,
    /// Field schema resource: canonical field name to alias list.
    pub fields_path: PathBuf,
    /// Command prefix shown in hints, e.g. "Use `!edit X` instead".
    pub prefix: String,
    pub suggestion_limit: usize,
    pub suggestion_order: SuggestionOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            save_dir: PathBuf::from("data"),
            fields_path: PathBuf::from("fields.json"),
            prefix: "!".into(),
            suggestion_limit: 3,
            suggestion_order: SuggestionOrder::MostSimilarFirst,
            log_file: None,
            log_filter: "info".into(),
        }
    }
}
