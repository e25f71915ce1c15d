//! Command: the typed interface for every record-store operation.
//!
//! Each variant is dispatched by `Sys::execute()`. The enum is also the wire
//! format of `infobot serve`:
//!
//! ```json
//! {"command": "add", "name": "Loc1", "assignments": "l=Roomy $ r=9-5"}
//! {"command": "edit", "entry": "Loc1", "field": "loc", "value": "Cellar"}
//! {"command": "list"}
//! ```
//!
//! | Group | Commands |
//! |-------|----------|
//! | Entries | `add`, `edit`, `delete`, `info`, `list`, `media_add` |
//! | Status | `status`, `on`, `off`, `no_status` |
//! | History | `undo` |
//! | Help | `help` |

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    // -----------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------

    /// Create an entry.
    #[serde(rename = "add")]
    Add {
        name: String,
        /// Raw `FIELD=VALUE $ FIELD=VALUE` text; may be empty.
        #[serde(default)]
        assignments: String,
    },

    /// Set one field of an entry. `field` may be any alias.
    #[serde(rename = "edit")]
    Edit {
        entry: String,
        field: String,
        value: String,
    },

    #[serde(rename = "delete")]
    Delete { name: String },

    /// Show an entry's fields and media.
    #[serde(rename = "info")]
    Info { name: String },

    /// All entry names with their status symbols.
    #[serde(rename = "list")]
    List,

    /// Append a labelled media link to an entry.
    #[serde(rename = "media_add")]
    MediaAdd {
        name: String,
        label: String,
        url: String,
    },

    // -----------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------

    /// Report an entry's status.
    #[serde(rename = "status")]
    Status { name: String },

    #[serde(rename = "on")]
    On { name: String },

    #[serde(rename = "off")]
    Off { name: String },

    /// Clear an entry's status.
    #[serde(rename = "no_status")]
    NoStatus { name: String },

    // -----------------------------------------------------------------
    // History
    // -----------------------------------------------------------------

    /// Swap the current state with the backup snapshot. Running it twice
    /// restores the original state.
    #[serde(rename = "undo")]
    Undo,

    #[serde(rename = "help")]
    Help {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}
