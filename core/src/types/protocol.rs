use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, StoreError};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        output: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
        /// Closest existing entry names, on a lookup miss.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        suggestions: Vec<String>,
    },
}

impl Response {
    pub fn ok(output: impl Into<String>) -> Self {
        Response::Ok { output: output.into() }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            kind,
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }

    /// Text for a human: the output, or the message followed by any
    /// suggestions.
    pub fn render(&self) -> String {
        match self {
            Response::Ok { output } => output.clone(),
            Response::Error { message, suggestions, .. } if suggestions.is_empty() => {
                message.clone()
            }
            Response::Error { message, suggestions, .. } => {
                format!("{}\nDid you mean: {}", message, suggestions.join(", "))
            }
        }
    }
}

impl From<StoreError> for Response {
    fn from(e: StoreError) -> Self {
        Response::error(e.kind(), e.to_string())
    }
}
