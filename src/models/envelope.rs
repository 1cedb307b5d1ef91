//! JSON response envelope shared by every endpoint

use serde::{Deserialize, Serialize};

/// Fields every JSON response envelope carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Envelope with no resource payload (update/delete/stop acknowledgements)
pub type Ack = ResponseMeta;

/// Pushes `(key, value)` when `value` is present and non-empty
pub(crate) fn push_param(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        query.push((key, value.to_string()));
    }
}
