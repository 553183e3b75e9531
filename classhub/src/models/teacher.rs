//! Teacher model, owned by the directory service.

use serde::{Deserialize, Serialize};

/// A teacher as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Unique identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Subject taught.
    #[serde(default)]
    pub subject: String,
    /// Class this teacher leads, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_teacher_of: Option<String>,
}
