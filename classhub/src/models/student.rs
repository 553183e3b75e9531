//! Student model.

use serde::{Deserialize, Serialize};

/// A student enrolled in exactly one class roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}
