//! Class model, owned by the directory service.

use serde::{Deserialize, Serialize};

/// A class (grade + section) with its enrolled students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    /// Unique identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Class name (e.g. "Grade 7").
    pub name: String,
    /// Section within the grade (e.g. "B").
    #[serde(default)]
    pub section: String,
    /// Student ids on the roster.
    #[serde(default)]
    pub students: Vec<String>,
    /// Subjects taught to this class.
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl ClassGroup {
    /// Label used in pickers and tables, e.g. "Grade 7 - B".
    pub fn label(&self) -> String {
        if self.section.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.section)
        }
    }

    /// Whether the student is on this class's roster.
    pub fn has_student(&self, student_id: &str) -> bool {
        self.students.iter().any(|s| s == student_id)
    }
}
