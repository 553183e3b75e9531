//! Directory data the dev backend starts with.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ClassGroup, Student, Teacher};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub teachers: Vec<Teacher>,
    pub classes: Vec<ClassGroup>,
    pub students: Vec<Student>,
}

impl Seed {
    /// Read a seed from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse seed from {}", path.display()))
    }

    /// A small school: two teachers, two classes, five students.
    pub fn demo() -> Self {
        let teacher = |id: &str, name: &str, subject: &str, class: Option<&str>| Teacher {
            id: id.to_string(),
            name: name.to_string(),
            subject: subject.to_string(),
            class_teacher_of: class.map(String::from),
        };
        let student = |id: &str, name: &str| Student {
            id: id.to_string(),
            name: name.to_string(),
        };
        let class = |id: &str, name: &str, section: &str, students: &[&str], subjects: &[&str]| {
            ClassGroup {
                id: id.to_string(),
                name: name.to_string(),
                section: section.to_string(),
                students: students.iter().map(|s| (*s).to_string()).collect(),
                subjects: subjects.iter().map(|s| (*s).to_string()).collect(),
            }
        };

        Self {
            teachers: vec![
                teacher("T1", "Amara Okafor", "Mathematics", Some("C1")),
                teacher("T2", "Lukas Brenner", "Literature", None),
            ],
            classes: vec![
                class("C1", "Grade 7", "A", &["S1", "S2", "S3"], &["Mathematics", "Science"]),
                class("C2", "Grade 8", "B", &["S4", "S5"], &["Literature", "History"]),
            ],
            students: vec![
                student("S1", "Priya Nair"),
                student("S2", "Mateo Alvarez"),
                student("S3", "Hana Sato"),
                student("S4", "Noah Fischer"),
                student("S5", "Zainab Yusuf"),
            ],
        }
    }
}
