//! Live session model: a scheduled virtual classroom meeting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shortest session the scheduling widgets allow, in minutes.
pub const MIN_DURATION: u32 = 15;
/// Longest session the scheduling widgets allow, in minutes.
pub const MAX_DURATION: u32 = 180;
/// Duration a fresh draft starts with, in minutes.
pub const DEFAULT_DURATION: u32 = 60;

/// Status of a live session.
///
/// Transitions are not constrained: any status can be set from any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is planned for the future.
    #[default]
    Scheduled,
    /// Session is currently running.
    Ongoing,
    /// Session has finished.
    Completed,
    /// Session was called off.
    Cancelled,
}

impl SessionStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 4] = [
        Self::Scheduled,
        Self::Ongoing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Convert status to its wire string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse status from its wire string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(Self::Scheduled),
            "ongoing" | "live" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status tab on the session board. Cancelled sessions only show under `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusTab {
    #[default]
    All,
    Ongoing,
    Scheduled,
    Completed,
}

impl StatusTab {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Ongoing => "ongoing",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }

    /// Whether a session with `status` belongs under this tab.
    pub const fn matches(self, status: SessionStatus) -> bool {
        matches!(
            (self, status),
            (Self::All, _)
                | (Self::Ongoing, SessionStatus::Ongoing)
                | (Self::Scheduled, SessionStatus::Scheduled)
                | (Self::Completed, SessionStatus::Completed)
        )
    }
}

impl std::fmt::Display for StatusTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted live session as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    /// Server-assigned identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Session title (never empty).
    pub title: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque meeting URL.
    pub session_link: String,
    /// Teacher id.
    pub teacher: String,
    /// Class id.
    pub class: String,
    /// Invited student ids, a subset of the class roster at save time.
    pub students: Vec<String>,
    /// Scheduled start.
    pub start_from: DateTime<Utc>,
    /// Length in minutes.
    pub duration: u32,
    /// Current status.
    #[serde(default)]
    pub status: SessionStatus,
    /// When the backend created the session.
    pub created_at: DateTime<Utc>,
}

impl LiveSession {
    /// Whether `user_id` is one of the invited students.
    pub fn includes_student(&self, user_id: &str) -> bool {
        self.students.iter().any(|s| s == user_id)
    }

    /// Case-insensitive substring match against title or description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Body of a create or full-update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub session_link: String,
    pub teacher: String,
    pub class: String,
    pub students: Vec<String>,
    pub start_from: DateTime<Utc>,
    pub duration: u32,
    pub status: SessionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(title: &str, description: Option<&str>) -> LiveSession {
        LiveSession {
            id: "L1".to_string(),
            title: title.to_string(),
            description: description.map(String::from),
            session_link: "https://x.test/r1".to_string(),
            teacher: "T1".to_string(),
            class: "C1".to_string(),
            students: vec!["S1".to_string()],
            start_from: Utc::now(),
            duration: 45,
            status: SessionStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_roundtrip_strings() {
        for status in SessionStatus::ALL {
            assert_eq!(SessionStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::from_str("canceled"), Some(SessionStatus::Cancelled));
        assert_eq!(SessionStatus::from_str("paused"), None);
    }

    #[test]
    fn test_tab_matches() {
        assert!(StatusTab::All.matches(SessionStatus::Cancelled));
        assert!(StatusTab::Ongoing.matches(SessionStatus::Ongoing));
        assert!(!StatusTab::Scheduled.matches(SessionStatus::Cancelled));
        assert!(!StatusTab::Completed.matches(SessionStatus::Ongoing));
        assert_eq!(StatusTab::Scheduled.to_string(), "scheduled");
    }

    #[test]
    fn test_matches_search_title_or_description() {
        let s = session("Algebra Review", Some("Quadratic FORMULA drills"));
        assert!(s.matches_search("algebra"));
        assert!(s.matches_search("formula"));
        assert!(s.matches_search(""));
        assert!(!s.matches_search("geometry"));

        let bare = session("Poetry", None);
        assert!(!bare.matches_search("drills"));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let value = serde_json::to_value(session("Algebra Review", None)).unwrap();
        assert!(value.get("sessionLink").is_some());
        assert!(value.get("startFrom").is_some());
        assert_eq!(value["status"], "scheduled");
        assert!(value.get("description").is_none());
    }
}
