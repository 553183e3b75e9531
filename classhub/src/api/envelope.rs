//! Response envelopes for the backend REST surface.
//!
//! Every endpoint has exactly one typed shape; nothing here guesses between
//! a bare array and a wrapped one.

use serde::{Deserialize, Serialize};

use crate::models::{LiveSession, SessionStatus, Student};

/// `GET /live-sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsEnvelope {
    pub sessions: Vec<LiveSession>,
}

/// `{ data: T }`, used by single-session, teacher and class endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Roster for a class: `{ data: { student: [...] } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEnvelope {
    pub data: RosterData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterData {
    #[serde(default)]
    pub student: Vec<Student>,
}

/// Body of `PATCH /live-sessions/status/:id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: SessionStatus,
}

/// Error body carried by non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}
