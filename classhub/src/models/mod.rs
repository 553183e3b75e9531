//! Data models for school directory entities and live sessions.

mod class_group;
mod session;
mod student;
mod teacher;

pub use class_group::ClassGroup;
pub use session::{
    LiveSession, SessionPayload, SessionStatus, StatusTab, DEFAULT_DURATION, MAX_DURATION,
    MIN_DURATION,
};
pub use student::Student;
pub use teacher::Teacher;
