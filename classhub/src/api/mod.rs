//! HTTP plumbing for the school backend.

mod client;
mod envelope;

pub use client::{path_segment, ApiClient};
pub use envelope::{DataEnvelope, ErrorBody, RosterData, RosterEnvelope, SessionsEnvelope, StatusBody};
