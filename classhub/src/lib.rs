//! Classhub - live classroom sessions for a school backend.
//!
//! Components, leaf to root:
//! - [`api`]: JSON client and response envelopes
//! - [`directory`]: teachers and classes (read-only)
//! - [`roster`]: students currently enrolled in a class
//! - [`repository`]: live session CRUD and status changes
//! - [`form`]: the create/edit draft and its roster lookups
//! - [`board`]: the filtered session list, status changes and deletes
//!
//! [`server`] is an in-memory backend with the same REST surface, used for
//! local development and tests.

pub mod api;
pub mod board;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod form;
pub mod models;
pub mod repository;
pub mod roster;
pub mod server;

pub use error::{ApiError, FormError};
