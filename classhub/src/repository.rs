//! Live session persistence through the backend.
//!
//! Each operation is one request/response round trip with no local caching.

use async_trait::async_trait;

use crate::api::{path_segment, ApiClient, DataEnvelope, SessionsEnvelope, StatusBody};
use crate::error::Result;
use crate::models::{LiveSession, SessionPayload, SessionStatus};

/// CRUD and status updates for live sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// All sessions, in backend order.
    async fn list_sessions(&self) -> Result<Vec<LiveSession>>;

    /// One session; `ApiError::NotFound` if absent.
    async fn get_session(&self, id: &str) -> Result<LiveSession>;

    /// Create a session. The backend assigns `id` and `created_at`.
    async fn create_session(&self, payload: &SessionPayload) -> Result<LiveSession>;

    /// Overwrite every editable field of an existing session.
    async fn update_session(&self, id: &str, payload: &SessionPayload) -> Result<LiveSession>;

    /// Change only the status. Any transition is accepted.
    async fn set_status(&self, id: &str, status: SessionStatus) -> Result<LiveSession>;

    /// Delete a session. Not idempotent: a missing id is `ApiError::NotFound`.
    async fn delete_session(&self, id: &str) -> Result<()>;
}

/// `SessionStore` backed by the `/live-sessions` endpoints.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    api: ApiClient,
}

impl SessionRepository {
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn session_path(id: &str) -> String {
    format!("/live-sessions/{}", path_segment(id))
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn list_sessions(&self) -> Result<Vec<LiveSession>> {
        let resp: SessionsEnvelope = self.api.get("/live-sessions").await?;
        Ok(resp.sessions)
    }

    async fn get_session(&self, id: &str) -> Result<LiveSession> {
        let resp: DataEnvelope<LiveSession> = self.api.get(&session_path(id)).await?;
        Ok(resp.data)
    }

    async fn create_session(&self, payload: &SessionPayload) -> Result<LiveSession> {
        let session: LiveSession = self.api.post("/live-sessions", payload).await?;
        tracing::info!(id = %session.id, title = %session.title, "session created");
        Ok(session)
    }

    async fn update_session(&self, id: &str, payload: &SessionPayload) -> Result<LiveSession> {
        let session: LiveSession = self.api.put(&session_path(id), payload).await?;
        tracing::info!(id, "session updated");
        Ok(session)
    }

    async fn set_status(&self, id: &str, status: SessionStatus) -> Result<LiveSession> {
        let path = format!("/live-sessions/status/{}", path_segment(id));
        let session: LiveSession = self.api.patch(&path, &StatusBody { status }).await?;
        tracing::info!(id, %status, "session status changed");
        Ok(session)
    }

    async fn delete_session(&self, id: &str) -> Result<()> {
        self.api.delete(&session_path(id)).await?;
        tracing::info!(id, "session deleted");
        Ok(())
    }
}
