//! Resolves the students currently enrolled in a class.

use async_trait::async_trait;

use crate::api::{path_segment, ApiClient, RosterEnvelope};
use crate::error::Result;
use crate::models::Student;

/// Anything that can answer "who is in class X right now".
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn resolve_roster(&self, class_id: &str) -> Result<Vec<Student>>;
}

/// `RosterSource` backed by `GET /students/class/:classId`.
#[derive(Debug, Clone)]
pub struct RosterResolver {
    api: ApiClient,
}

impl RosterResolver {
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RosterSource for RosterResolver {
    async fn resolve_roster(&self, class_id: &str) -> Result<Vec<Student>> {
        let path = format!("/students/class/{}", path_segment(class_id));
        let resp: RosterEnvelope = self.api.get(&path).await?;
        tracing::debug!(class_id, count = resp.data.student.len(), "roster resolved");
        Ok(resp.data.student)
    }
}
