//! Read-only access to teachers and classes.

use async_trait::async_trait;

use crate::api::{path_segment, ApiClient, DataEnvelope};
use crate::error::Result;
use crate::models::{ClassGroup, Teacher};

/// Source of teacher and class records.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn list_teachers(&self) -> Result<Vec<Teacher>>;
    async fn get_teacher(&self, id: &str) -> Result<Teacher>;
    async fn list_classes(&self) -> Result<Vec<ClassGroup>>;
    async fn get_class(&self, id: &str) -> Result<ClassGroup>;
}

/// `Directory` backed by the REST API.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    api: ApiClient,
}

impl DirectoryClient {
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Directory for DirectoryClient {
    async fn list_teachers(&self) -> Result<Vec<Teacher>> {
        let resp: DataEnvelope<Vec<Teacher>> = self.api.get("/teachers").await?;
        Ok(resp.data)
    }

    async fn get_teacher(&self, id: &str) -> Result<Teacher> {
        let path = format!("/teachers/{}", path_segment(id));
        let resp: DataEnvelope<Teacher> = self.api.get(&path).await?;
        Ok(resp.data)
    }

    async fn list_classes(&self) -> Result<Vec<ClassGroup>> {
        let resp: DataEnvelope<Vec<ClassGroup>> = self.api.get("/classes").await?;
        Ok(resp.data)
    }

    async fn get_class(&self, id: &str) -> Result<ClassGroup> {
        let path = format!("/classes/{}", path_segment(id));
        let resp: DataEnvelope<ClassGroup> = self.api.get(&path).await?;
        Ok(resp.data)
    }
}
