//! In-memory development backend.
//!
//! Serves the same REST surface the client consumes, so the CLI and the
//! integration tests have something real to talk to. Everything lives in
//! memory for the life of the process.
//!
//! Endpoints:
//! - GET /live-sessions - List sessions (`{sessions}`)
//! - POST /live-sessions - Create a session
//! - GET /live-sessions/{id} - Fetch one (`{data}`)
//! - PUT /live-sessions/{id} - Overwrite a session
//! - DELETE /live-sessions/{id} - Delete a session
//! - PATCH /live-sessions/status/{id} - Change status only
//! - GET /teachers, /teachers/{id} - Teachers (`{data}`)
//! - GET /classes, /classes/{id} - Classes (`{data}`)
//! - GET /students/class/{class_id} - Class roster (`{data: {student}}`)

mod seed;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::api::{DataEnvelope, ErrorBody, RosterData, RosterEnvelope, SessionsEnvelope, StatusBody};
use crate::models::{
    ClassGroup, LiveSession, SessionPayload, Student, Teacher, MAX_DURATION, MIN_DURATION,
};

pub use seed::Seed;

/// Backend data. Sessions keep insertion order.
#[derive(Debug, Default)]
pub struct Backend {
    sessions: Vec<LiveSession>,
    teachers: Vec<Teacher>,
    classes: Vec<ClassGroup>,
    students: Vec<Student>,
}

impl Backend {
    pub fn from_seed(seed: Seed) -> Self {
        Self {
            sessions: Vec::new(),
            teachers: seed.teachers,
            classes: seed.classes,
            students: seed.students,
        }
    }

    fn class(&self, id: &str) -> Option<&ClassGroup> {
        self.classes.iter().find(|c| c.id == id)
    }

    fn session_index(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    /// Server-side checks on a create/update body.
    fn validate(&self, payload: &SessionPayload) -> Result<(), String> {
        if payload.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if payload.session_link.trim().is_empty() {
            return Err("Session link is required".to_string());
        }
        if !(MIN_DURATION..=MAX_DURATION).contains(&payload.duration) {
            return Err(format!(
                "Duration must be between {MIN_DURATION} and {MAX_DURATION} minutes"
            ));
        }
        if !self.teachers.iter().any(|t| t.id == payload.teacher) {
            return Err(format!("Teacher {} does not exist", payload.teacher));
        }
        let class = self
            .class(&payload.class)
            .ok_or_else(|| format!("Class {} does not exist", payload.class))?;
        if payload.students.is_empty() {
            return Err("At least one student is required".to_string());
        }
        if let Some(outsider) = payload.students.iter().find(|s| !class.has_student(s)) {
            return Err(format!("Student {outsider} is not in class {}", class.id));
        }
        Ok(())
    }
}

/// Shared server state.
pub struct ServerState {
    backend: RwLock<Backend>,
}

impl ServerState {
    pub fn new(seed: Seed) -> Arc<Self> {
        Arc::new(Self {
            backend: RwLock::new(Backend::from_seed(seed)),
        })
    }
}

type Rejection = (StatusCode, Json<ErrorBody>);
type Reply<T> = Result<Json<T>, Rejection>;

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (status, Json(ErrorBody::new(message)))
}

fn not_found(what: &str, id: &str) -> Rejection {
    reject(StatusCode::NOT_FOUND, format!("{what} {id} not found"))
}

/// Decode a JSON body so that shape errors come back as `{message}`.
fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, Rejection> {
    serde_json::from_value(body).map_err(|e| reject(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

// === Server Lifecycle ===

/// Build the router over `state`.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/live-sessions", get(list_sessions).post(create_session))
        .route(
            "/live-sessions/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/live-sessions/status/{id}", patch(set_status))
        .route("/teachers", get(list_teachers))
        .route("/teachers/{id}", get(get_teacher))
        .route("/classes", get(list_classes))
        .route("/classes/{id}", get(get_class))
        .route("/students/class/{class_id}", get(class_roster))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on `127.0.0.1:port` until the process is stopped.
pub async fn start_server(port: u16, seed: Seed) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("classhub dev backend listening on http://{addr}");
    tracing::info!(%addr, "dev backend started");

    axum::serve(listener, router(ServerState::new(seed)))
        .await
        .context("Server error")
}

/// Serve on an ephemeral local port in the background. Returns the bound address.
pub async fn spawn_local(seed: Seed) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .context("Failed to bind ephemeral port")?;
    let addr = listener.local_addr()?;
    let app = router(ServerState::new(seed));

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "dev backend stopped");
        }
    });

    Ok(addr)
}

// === Handlers ===

async fn list_sessions(State(state): State<Arc<ServerState>>) -> Json<SessionsEnvelope> {
    let backend = state.backend.read().await;
    Json(SessionsEnvelope {
        sessions: backend.sessions.clone(),
    })
}

async fn get_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Reply<DataEnvelope<LiveSession>> {
    let backend = state.backend.read().await;
    let index = backend
        .session_index(&id)
        .ok_or_else(|| not_found("Session", &id))?;
    Ok(Json(DataEnvelope {
        data: backend.sessions[index].clone(),
    }))
}

async fn create_session(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<LiveSession>), Rejection> {
    let payload: SessionPayload = parse_body(body)?;
    let mut backend = state.backend.write().await;
    backend
        .validate(&payload)
        .map_err(|m| reject(StatusCode::UNPROCESSABLE_ENTITY, m))?;

    let session = LiveSession {
        id: Uuid::now_v7().to_string(),
        title: payload.title,
        description: payload.description,
        session_link: payload.session_link,
        teacher: payload.teacher,
        class: payload.class,
        students: payload.students,
        start_from: payload.start_from,
        duration: payload.duration,
        status: payload.status,
        created_at: Utc::now(),
    };
    backend.sessions.push(session.clone());
    tracing::debug!(id = %session.id, "stored session");

    Ok((StatusCode::CREATED, Json(session)))
}

async fn update_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<LiveSession> {
    let payload: SessionPayload = parse_body(body)?;
    let mut backend = state.backend.write().await;
    let index = backend
        .session_index(&id)
        .ok_or_else(|| not_found("Session", &id))?;
    backend
        .validate(&payload)
        .map_err(|m| reject(StatusCode::UNPROCESSABLE_ENTITY, m))?;

    let session = &mut backend.sessions[index];
    session.title = payload.title;
    session.description = payload.description;
    session.session_link = payload.session_link;
    session.teacher = payload.teacher;
    session.class = payload.class;
    session.students = payload.students;
    session.start_from = payload.start_from;
    session.duration = payload.duration;
    session.status = payload.status;

    Ok(Json(session.clone()))
}

async fn set_status(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<LiveSession> {
    let StatusBody { status } = parse_body(body)?;
    let mut backend = state.backend.write().await;
    let index = backend
        .session_index(&id)
        .ok_or_else(|| not_found("Session", &id))?;

    let session = &mut backend.sessions[index];
    session.status = status;
    Ok(Json(session.clone()))
}

async fn delete_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Reply<Value> {
    let mut backend = state.backend.write().await;
    let index = backend
        .session_index(&id)
        .ok_or_else(|| not_found("Session", &id))?;
    backend.sessions.remove(index);
    Ok(Json(serde_json::json!({ "message": "Session deleted" })))
}

async fn list_teachers(State(state): State<Arc<ServerState>>) -> Json<DataEnvelope<Vec<Teacher>>> {
    let backend = state.backend.read().await;
    Json(DataEnvelope {
        data: backend.teachers.clone(),
    })
}

async fn get_teacher(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Reply<DataEnvelope<Teacher>> {
    let backend = state.backend.read().await;
    let teacher = backend
        .teachers
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or_else(|| not_found("Teacher", &id))?;
    Ok(Json(DataEnvelope { data: teacher }))
}

async fn list_classes(
    State(state): State<Arc<ServerState>>,
) -> Json<DataEnvelope<Vec<ClassGroup>>> {
    let backend = state.backend.read().await;
    Json(DataEnvelope {
        data: backend.classes.clone(),
    })
}

async fn get_class(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Reply<DataEnvelope<ClassGroup>> {
    let backend = state.backend.read().await;
    let class = backend
        .class(&id)
        .cloned()
        .ok_or_else(|| not_found("Class", &id))?;
    Ok(Json(DataEnvelope { data: class }))
}

async fn class_roster(
    State(state): State<Arc<ServerState>>,
    Path(class_id): Path<String>,
) -> Reply<RosterEnvelope> {
    let backend = state.backend.read().await;
    let class = backend
        .class(&class_id)
        .ok_or_else(|| not_found("Class", &class_id))?;

    let student = class
        .students
        .iter()
        .filter_map(|id| backend.students.iter().find(|s| &s.id == id).cloned())
        .collect();

    Ok(Json(RosterEnvelope {
        data: RosterData { student },
    }))
}
