//! Session board: the list of live sessions a user can see.
//!
//! The board loads sessions, classes and teachers together. That load is all
//! or nothing: if any of the three requests fails the board is left unloaded
//! and reports that one failure, even when the other two succeeded.
//!
//! The visible list is the role filter AND the status tab AND the free-text
//! search, in backend order. Status changes and deletes never touch the local
//! list directly; they always reload it from the backend afterwards.

use crate::context::{Role, UserContext};
use crate::directory::Directory;
use crate::error::{FormError, Result};
use crate::form::SessionFormController;
use crate::models::{ClassGroup, LiveSession, SessionStatus, StatusTab, Teacher};
use crate::repository::SessionStore;

/// Whether `session` is shown to `user` at all.
pub fn is_visible_to(session: &LiveSession, user: &UserContext) -> bool {
    match user.role {
        Role::Teacher => session.teacher == user.user_id,
        Role::Student => session.includes_student(&user.user_id),
        Role::Admin | Role::Other(_) => true,
    }
}

/// Apply role, tab and search filters, keeping input order.
pub fn filter_sessions<'a>(
    sessions: &'a [LiveSession],
    user: &UserContext,
    tab: StatusTab,
    search: &str,
) -> Vec<&'a LiveSession> {
    let needle = search.to_lowercase();
    sessions
        .iter()
        .filter(|s| is_visible_to(s, user))
        .filter(|s| tab.matches(s.status))
        .filter(|s| s.matches_search(&needle))
        .collect()
}

/// Summary counts shown above the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub total: usize,
    pub scheduled: usize,
    pub ongoing: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl SessionCounters {
    /// Count sessions visible to `user`, ignoring tab and search.
    pub fn tally(sessions: &[LiveSession], user: &UserContext) -> Self {
        sessions
            .iter()
            .filter(|s| is_visible_to(s, user))
            .fold(Self::default(), |mut acc, s| {
                acc.total += 1;
                match s.status {
                    SessionStatus::Scheduled => acc.scheduled += 1,
                    SessionStatus::Ongoing => acc.ongoing += 1,
                    SessionStatus::Completed => acc.completed += 1,
                    SessionStatus::Cancelled => acc.cancelled += 1,
                }
                acc
            })
    }
}

/// Load state of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The load failed; stays here until the next `load`.
    Failed(String),
}

pub struct SessionBoard<S, D> {
    store: S,
    directory: D,
    user: UserContext,
    state: LoadState,
    sessions: Vec<LiveSession>,
    classes: Vec<ClassGroup>,
    teachers: Vec<Teacher>,
    tab: StatusTab,
    search: String,
    pending_delete: Option<String>,
}

impl<S, D> SessionBoard<S, D>
where
    S: SessionStore,
    D: Directory,
{
    pub fn new(store: S, directory: D, user: UserContext) -> Self {
        Self {
            store,
            directory,
            user,
            state: LoadState::Idle,
            sessions: Vec::new(),
            classes: Vec::new(),
            teachers: Vec::new(),
            tab: StatusTab::All,
            search: String::new(),
            pending_delete: None,
        }
    }

    /// Load sessions, classes and teachers concurrently.
    pub async fn load(&mut self) -> Result<()> {
        self.state = LoadState::Loading;

        let (sessions, classes, teachers) = tokio::join!(
            self.store.list_sessions(),
            self.directory.list_classes(),
            self.directory.list_teachers(),
        );

        let loaded = sessions
            .map_err(|e| ("sessions", e))
            .and_then(|s| classes.map(|c| (s, c)).map_err(|e| ("classes", e)))
            .and_then(|(s, c)| teachers.map(|t| (s, c, t)).map_err(|e| ("teachers", e)));

        match loaded {
            Ok((sessions, classes, teachers)) => {
                tracing::info!(
                    sessions = sessions.len(),
                    classes = classes.len(),
                    teachers = teachers.len(),
                    "board loaded"
                );
                self.sessions = sessions;
                self.classes = classes;
                self.teachers = teachers;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err((source, e)) => {
                tracing::warn!(source, error = %e, "board load failed");
                self.sessions.clear();
                self.classes.clear();
                self.teachers.clear();
                self.state = LoadState::Failed(format!("Failed to load {source}: {e}"));
                Err(e)
            }
        }
    }

    /// Re-fetch the session list only. On failure the previous list stays.
    pub async fn reload_sessions(&mut self) -> Result<()> {
        match self.store.list_sessions().await {
            Ok(sessions) => {
                self.sessions = sessions;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "session reload failed");
                Err(e)
            }
        }
    }

    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Every loaded session, unfiltered.
    pub fn sessions(&self) -> &[LiveSession] {
        &self.sessions
    }

    pub fn classes(&self) -> &[ClassGroup] {
        &self.classes
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub const fn tab(&self) -> StatusTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: StatusTab) {
        self.tab = tab;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Sessions after role, tab and search filters.
    pub fn visible_sessions(&self) -> Vec<&LiveSession> {
        filter_sessions(&self.sessions, &self.user, self.tab, &self.search)
    }

    /// Counters over the sessions this user may see.
    pub fn counters(&self) -> SessionCounters {
        SessionCounters::tally(&self.sessions, &self.user)
    }

    pub fn teacher_name(&self, id: &str) -> Option<&str> {
        self.teachers
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }

    pub fn class_label(&self, id: &str) -> Option<String> {
        self.classes.iter().find(|c| c.id == id).map(ClassGroup::label)
    }

    /// Set a session's status, then reload the list.
    pub async fn change_status(&mut self, id: &str, status: SessionStatus) -> Result<()> {
        self.store.set_status(id, status).await?;
        self.reload_sessions().await
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: impl Into<String>) {
        self.pending_delete = Some(id.into());
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the session awaiting confirmation, then reload.
    ///
    /// Returns the deleted id, or `None` if nothing was awaiting confirmation.
    /// The confirmation is consumed whether or not the delete succeeds.
    pub async fn confirm_delete(&mut self) -> Result<Option<String>> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };
        self.store.delete_session(&id).await?;
        self.reload_sessions().await?;
        Ok(Some(id))
    }

    /// Submit `form` and reload the list when the save succeeds.
    pub async fn save_form(
        &mut self,
        form: &mut SessionFormController,
    ) -> std::result::Result<LiveSession, FormError> {
        let saved = form.submit(&self.store).await?;
        if let Err(e) = self.reload_sessions().await {
            tracing::warn!(id = %saved.id, error = %e, "saved session but reload failed");
        }
        Ok(saved)
    }

    /// Look up a loaded session by id.
    pub fn find(&self, id: &str) -> Option<&LiveSession> {
        self.sessions.iter().find(|s| s.id == id)
    }
}
