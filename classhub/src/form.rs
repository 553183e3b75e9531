//! Session form controller: the create/edit draft of a live session.
//!
//! The controller owns a mutable [`SessionDraft`] while the form is open and
//! resolves the class roster whenever the selected class changes. Roster
//! fetches are tagged with a [`RosterTicket`]; a response whose ticket is no
//! longer current is dropped, so a slow fetch for an earlier class can never
//! overwrite the roster of the class picked after it.
//!
//! Submitting always sends `status = scheduled`, including when editing a
//! session that is ongoing or completed.

use chrono::{DateTime, Utc};

use crate::error::{ApiError, FormError, RequiredField};
use crate::models::{LiveSession, SessionPayload, SessionStatus, Student, DEFAULT_DURATION};
use crate::repository::SessionStore;
use crate::roster::RosterSource;

/// Form visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Closed,
    /// Open with an empty draft; submit creates.
    Create,
    /// Open with a draft copied from this session; submit overwrites it.
    Edit(Box<LiveSession>),
}

impl FormMode {
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// What to do with selected students that are not on a freshly resolved roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleSelection {
    /// Keep them; the payload may then reference students outside the class.
    Keep,
    /// Drop them so the selection stays a subset of the roster.
    #[default]
    Prune,
}

/// Unsaved form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub title: String,
    pub description: String,
    pub session_link: String,
    pub teacher: Option<String>,
    pub class: Option<String>,
    pub students: Vec<String>,
    pub start_from: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
    pub status: SessionStatus,
}

impl Default for SessionDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            session_link: String::new(),
            teacher: None,
            class: None,
            students: Vec::new(),
            start_from: None,
            duration: Some(DEFAULT_DURATION),
            status: SessionStatus::Scheduled,
        }
    }
}

impl From<&LiveSession> for SessionDraft {
    fn from(session: &LiveSession) -> Self {
        Self {
            title: session.title.clone(),
            description: session.description.clone().unwrap_or_default(),
            session_link: session.session_link.clone(),
            teacher: Some(session.teacher.clone()),
            class: Some(session.class.clone()),
            students: session.students.clone(),
            start_from: Some(session.start_from),
            duration: Some(session.duration),
            status: session.status,
        }
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

fn filled_id(value: Option<&String>) -> bool {
    value.is_some_and(|v| filled(v))
}

impl SessionDraft {
    /// Required fields that are still empty, in form order.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if !filled(&self.title) {
            missing.push(RequiredField::Title);
        }
        if !filled(&self.session_link) {
            missing.push(RequiredField::SessionLink);
        }
        if !filled_id(self.teacher.as_ref()) {
            missing.push(RequiredField::Teacher);
        }
        if !filled_id(self.class.as_ref()) {
            missing.push(RequiredField::Class);
        }
        if self.students.is_empty() {
            missing.push(RequiredField::Students);
        }
        if self.start_from.is_none() {
            missing.push(RequiredField::StartFrom);
        }
        if self.duration.is_none() {
            missing.push(RequiredField::Duration);
        }
        missing
    }

    /// Build the outgoing body. Status is always `scheduled`.
    pub fn to_payload(&self) -> Result<SessionPayload, FormError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        let (Some(teacher), Some(class), Some(start_from), Some(duration)) = (
            self.teacher.clone(),
            self.class.clone(),
            self.start_from,
            self.duration,
        ) else {
            return Err(FormError::MissingFields(self.missing_fields()));
        };

        let description = self.description.trim();
        Ok(SessionPayload {
            title: self.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            session_link: self.session_link.trim().to_string(),
            teacher,
            class,
            students: self.students.clone(),
            start_from,
            duration,
            status: SessionStatus::Scheduled,
        })
    }
}

/// A single editable field and its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionField {
    Title(String),
    Description(String),
    SessionLink(String),
    Teacher(Option<String>),
    StartFrom(Option<DateTime<Utc>>),
    Duration(Option<u32>),
    Status(SessionStatus),
}

/// Identifies one roster fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterTicket {
    pub generation: u64,
    pub class_id: String,
}

/// What happened to a roster response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterOutcome {
    /// Roster replaced; `pruned` selections were dropped.
    Applied { students: usize, pruned: usize },
    /// A newer class selection (or a close) superseded this fetch.
    Stale,
    /// Fetch failed; the previous roster was kept.
    Failed(ApiError),
}

/// Owns the session draft while the form is open.
#[derive(Debug, Default)]
pub struct SessionFormController {
    mode: FormMode,
    draft: SessionDraft,
    roster: Vec<Student>,
    /// Class the roster was resolved for; lags `draft.class` after a failed fetch.
    roster_class: Option<String>,
    generation: u64,
    stale_selection: StaleSelection,
    last_error: Option<String>,
}

impl SessionFormController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller with an explicit stale-selection policy.
    pub fn with_stale_selection(policy: StaleSelection) -> Self {
        Self {
            stale_selection: policy,
            ..Self::default()
        }
    }

    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub const fn is_open(&self) -> bool {
        self.mode.is_open()
    }

    pub const fn draft(&self) -> &SessionDraft {
        &self.draft
    }

    /// Last successfully resolved roster. After a failed fetch this can
    /// belong to a previously selected class; see [`roster_class`](Self::roster_class).
    pub fn roster(&self) -> &[Student] {
        &self.roster
    }

    /// Class the current roster was resolved for.
    pub fn roster_class(&self) -> Option<&str> {
        self.roster_class.as_deref()
    }

    /// The roster, but only if it was resolved for `class_id`.
    pub fn roster_for(&self, class_id: &str) -> Option<&[Student]> {
        (self.roster_class.as_deref() == Some(class_id)).then_some(self.roster.as_slice())
    }

    /// The roster of the class selected in the draft, if it has been resolved.
    pub fn selected_roster(&self) -> Option<&[Student]> {
        self.draft.class.as_deref().and_then(|c| self.roster_for(c))
    }

    /// Message of the most recent failure, cleared on the next open.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Required fields that would block submit right now.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        self.draft.missing_fields()
    }

    /// Open with an empty draft.
    pub fn open_for_create(&mut self) {
        self.reset();
        self.mode = FormMode::Create;
        tracing::debug!("session form opened for create");
    }

    /// Open with a copy of `session`. Returns the roster fetch for its class.
    pub fn open_for_edit(&mut self, session: &LiveSession) -> Option<RosterTicket> {
        self.reset();
        self.mode = FormMode::Edit(Box::new(session.clone()));
        self.draft = SessionDraft::from(session);
        tracing::debug!(id = %session.id, "session form opened for edit");
        self.issue_ticket()
    }

    /// Update one draft field. No validation happens until submit.
    pub fn field_changed(&mut self, field: SessionField) {
        if !self.is_open() {
            tracing::debug!(?field, "field change ignored, form closed");
            return;
        }
        match field {
            SessionField::Title(v) => self.draft.title = v,
            SessionField::Description(v) => self.draft.description = v,
            SessionField::SessionLink(v) => self.draft.session_link = v,
            SessionField::Teacher(v) => self.draft.teacher = v,
            SessionField::StartFrom(v) => self.draft.start_from = v,
            SessionField::Duration(v) => self.draft.duration = v,
            SessionField::Status(v) => self.draft.status = v,
        }
    }

    /// Replace the student selection with exactly `ids` (duplicates dropped).
    pub fn students_changed<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        if !self.is_open() {
            return;
        }
        let mut students: Vec<String> = Vec::new();
        for id in ids {
            if !students.contains(&id) {
                students.push(id);
            }
        }
        self.draft.students = students;
    }

    /// Select a class. Returns the roster fetch to run, or `None` when the
    /// class was cleared (the roster is then emptied immediately).
    pub fn begin_class_change(&mut self, class_id: Option<String>) -> Option<RosterTicket> {
        if !self.is_open() {
            return None;
        }
        self.draft.class = class_id.filter(|c| filled(c));
        self.issue_ticket()
    }

    /// Apply the result of the fetch identified by `ticket`.
    pub fn finish_roster(
        &mut self,
        ticket: &RosterTicket,
        result: Result<Vec<Student>, ApiError>,
    ) -> RosterOutcome {
        if ticket.generation != self.generation || !self.is_open() {
            tracing::debug!(
                class_id = %ticket.class_id,
                generation = ticket.generation,
                current = self.generation,
                "dropping stale roster response"
            );
            return RosterOutcome::Stale;
        }

        match result {
            Ok(students) => {
                let pruned = match self.stale_selection {
                    StaleSelection::Keep => 0,
                    StaleSelection::Prune => {
                        let before = self.draft.students.len();
                        self.draft
                            .students
                            .retain(|id| students.iter().any(|s| &s.id == id));
                        before - self.draft.students.len()
                    }
                };
                let count = students.len();
                self.roster = students;
                self.roster_class = Some(ticket.class_id.clone());
                tracing::debug!(class_id = %ticket.class_id, students = count, pruned, "roster applied");
                RosterOutcome::Applied {
                    students: count,
                    pruned,
                }
            }
            Err(e) => {
                tracing::warn!(class_id = %ticket.class_id, error = %e, "roster fetch failed, keeping previous roster");
                self.last_error = Some(e.message().to_string());
                RosterOutcome::Failed(e)
            }
        }
    }

    /// Run the fetch for `ticket` against `source` and apply it.
    pub async fn fetch_roster<R>(&mut self, ticket: &RosterTicket, source: &R) -> RosterOutcome
    where
        R: RosterSource + ?Sized,
    {
        let result = source.resolve_roster(&ticket.class_id).await;
        self.finish_roster(ticket, result)
    }

    /// Select a class and resolve its roster in one step.
    pub async fn change_class<R>(&mut self, class_id: Option<String>, source: &R) -> Option<RosterOutcome>
    where
        R: RosterSource + ?Sized,
    {
        let ticket = self.begin_class_change(class_id)?;
        Some(self.fetch_roster(&ticket, source).await)
    }

    /// Validate and save the draft.
    ///
    /// On success the form closes and the saved session is returned; the
    /// caller is expected to reload its session list. On failure the form
    /// stays open with the draft intact.
    pub async fn submit<S>(&mut self, store: &S) -> Result<LiveSession, FormError>
    where
        S: SessionStore + ?Sized,
    {
        let editing = match &self.mode {
            FormMode::Closed => return Err(FormError::NotOpen),
            FormMode::Create => None,
            FormMode::Edit(session) => Some(session.id.clone()),
        };

        let payload = match self.draft.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let result = match editing.as_deref() {
            None => store.create_session(&payload).await,
            Some(id) => store.update_session(id, &payload).await,
        };

        match result {
            Ok(session) => {
                self.close();
                Ok(session)
            }
            Err(e) => {
                self.last_error = Some(e.message().to_string());
                Err(FormError::Api(e))
            }
        }
    }

    /// Close unconditionally, discarding the draft and roster.
    pub fn close(&mut self) {
        self.reset();
        self.mode = FormMode::Closed;
    }

    /// Same as [`close`](Self::close).
    pub fn cancel(&mut self) {
        self.close();
    }

    fn reset(&mut self) {
        self.draft = SessionDraft::default();
        self.roster.clear();
        self.roster_class = None;
        self.last_error = None;
        // Invalidate any fetch still in flight.
        self.generation += 1;
    }

    fn issue_ticket(&mut self) -> Option<RosterTicket> {
        self.generation += 1;
        match self.draft.class.clone() {
            Some(class_id) => Some(RosterTicket {
                generation: self.generation,
                class_id,
            }),
            None => {
                self.roster.clear();
                self.roster_class = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn student(id: &str) -> Student {
        Student {
            id: id.to_string(),
            name: format!("Student {id}"),
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn existing(status: SessionStatus) -> LiveSession {
        LiveSession {
            id: "L1".to_string(),
            title: "Algebra Review".to_string(),
            description: Some("Chapter 4".to_string()),
            session_link: "https://x.test/r1".to_string(),
            teacher: "T1".to_string(),
            class: "C1".to_string(),
            students: ids(&["S1", "S2"]),
            start_from: Utc::now(),
            duration: 45,
            status,
            created_at: Utc::now(),
        }
    }

    #[derive(Default)]
    struct FakeRoster {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl RosterSource for FakeRoster {
        async fn resolve_roster(&self, class_id: &str) -> crate::error::Result<Vec<Student>> {
            self.calls.lock().unwrap().push(class_id.to_string());
            if self.fail {
                return Err(ApiError::Transport("offline".to_string()));
            }
            Ok(match class_id {
                "C1" => vec![student("S1"), student("S2")],
                "C2" => vec![student("S3")],
                _ => Vec::new(),
            })
        }
    }

    #[derive(Default)]
    struct FakeStore {
        payloads: Mutex<Vec<(Option<String>, SessionPayload)>>,
        reject: Option<ApiError>,
    }

    impl FakeStore {
        fn saved(&self, id: &str, payload: &SessionPayload) -> LiveSession {
            LiveSession {
                id: id.to_string(),
                title: payload.title.clone(),
                description: payload.description.clone(),
                session_link: payload.session_link.clone(),
                teacher: payload.teacher.clone(),
                class: payload.class.clone(),
                students: payload.students.clone(),
                start_from: payload.start_from,
                duration: payload.duration,
                status: payload.status,
                created_at: Utc::now(),
            }
        }

        fn calls(&self) -> usize {
            self.payloads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SessionStore for FakeStore {
        async fn list_sessions(&self) -> crate::error::Result<Vec<LiveSession>> {
            Ok(Vec::new())
        }

        async fn get_session(&self, id: &str) -> crate::error::Result<LiveSession> {
            Err(ApiError::NotFound(format!("no session {id}")))
        }

        async fn create_session(&self, payload: &SessionPayload) -> crate::error::Result<LiveSession> {
            self.payloads.lock().unwrap().push((None, payload.clone()));
            match &self.reject {
                Some(e) => Err(e.clone()),
                None => Ok(self.saved("NEW", payload)),
            }
        }

        async fn update_session(
            &self,
            id: &str,
            payload: &SessionPayload,
        ) -> crate::error::Result<LiveSession> {
            self.payloads
                .lock()
                .unwrap()
                .push((Some(id.to_string()), payload.clone()));
            match &self.reject {
                Some(e) => Err(e.clone()),
                None => Ok(self.saved(id, payload)),
            }
        }

        async fn set_status(&self, id: &str, _status: SessionStatus) -> crate::error::Result<LiveSession> {
            Err(ApiError::NotFound(format!("no session {id}")))
        }

        async fn delete_session(&self, id: &str) -> crate::error::Result<()> {
            Err(ApiError::NotFound(format!("no session {id}")))
        }
    }

    async fn filled_create_form(roster: &FakeRoster) -> SessionFormController {
        let mut form = SessionFormController::new();
        form.open_for_create();
        form.field_changed(SessionField::Title("Algebra Review".to_string()));
        form.field_changed(SessionField::SessionLink("https://x.test/r1".to_string()));
        form.field_changed(SessionField::Teacher(Some("T1".to_string())));
        form.field_changed(SessionField::StartFrom(Some(Utc::now())));
        form.field_changed(SessionField::Duration(Some(45)));
        form.change_class(Some("C1".to_string()), roster).await;
        form.students_changed(ids(&["S1", "S2"]));
        form
    }

    #[test]
    fn test_open_for_create_defaults() {
        let mut form = SessionFormController::new();
        assert!(!form.is_open());
        form.open_for_create();

        assert_eq!(form.mode(), &FormMode::Create);
        assert_eq!(form.draft().duration, Some(60));
        assert_eq!(form.draft().status, SessionStatus::Scheduled);
        assert!(form.draft().students.is_empty());
    }

    #[test]
    fn test_open_for_edit_copies_session() {
        let session = existing(SessionStatus::Ongoing);
        let mut form = SessionFormController::new();
        let ticket = form.open_for_edit(&session).unwrap();

        assert_eq!(ticket.class_id, "C1");
        assert_eq!(form.draft().title, "Algebra Review");
        assert_eq!(form.draft().description, "Chapter 4");
        assert_eq!(form.draft().students, ids(&["S1", "S2"]));
        assert_eq!(form.draft().duration, Some(45));
        assert_eq!(form.draft().status, SessionStatus::Ongoing);
    }

    #[test]
    fn test_field_change_ignored_when_closed() {
        let mut form = SessionFormController::new();
        form.field_changed(SessionField::Title("x".to_string()));
        assert!(form.draft().title.is_empty());
    }

    #[test]
    fn test_students_changed_replaces_wholesale() {
        let mut form = SessionFormController::new();
        form.open_for_create();
        form.students_changed(ids(&["S1", "S2"]));
        form.students_changed(ids(&["S3", "S3", "S1"]));
        assert_eq!(form.draft().students, ids(&["S3", "S1"]));
    }

    #[tokio::test]
    async fn test_empty_students_rejected_without_request() {
        let roster = FakeRoster::default();
        let store = FakeStore::default();
        let mut form = filled_create_form(&roster).await;
        form.students_changed(Vec::new());

        let err = form.submit(&store).await.unwrap_err();
        assert_eq!(err, FormError::MissingFields(vec![RequiredField::Students]));
        assert_eq!(store.calls(), 0);
        assert!(form.is_open());
        assert!(form.last_error().is_some());
    }

    #[tokio::test]
    async fn test_submit_closed_form_is_error() {
        let store = FakeStore::default();
        let mut form = SessionFormController::new();
        assert_eq!(form.submit(&store).await.unwrap_err(), FormError::NotOpen);
    }

    #[tokio::test]
    async fn test_create_success_closes_and_clears() {
        let roster = FakeRoster::default();
        let store = FakeStore::default();
        let mut form = filled_create_form(&roster).await;

        let saved = form.submit(&store).await.unwrap();
        assert_eq!(saved.id, "NEW");
        assert_eq!(saved.duration, 45);
        assert_eq!(saved.students.len(), 2);
        assert_eq!(saved.status, SessionStatus::Scheduled);

        assert!(!form.is_open());
        assert_eq!(form.draft(), &SessionDraft::default());
        assert!(form.roster().is_empty());
    }

    #[tokio::test]
    async fn test_edit_of_ongoing_session_resets_status_to_scheduled() {
        let roster = FakeRoster::default();
        let store = FakeStore::default();
        let mut form = SessionFormController::new();
        let ticket = form.open_for_edit(&existing(SessionStatus::Ongoing)).unwrap();
        form.fetch_roster(&ticket, &roster).await;
        form.field_changed(SessionField::Title("Algebra Review II".to_string()));

        let saved = form.submit(&store).await.unwrap();

        let payloads = store.payloads.lock().unwrap();
        let (id, payload) = &payloads[0];
        assert_eq!(id.as_deref(), Some("L1"));
        assert_eq!(payload.status, SessionStatus::Scheduled);
        assert_eq!(saved.status, SessionStatus::Scheduled);
        assert_eq!(saved.title, "Algebra Review II");
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_form_open_with_draft() {
        let roster = FakeRoster::default();
        let store = FakeStore {
            reject: Some(ApiError::Validation("sessionLink is invalid".to_string())),
            ..FakeStore::default()
        };
        let mut form = filled_create_form(&roster).await;
        let draft_before = form.draft().clone();

        let err = form.submit(&store).await.unwrap_err();
        assert_eq!(err.to_string(), "sessionLink is invalid");
        assert!(form.is_open());
        assert_eq!(form.draft(), &draft_before);
        assert_eq!(form.last_error(), Some("sessionLink is invalid"));
    }

    #[tokio::test]
    async fn test_class_change_fetches_once_for_new_class() {
        let roster = FakeRoster::default();
        let mut form = SessionFormController::new();
        form.open_for_create();

        let outcome = form.change_class(Some("C2".to_string()), &roster).await;
        assert_eq!(
            outcome,
            Some(RosterOutcome::Applied {
                students: 1,
                pruned: 0
            })
        );
        assert_eq!(*roster.calls.lock().unwrap(), ids(&["C2"]));
        assert_eq!(form.roster(), &[student("S3")]);
    }

    #[tokio::test]
    async fn test_clearing_class_empties_roster_without_fetch() {
        let roster = FakeRoster::default();
        let mut form = SessionFormController::new();
        form.open_for_create();
        form.change_class(Some("C1".to_string()), &roster).await;

        assert!(form.change_class(None, &roster).await.is_none());
        assert!(form.roster().is_empty());
        assert_eq!(form.roster_class(), None);
        assert_eq!(form.draft().class, None);
        assert_eq!(roster.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stale_roster_response_dropped() {
        let mut form = SessionFormController::new();
        form.open_for_create();

        let first = form.begin_class_change(Some("C1".to_string())).unwrap();
        let second = form.begin_class_change(Some("C2".to_string())).unwrap();

        // The later selection answers first, then the slow earlier one arrives.
        let applied = form.finish_roster(&second, Ok(vec![student("S3")]));
        let stale = form.finish_roster(&first, Ok(vec![student("S1"), student("S2")]));

        assert!(matches!(applied, RosterOutcome::Applied { students: 1, .. }));
        assert_eq!(stale, RosterOutcome::Stale);
        assert_eq!(form.roster(), &[student("S3")]);
        assert_eq!(form.draft().class.as_deref(), Some("C2"));
    }

    #[test]
    fn test_roster_response_after_close_dropped() {
        let mut form = SessionFormController::new();
        form.open_for_create();
        let ticket = form.begin_class_change(Some("C1".to_string())).unwrap();
        form.close();

        assert_eq!(
            form.finish_roster(&ticket, Ok(vec![student("S1")])),
            RosterOutcome::Stale
        );
        assert!(form.roster().is_empty());
    }

    #[tokio::test]
    async fn test_roster_failure_keeps_last_good_roster() {
        let good = FakeRoster::default();
        let broken = FakeRoster {
            fail: true,
            ..FakeRoster::default()
        };
        let mut form = SessionFormController::new();
        form.open_for_create();
        form.change_class(Some("C1".to_string()), &good).await;

        let outcome = form.change_class(Some("C2".to_string()), &broken).await;

        assert!(matches!(outcome, Some(RosterOutcome::Failed(ApiError::Transport(_)))));
        assert_eq!(form.roster(), &[student("S1"), student("S2")]);
        assert_eq!(form.last_error(), Some("offline"));
    }

    #[tokio::test]
    async fn test_kept_roster_is_not_offered_for_new_class() {
        let good = FakeRoster::default();
        let broken = FakeRoster {
            fail: true,
            ..FakeRoster::default()
        };
        let mut form = SessionFormController::new();
        form.open_for_create();
        form.change_class(Some("C1".to_string()), &good).await;
        form.students_changed(ids(&["S1"]));
        assert_eq!(form.selected_roster(), Some(&[student("S1"), student("S2")][..]));

        form.change_class(Some("C2".to_string()), &broken).await;

        assert_eq!(form.draft().class.as_deref(), Some("C2"));
        assert_eq!(form.roster_class(), Some("C1"));
        assert_eq!(form.selected_roster(), None);
        assert_eq!(form.roster_for("C2"), None);
        assert_eq!(form.roster_for("C1").map(<[Student]>::len), Some(2));

        // A later successful fetch for C2 brings the two back in line.
        form.change_class(Some("C2".to_string()), &good).await;
        assert_eq!(form.roster_class(), Some("C2"));
        assert_eq!(form.selected_roster(), Some(&[student("S3")][..]));
    }

    #[tokio::test]
    async fn test_prune_drops_selections_outside_new_roster() {
        let roster = FakeRoster::default();
        let mut form = SessionFormController::new();
        form.open_for_create();
        form.change_class(Some("C1".to_string()), &roster).await;
        form.students_changed(ids(&["S1", "S2"]));

        let outcome = form.change_class(Some("C2".to_string()), &roster).await;

        assert_eq!(
            outcome,
            Some(RosterOutcome::Applied {
                students: 1,
                pruned: 2
            })
        );
        assert!(form.draft().students.is_empty());
    }

    #[tokio::test]
    async fn test_keep_policy_leaves_stale_selections() {
        let roster = FakeRoster::default();
        let mut form = SessionFormController::with_stale_selection(StaleSelection::Keep);
        form.open_for_create();
        form.change_class(Some("C1".to_string()), &roster).await;
        form.students_changed(ids(&["S1"]));

        form.change_class(Some("C2".to_string()), &roster).await;
        assert_eq!(form.draft().students, ids(&["S1"]));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut form = SessionFormController::new();
        form.open_for_create();
        form.field_changed(SessionField::Title("Draft".to_string()));
        form.cancel();

        assert!(!form.is_open());
        assert_eq!(form.draft(), &SessionDraft::default());
    }

    #[test]
    fn test_payload_trims_and_drops_blank_description() {
        let draft = SessionDraft {
            title: "  Algebra  ".to_string(),
            description: "   ".to_string(),
            session_link: "https://x.test/r1".to_string(),
            teacher: Some("T1".to_string()),
            class: Some("C1".to_string()),
            students: ids(&["S1"]),
            start_from: Some(Utc::now()),
            duration: Some(90),
            status: SessionStatus::Completed,
        };
        let payload = draft.to_payload().unwrap();
        assert_eq!(payload.title, "Algebra");
        assert_eq!(payload.description, None);
        assert_eq!(payload.status, SessionStatus::Scheduled);
    }

    #[test]
    fn test_missing_fields_in_form_order() {
        let draft = SessionDraft {
            duration: None,
            ..SessionDraft::default()
        };
        assert_eq!(
            draft.missing_fields(),
            vec![
                RequiredField::Title,
                RequiredField::SessionLink,
                RequiredField::Teacher,
                RequiredField::Class,
                RequiredField::Students,
                RequiredField::StartFrom,
                RequiredField::Duration,
            ]
        );
    }
}
