//! CLI command execution.
//!
//! This is a thin client - every operation goes through the library's
//! board, form controller and backend clients.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

use classhub::api::ApiClient;
use classhub::board::{LoadState, SessionBoard};
use classhub::config::Config;
use classhub::directory::{Directory, DirectoryClient};
use classhub::form::{RosterOutcome, SessionField, SessionFormController};
use classhub::models::{LiveSession, SessionStatus, StatusTab};
use classhub::repository::{SessionRepository, SessionStore};
use classhub::roster::{RosterResolver, RosterSource};
use classhub::server::{self, Seed};

use super::args::{Cli, Commands, SessionAction, SessionFields};

type Board = SessionBoard<SessionRepository, DirectoryClient>;

/// Backend clients built from one configuration.
struct Clients {
    config: Config,
    sessions: SessionRepository,
    directory: DirectoryClient,
    roster: RosterResolver,
}

impl Clients {
    fn new(config: Config) -> Self {
        let api = ApiClient::from_config(&config);
        Self {
            sessions: SessionRepository::new(api.clone()),
            directory: DirectoryClient::new(api.clone()),
            roster: RosterResolver::new(api),
            config,
        }
    }

    fn board(&self) -> Board {
        SessionBoard::new(
            self.sessions.clone(),
            self.directory.clone(),
            self.config.user_context(),
        )
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = &cli.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(user) = &cli.user {
        config.user_id = Some(user.clone());
    }
    if let Some(role) = &cli.role {
        config.role = Some(role.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs;
    }
    Ok(config)
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if let Commands::Serve { port, seed } = &cli.command {
        let seed = match seed {
            Some(path) => Seed::load(path)?,
            None => Seed::demo(),
        };
        return server::start_server(*port, seed).await;
    }

    config.check_viewer()?;
    tracing::debug!(base_url = %config.base_url, "using backend");
    let clients = Clients::new(config);

    match cli.command {
        Commands::Sessions { action } => match action {
            SessionAction::List { tab, search } => {
                list_sessions(&clients, tab.into(), search.as_deref()).await
            }
            SessionAction::Show { id } => show_session(&clients, &id).await,
            SessionAction::Create(fields) => create_session(&clients, &fields).await,
            SessionAction::Edit { id, fields } => edit_session(&clients, &id, &fields).await,
            SessionAction::Status { id, status } => {
                change_status(&clients, &id, status.into()).await
            }
            SessionAction::Delete { id, yes } => delete_session(&clients, &id, yes).await,
        },
        Commands::Teachers => list_teachers(&clients).await,
        Commands::Classes => list_classes(&clients).await,
        Commands::Roster { class_id } => show_roster(&clients, &class_id).await,
        Commands::Serve { .. } => Ok(()),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

async fn list_sessions(
    clients: &Clients,
    tab: StatusTab,
    search: Option<&str>,
) -> Result<()> {
    let mut board = clients.board();
    if let Err(e) = board.load().await {
        if let LoadState::Failed(banner) = board.state() {
            eprintln!("{banner}");
        }
        return Err(e).context("Could not load the session board");
    }

    board.set_tab(tab);
    if let Some(search) = search {
        board.set_search(search);
    }

    if board.search().is_empty() {
        println!("Tab: {}", board.tab());
    } else {
        println!("Tab: {}  |  Search: \"{}\"", board.tab(), board.search());
    }

    let c = board.counters();
    println!(
        "Total {}  |  Scheduled {}  Ongoing {}  Completed {}  Cancelled {}",
        c.total, c.scheduled, c.ongoing, c.completed, c.cancelled
    );
    println!();

    let visible = board.visible_sessions();
    if visible.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<28} {:<18} {:<14} {:<17} {:>5} {:<10}",
        "ID", "TITLE", "TEACHER", "CLASS", "START", "MIN", "STATUS"
    );
    println!("{}", "-".repeat(134));

    for session in visible {
        let teacher = board.teacher_name(&session.teacher).unwrap_or(&session.teacher);
        let class = board
            .class_label(&session.class)
            .unwrap_or_else(|| session.class.clone());
        println!(
            "{:<36} {:<28} {:<18} {:<14} {:<17} {:>5} {:<10}",
            session.id,
            truncate(&session.title, 26),
            truncate(teacher, 16),
            truncate(&class, 12),
            session.start_from.format("%Y-%m-%d %H:%M"),
            session.duration,
            session.status,
        );
    }

    Ok(())
}

async fn print_session(clients: &Clients, session: &LiveSession) {
    let teacher = match clients.directory.get_teacher(&session.teacher).await {
        Ok(t) => t.name,
        Err(_) => session.teacher.clone(),
    };
    let class = match clients.directory.get_class(&session.class).await {
        Ok(c) => c.label(),
        Err(_) => session.class.clone(),
    };

    println!("ID:          {}", session.id);
    println!("Title:       {}", session.title);
    if let Some(description) = &session.description {
        println!("Description: {description}");
    }
    println!("Link:        {}", session.session_link);
    println!("Teacher:     {teacher}");
    println!("Class:       {class}");
    println!("Students:    {}", session.students.join(", "));
    println!("Start:       {}", session.start_from.format("%Y-%m-%d %H:%M UTC"));
    println!("Duration:    {} min", session.duration);
    println!("Status:      {}", session.status);
    println!("Created:     {}", session.created_at.format("%Y-%m-%d %H:%M UTC"));
}

async fn show_session(clients: &Clients, id: &str) -> Result<()> {
    let session = clients.sessions.get_session(id).await?;
    print_session(clients, &session).await;
    Ok(())
}

/// Copy CLI flags into the form, resolving the roster if the class changes.
async fn apply_fields<R>(
    form: &mut SessionFormController,
    fields: &SessionFields,
    roster: &R,
) -> Result<()>
where
    R: RosterSource + ?Sized,
{
    if let Some(title) = &fields.title {
        form.field_changed(SessionField::Title(title.clone()));
    }
    if let Some(description) = &fields.description {
        form.field_changed(SessionField::Description(description.clone()));
    }
    if let Some(link) = &fields.link {
        form.field_changed(SessionField::SessionLink(link.clone()));
    }
    if let Some(teacher) = &fields.teacher {
        form.field_changed(SessionField::Teacher(Some(teacher.clone())));
    }
    if let Some(start) = fields.start {
        form.field_changed(SessionField::StartFrom(Some(start)));
    }
    if let Some(duration) = fields.duration {
        form.field_changed(SessionField::Duration(Some(duration)));
    }

    if let Some(class) = &fields.class {
        match form.change_class(Some(class.clone()), roster).await {
            Some(RosterOutcome::Failed(e)) => {
                eprintln!("Warning: could not load roster for class {class}: {e}");
            }
            Some(RosterOutcome::Applied { pruned, .. }) if pruned > 0 => {
                eprintln!("Note: removed {pruned} selected student(s) not in class {class}");
            }
            _ => {}
        }
    }

    if fields.all_students {
        let Some(roster) = form.selected_roster() else {
            bail!("--all-students needs the roster of the selected class, which could not be loaded");
        };
        let everyone: Vec<String> = roster.iter().map(|s| s.id.clone()).collect();
        if everyone.is_empty() {
            bail!("--all-students needs a class with enrolled students");
        }
        form.students_changed(everyone);
    } else if !fields.students.is_empty() {
        form.students_changed(fields.students.iter().cloned());
    }

    Ok(())
}

async fn create_session(clients: &Clients, fields: &SessionFields) -> Result<()> {
    let mut board = clients.board();
    let mut form = SessionFormController::new();
    form.open_for_create();
    apply_fields(&mut form, fields, &clients.roster).await?;

    let saved = board.save_form(&mut form).await?;
    println!("Created session {}", saved.id);
    println!();
    print_session(clients, &saved).await;
    Ok(())
}

async fn edit_session(clients: &Clients, id: &str, fields: &SessionFields) -> Result<()> {
    let existing = clients.sessions.get_session(id).await?;

    let mut board = clients.board();
    let mut form = SessionFormController::new();
    if let Some(ticket) = form.open_for_edit(&existing) {
        if let RosterOutcome::Failed(e) = form.fetch_roster(&ticket, &clients.roster).await {
            eprintln!("Warning: could not load roster for class {}: {e}", ticket.class_id);
        }
    }
    apply_fields(&mut form, fields, &clients.roster).await?;

    if existing.status != SessionStatus::Scheduled {
        eprintln!(
            "Note: saving the form resets status from '{}' to 'scheduled'. \
             Use `classhub sessions status {id} {}` afterwards to restore it.",
            existing.status, existing.status
        );
    }

    let saved = board.save_form(&mut form).await?;
    println!("Updated session {}", saved.id);
    println!();
    print_session(clients, &saved).await;
    Ok(())
}

async fn change_status(clients: &Clients, id: &str, status: SessionStatus) -> Result<()> {
    let mut board = clients.board();
    board.change_status(id, status).await?;

    match board.find(id) {
        Some(session) => println!("Session {} is now {}", session.id, session.status),
        None => println!("Session {id} set to {status}"),
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read confirmation")?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn delete_session(clients: &Clients, id: &str, yes: bool) -> Result<()> {
    let mut board = clients.board();
    board.request_delete(id);

    if !yes && !confirm(&format!("Delete session {id}?"))? {
        board.cancel_delete();
        println!("Cancelled.");
        return Ok(());
    }

    if let Some(deleted) = board.confirm_delete().await? {
        println!("Deleted session {deleted}");
    }
    Ok(())
}

async fn list_teachers(clients: &Clients) -> Result<()> {
    let teachers = clients.directory.list_teachers().await?;
    if teachers.is_empty() {
        println!("No teachers found.");
        return Ok(());
    }

    println!("{:<10} {:<24} {:<16} {:<10}", "ID", "NAME", "SUBJECT", "LEADS");
    println!("{}", "-".repeat(62));
    for t in teachers {
        println!(
            "{:<10} {:<24} {:<16} {:<10}",
            t.id,
            truncate(&t.name, 22),
            truncate(&t.subject, 14),
            t.class_teacher_of.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn list_classes(clients: &Clients) -> Result<()> {
    let classes = clients.directory.list_classes().await?;
    if classes.is_empty() {
        println!("No classes found.");
        return Ok(());
    }

    println!("{:<10} {:<20} {:<9} {}", "ID", "CLASS", "STUDENTS", "SUBJECTS");
    println!("{}", "-".repeat(70));
    for c in classes {
        println!(
            "{:<10} {:<20} {:<9} {}",
            c.id,
            truncate(&c.label(), 18),
            c.students.len(),
            c.subjects.join(", "),
        );
    }
    Ok(())
}

async fn show_roster(clients: &Clients, class_id: &str) -> Result<()> {
    let students = clients.roster.resolve_roster(class_id).await?;
    if students.is_empty() {
        println!("No students enrolled in class {class_id}.");
        return Ok(());
    }

    println!("{:<10} {}", "ID", "NAME");
    println!("{}", "-".repeat(40));
    for s in students {
        println!("{:<10} {}", s.id, s.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use classhub::error::ApiError;
    use classhub::models::Student;

    /// Knows only class C1; every other class fails to load.
    struct PartialRoster;

    #[async_trait]
    impl RosterSource for PartialRoster {
        async fn resolve_roster(&self, class_id: &str) -> classhub::error::Result<Vec<Student>> {
            match class_id {
                "C1" => Ok(vec![
                    Student {
                        id: "S1".to_string(),
                        name: "Priya Nair".to_string(),
                    },
                    Student {
                        id: "S2".to_string(),
                        name: "Mateo Alvarez".to_string(),
                    },
                ]),
                _ => Err(ApiError::Transport("offline".to_string())),
            }
        }
    }

    fn with_class(class: &str, all_students: bool) -> SessionFields {
        SessionFields {
            class: Some(class.to_string()),
            all_students,
            ..SessionFields::default()
        }
    }

    #[tokio::test]
    async fn test_all_students_uses_roster_of_selected_class() {
        let mut form = SessionFormController::new();
        form.open_for_create();
        apply_fields(&mut form, &with_class("C1", true), &PartialRoster)
            .await
            .unwrap();
        assert_eq!(form.draft().students, vec!["S1", "S2"]);
    }

    #[tokio::test]
    async fn test_all_students_refuses_roster_of_previous_class() {
        let mut form = SessionFormController::new();
        form.open_for_create();
        apply_fields(&mut form, &with_class("C1", false), &PartialRoster)
            .await
            .unwrap();

        let err = apply_fields(&mut form, &with_class("C2", true), &PartialRoster)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--all-students"));
        assert!(form.draft().students.is_empty());
        assert_eq!(form.draft().class.as_deref(), Some("C2"));
    }
}
