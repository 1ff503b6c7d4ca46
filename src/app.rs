//! Host object wiring session, chat, admin mode, and schedule together.
//!
//! DESIGN
//! ======
//! `App` is the only owner of the [`Session`]; children get what they need
//! by value or by reference per call. Admin mode and console history live
//! for the lifetime of the `App` and are never persisted. Console input is
//! interpreted here: admin toggles first, then host commands.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::net::api::{AuthApi, ChatApi, ContactsApi, Credentials, LikesApi, NewsApi};
use crate::net::http::HttpBackend;
use crate::net::types::{ApiError, Contact, Message, NewsItem};
use crate::state::admin::{
    AdminCommand, AdminConsole, AdminGrant, AdminLevel, AdminMode, GrantError, HELP_LINES, validate_grant,
};
use crate::state::chat::{Author, ChatError, ChatRoom, SendOutcome, SendStyle};
use crate::state::directory::{ContactError, contact_draft};
use crate::state::likes::LessonLikes;
use crate::state::news::{NewsError, news_draft};
use crate::state::schedule::{Lesson, LessonStatus, Schedule, ScheduleError, SchoolDay, minute_of_day_now};
use crate::state::session::{Session, SessionError, SessionManager};
use crate::state::storage::SessionStore;

const REQUEST_FALLBACK: &str = "Ошибка при выполнении запроса";
const REQUEST_OFFLINE: &str = "Ошибка подключения к серверу";
const ACCESS_DENIED: &str = "Access denied: admin rights required";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not signed in; run `class5u login` first")]
    SignedOut,
    #[error("access denied: admin rights required")]
    AccessDenied,
    #[error("lesson edit mode is off; run /adminLesson true in the console")]
    LessonEditOff,
    #[error("no message with id {0}")]
    UnknownMessage(i64),
    #[error("{day} has no lesson #{number}")]
    UnknownLesson { day: SchoolDay, number: u8 },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Grant(#[from] GrantError),
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error(transparent)]
    News(#[from] NewsError),
    #[error("{}", .0.user_message(REQUEST_FALLBACK, REQUEST_OFFLINE))]
    Api(#[from] ApiError),
}

// =============================================================================
// BACKENDS
// =============================================================================

/// One handle per endpoint trait.
#[derive(Clone)]
pub struct Backends {
    pub auth: Arc<dyn AuthApi>,
    pub chat: Arc<dyn ChatApi>,
    pub likes: Arc<dyn LikesApi>,
    pub news: Arc<dyn NewsApi>,
    pub contacts: Arc<dyn ContactsApi>,
}

impl Backends {
    /// Every endpoint served by one object.
    pub fn shared<B>(backend: Arc<B>) -> Self
    where
        B: AuthApi + ChatApi + LikesApi + NewsApi + ContactsApi + 'static,
    {
        Self {
            auth: backend.clone(),
            chat: backend.clone(),
            likes: backend.clone(),
            news: backend.clone(),
            contacts: backend,
        }
    }

    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn http(config: &ClientConfig) -> Result<Self, ApiError> {
        let backend = HttpBackend::new(config.endpoints.clone(), config.timeouts)?;
        Ok(Self::shared(Arc::new(backend)))
    }
}

// =============================================================================
// APP
// =============================================================================

pub struct App {
    config: ClientConfig,
    backends: Backends,
    session: SessionManager,
    chat: ChatRoom,
    admin: AdminMode,
    console: AdminConsole,
    schedule: Schedule,
}

impl App {
    pub fn new(config: ClientConfig, backends: Backends, store: Arc<dyn SessionStore>) -> Self {
        let session = SessionManager::restore(backends.auth.clone(), store);
        let chat = ChatRoom::new(backends.chat.clone(), config.poll_interval);
        Self {
            config,
            backends,
            session,
            chat,
            admin: AdminMode::default(),
            console: AdminConsole::new(),
            schedule: Schedule::weekly(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.session.session()
    }

    #[must_use]
    pub fn chat(&self) -> &ChatRoom {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatRoom {
        &mut self.chat
    }

    #[must_use]
    pub fn admin_mode(&self) -> AdminMode {
        self.admin
    }

    #[must_use]
    pub fn console(&self) -> &AdminConsole {
        &self.console
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    // ---------------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------------

    /// Admin mode resets only once the new session is established.
    ///
    /// # Errors
    ///
    /// [`AppError::Session`] with the user-visible reason.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, AppError> {
        let session = self.session.login(username, password).await?;
        self.admin = AdminMode::default();
        Ok(session)
    }

    /// # Errors
    ///
    /// [`AppError::Session`] with the user-visible reason.
    pub async fn register(&mut self, username: &str, password: &str) -> Result<Session, AppError> {
        let session = self.session.register(username, password).await?;
        self.admin = AdminMode::default();
        Ok(session)
    }

    /// Clear the session, stop polling, and drop any admin mode.
    pub fn logout(&mut self) {
        self.chat.leave();
        self.admin = AdminMode::default();
        self.session.logout();
    }

    fn author(&self) -> Result<Author, AppError> {
        let (user_id, username) = self.session().identity().ok_or(AppError::SignedOut)?;
        Ok(Author { user_id, username: username.to_owned() })
    }

    fn admin_credentials(&self) -> Result<Credentials, AppError> {
        if !self.session().is_authenticated() {
            return Err(AppError::SignedOut);
        }
        self.session().admin_credentials().ok_or(AppError::AccessDenied)
    }

    // ---------------------------------------------------------------------
    // Chat
    // ---------------------------------------------------------------------

    /// Send as the current user, styled by the admin mode when the session
    /// is an admin.
    ///
    /// # Errors
    ///
    /// [`AppError::SignedOut`] without a session; [`AppError::Chat`] when
    /// the message is rejected.
    pub async fn send_message(&mut self, text: &str) -> Result<SendOutcome, AppError> {
        let author = self.author()?;
        let is_admin = self.session().is_admin;
        let style = SendStyle {
            anonymous: is_admin && self.admin.anonymous,
            as_admin: is_admin && self.admin.chat_admin,
        };
        let outcome = self.chat.send(&author, text, style).await?;
        if let SendOutcome::Sent { admin_granted: true, admin_token } = &outcome {
            self.session.grant_admin(admin_token.clone());
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// [`AppError::UnknownMessage`] when the id is not in the list;
    /// [`AppError::Chat`] for someone else's message or a refused request.
    pub async fn edit_message(&self, message_id: i64, text: &str) -> Result<bool, AppError> {
        let author = self.author()?;
        let message = self.find_message(message_id).await?;
        Ok(self.chat.edit(&author, &message, text).await?)
    }

    /// # Errors
    ///
    /// Same as [`App::edit_message`].
    pub async fn delete_message(&self, message_id: i64) -> Result<(), AppError> {
        let author = self.author()?;
        let message = self.find_message(message_id).await?;
        Ok(self.chat.delete(&author, &message).await?)
    }

    async fn find_message(&self, message_id: i64) -> Result<Message, AppError> {
        let lookup = |chat: &ChatRoom| chat.view().messages.into_iter().find(|m| m.id == message_id);
        if let Some(message) = lookup(&self.chat) {
            return Ok(message);
        }
        self.chat.refresh().await;
        lookup(&self.chat).ok_or(AppError::UnknownMessage(message_id))
    }

    // ---------------------------------------------------------------------
    // Admin
    // ---------------------------------------------------------------------

    /// Apply an admin toggle for the current session.
    ///
    /// # Errors
    ///
    /// [`AppError::AccessDenied`] unless the session is an admin.
    pub fn apply_admin_command(&mut self, command: AdminCommand) -> Result<String, AppError> {
        if !self.session().is_admin {
            return Err(AppError::AccessDenied);
        }
        let reply = self.admin.apply(command);
        info!(?command, "admin mode changed");
        Ok(reply)
    }

    /// Feed one console line through the console and interpret it.
    ///
    /// Returns `false` for blank input.
    pub async fn console_input(&mut self, input: &str) -> bool {
        let mut submitted = None;
        if !self.console.submit(input, |line| submitted = Some(line.to_owned())) {
            return false;
        }
        if let Some(line) = submitted {
            for reply in self.interpret(&line).await {
                self.console.push_output(reply);
            }
        }
        true
    }

    async fn interpret(&mut self, line: &str) -> Vec<String> {
        if !self.session().is_admin {
            return vec![ACCESS_DENIED.to_owned()];
        }
        if let Some(command) = AdminCommand::parse(line) {
            return match self.apply_admin_command(command) {
                Ok(reply) => vec![reply],
                Err(e) => vec![e.to_string()],
            };
        }

        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match word {
            "help" => HELP_LINES.iter().map(|l| (*l).to_owned()).collect(),
            "schedule" => self.console_schedule(rest),
            "lesson" => self.console_lesson(rest),
            "say" => match self.send_message(rest).await {
                Ok(SendOutcome::Skipped) => vec!["Nothing to send".to_owned()],
                Ok(SendOutcome::Sent { .. }) => vec!["Sent".to_owned()],
                Err(e) => vec![e.to_string()],
            },
            _ => vec![format!("Unknown command: {line}")],
        }
    }

    fn console_schedule(&self, rest: &str) -> Vec<String> {
        let day = if rest.trim().is_empty() {
            SchoolDay::today().unwrap_or(SchoolDay::Monday)
        } else {
            match rest.parse::<SchoolDay>() {
                Ok(day) => day,
                Err(e) => return vec![e],
            }
        };
        let mut lines = vec![day.name().to_owned()];
        lines.extend(self.schedule.lessons(day).iter().map(format_lesson));
        lines
    }

    /// `lesson <day> <number> <start> <end> <subject...>`
    fn console_lesson(&mut self, rest: &str) -> Vec<String> {
        let mut parts = rest.split_whitespace();
        let (Some(day), Some(number), Some(start), Some(end)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return vec!["Usage: lesson <day> <number> <HH:MM> <HH:MM> <subject>".to_owned()];
        };
        let subject = parts.collect::<Vec<_>>().join(" ");
        let parsed = day.parse::<SchoolDay>().and_then(|day| {
            number
                .parse::<u8>()
                .map(|number| (day, number))
                .map_err(|e| format!("invalid lesson number '{number}': {e}"))
        });
        let (day, number) = match parsed {
            Ok(pair) => pair,
            Err(e) => return vec![e],
        };
        match self.edit_lesson(day, number, &subject, start, end) {
            Ok(lesson) => vec![format!("Updated {day}: {}", format_lesson(&lesson))],
            Err(e) => vec![e.to_string()],
        }
    }

    /// Grant admin rights to another user.
    ///
    /// The grant itself is delivered by the caller; this only validates.
    ///
    /// # Errors
    ///
    /// [`AppError::AccessDenied`] for non-admins; [`AppError::Grant`] for a
    /// bad form.
    pub fn grant_admin(&self, target: &str, level: AdminLevel, code: Option<&str>) -> Result<AdminGrant, AppError> {
        self.admin_credentials()?;
        let grant = validate_grant(level, target, code, self.config.senior_admin_code.as_deref())?;
        info!(grantee = %grant.target, level = grant.level, "admin grant issued");
        Ok(grant)
    }

    // ---------------------------------------------------------------------
    // Schedule
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// [`AppError::UnknownLesson`] when the day has no such lesson.
    pub fn lesson(&self, day: SchoolDay, number: u8) -> Result<&Lesson, AppError> {
        self.schedule.lesson(day, number).ok_or(AppError::UnknownLesson { day, number })
    }

    /// Lesson with its status at the current local time.
    ///
    /// # Errors
    ///
    /// Same as [`App::lesson`].
    pub fn lesson_status(&self, day: SchoolDay, number: u8) -> Result<(&Lesson, LessonStatus), AppError> {
        let lesson = self.lesson(day, number)?;
        Ok((lesson, lesson.status_at(minute_of_day_now())))
    }

    /// # Errors
    ///
    /// [`AppError::AccessDenied`] for non-admins, [`AppError::LessonEditOff`]
    /// outside lesson edit mode, [`AppError::Schedule`] for bad input.
    pub fn edit_lesson(
        &mut self,
        day: SchoolDay,
        number: u8,
        subject: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Lesson, AppError> {
        if !self.session().is_admin {
            return Err(AppError::AccessDenied);
        }
        if !self.admin.lesson_edit {
            return Err(AppError::LessonEditOff);
        }
        let lesson = self.schedule.update_lesson(day, number, subject, start_time, end_time)?.clone();
        info!(%day, number, subject = %lesson.subject, "lesson updated");
        Ok(lesson)
    }

    pub async fn lesson_likes(&self, subject: &str) -> LessonLikes {
        LessonLikes::load(self.backends.likes.as_ref(), subject, self.session().user_id).await
    }

    /// Flip the current user's like on `subject`.
    ///
    /// # Errors
    ///
    /// [`AppError::SignedOut`] without a session.
    pub async fn toggle_like(&self, subject: &str) -> Result<LessonLikes, AppError> {
        let user_id = self.session().user_id.ok_or(AppError::SignedOut)?;
        let mut likes = self.lesson_likes(subject).await;
        likes.toggle(self.backends.likes.as_ref(), Some(user_id)).await;
        Ok(likes)
    }

    // ---------------------------------------------------------------------
    // News & contacts
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// [`AppError::Api`] when the feed cannot be fetched.
    pub async fn list_news(&self) -> Result<Vec<NewsItem>, AppError> {
        Ok(self.backends.news.list_news().await?)
    }

    /// # Errors
    ///
    /// Admin-only; see [`AppError`].
    pub async fn create_news(&self, title: &str, content: &str) -> Result<NewsItem, AppError> {
        let creds = self.admin_credentials()?;
        let draft = news_draft(None, title, content)?;
        Ok(self.backends.news.create_news(&creds, &draft).await?)
    }

    /// # Errors
    ///
    /// Admin-only; see [`AppError`].
    pub async fn update_news(&self, id: i64, title: &str, content: &str) -> Result<(), AppError> {
        let creds = self.admin_credentials()?;
        let draft = news_draft(Some(id), title, content)?;
        Ok(self.backends.news.update_news(&creds, &draft).await?)
    }

    /// # Errors
    ///
    /// Admin-only; see [`AppError`].
    pub async fn delete_news(&self, id: i64) -> Result<(), AppError> {
        let creds = self.admin_credentials()?;
        Ok(self.backends.news.delete_news(&creds, id).await?)
    }

    /// # Errors
    ///
    /// [`AppError::Api`] when the list cannot be fetched.
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, AppError> {
        Ok(self.backends.contacts.list_contacts().await?)
    }

    /// # Errors
    ///
    /// Admin-only; see [`AppError`].
    pub async fn create_contact(&self, name: &str, phone: &str, role: &str) -> Result<Contact, AppError> {
        let creds = self.admin_credentials()?;
        let draft = contact_draft(None, name, phone, role)?;
        Ok(self.backends.contacts.create_contact(&creds, &draft).await?)
    }

    /// # Errors
    ///
    /// Admin-only; see [`AppError`].
    pub async fn update_contact(&self, id: i64, name: &str, phone: &str, role: &str) -> Result<(), AppError> {
        let creds = self.admin_credentials()?;
        let draft = contact_draft(Some(id), name, phone, role)?;
        Ok(self.backends.contacts.update_contact(&creds, &draft).await?)
    }

    /// # Errors
    ///
    /// Admin-only; see [`AppError`].
    pub async fn delete_contact(&self, id: i64) -> Result<(), AppError> {
        let creds = self.admin_credentials()?;
        Ok(self.backends.contacts.delete_contact(&creds, id).await?)
    }
}

/// `#1 08:30–09:15 Математика (каб. 204)`
#[must_use]
pub fn format_lesson(lesson: &Lesson) -> String {
    format!(
        "#{} {}–{} {} (каб. {})",
        lesson.number,
        lesson.start_time,
        lesson.end_time,
        lesson.subject,
        lesson.classroom()
    )
}
