#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::sync::Arc;
use std::time::Duration;

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::net::api::ChatApi;
use crate::net::types::{EditMessage, Message, SendMessage};

pub const MAX_MESSAGE_CHARS: usize = 1000;
pub const ANONYMOUS_NAME: &str = "Аноним";

const SEND_FALLBACK: &str = "Ошибка отправки";
const SEND_OFFLINE: &str = "Ошибка подключения";
const EDIT_FAILED: &str = "Не удалось изменить сообщение";
const DELETE_FAILED: &str = "Не удалось удалить сообщение";
const TOO_LONG: &str = "Message too long (max 1000 characters)";

/// What the chat view renders.
///
/// Poll ticks and mutations both write here; last writer wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub error: Option<String>,
    pub loading: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollState {
    #[default]
    Idle,
    Polling,
}

/// The signed-in user as the chat sees them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub user_id: i64,
    pub username: String,
}

impl Author {
    /// Edit/delete controls exist only for messages this returns `true` for.
    #[must_use]
    pub fn owns(&self, message: &Message) -> bool {
        message.username == self.username
    }
}

/// How an outgoing message is presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SendStyle {
    pub anonymous: bool,
    pub as_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was sent.
    Skipped,
    Sent {
        /// The server flagged the sender as admin.
        admin_granted: bool,
        admin_token: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Message too long (max 1000 characters)")]
    TooLong,
    #[error("message {0} belongs to someone else")]
    NotOwner(i64),
    /// A request failed; carries the user-visible text also placed in the view.
    #[error("{0}")]
    Request(String),
}

// =============================================================================
// POLL HANDLE
// =============================================================================

/// Owns the recurring fetch task. Dropping it cancels the timer.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// CHAT ROOM
// =============================================================================

pub struct ChatRoom {
    api: Arc<dyn ChatApi>,
    view: Arc<watch::Sender<ChatView>>,
    interval: Duration,
    poll: Option<PollHandle>,
}

impl ChatRoom {
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(ChatView::default());
        Self { api, view: Arc::new(tx), interval, poll: None }
    }

    /// Receiver that wakes on every view change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChatView> {
        self.view.subscribe()
    }

    #[must_use]
    pub fn view(&self) -> ChatView {
        self.view.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> PollState {
        match &self.poll {
            Some(handle) if handle.is_running() => PollState::Polling,
            _ => PollState::Idle,
        }
    }

    /// Idle → Polling: fetch once now, then every interval.
    pub async fn enter(&mut self) {
        if self.state() == PollState::Polling {
            return;
        }
        self.refresh().await;
        self.poll = Some(spawn_poll(self.api.clone(), self.view.clone(), self.interval));
        debug!(interval = ?self.interval, "chat polling started");
    }

    /// Polling → Idle. Safe to call when already idle.
    pub fn leave(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.cancel();
            debug!("chat polling stopped");
        }
    }

    /// Fetch the list and replace the view's messages wholesale.
    ///
    /// Returns `false` when the fetch failed; the view keeps what it had.
    pub async fn refresh(&self) -> bool {
        fetch_into(self.api.as_ref(), &self.view).await
    }

    /// Post a message, then refetch once.
    ///
    /// # Errors
    ///
    /// [`ChatError::TooLong`] above the length limit (no request);
    /// [`ChatError::Request`] when the endpoint refuses or is unreachable.
    pub async fn send(&self, author: &Author, text: &str, style: SendStyle) -> Result<SendOutcome, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Skipped);
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            self.set_error(Some(TOO_LONG.to_owned()));
            return Err(ChatError::TooLong);
        }

        self.view.send_modify(|view| {
            view.error = None;
            view.loading = true;
        });

        let body = SendMessage {
            user_id: author.user_id,
            username: if style.anonymous { ANONYMOUS_NAME.to_owned() } else { author.username.clone() },
            message: text.to_owned(),
            is_admin: style.as_admin,
        };

        let result = self.api.send_message(&body).await;
        let outcome = match result {
            Ok(response) => {
                self.refresh().await;
                Ok(SendOutcome::Sent { admin_granted: response.admin, admin_token: response.admin_token })
            }
            Err(e) => {
                warn!(error = %e, user_id = author.user_id, "send failed");
                let message = e.user_message(SEND_FALLBACK, SEND_OFFLINE);
                self.set_error(Some(message.clone()));
                Err(ChatError::Request(message))
            }
        };

        self.view.send_modify(|view| view.loading = false);
        outcome
    }

    /// Replace the text of one of the author's messages, then refetch.
    ///
    /// Returns `Ok(false)` for blank text (nothing sent).
    ///
    /// # Errors
    ///
    /// [`ChatError::NotOwner`] without issuing a request when the message is
    /// someone else's; [`ChatError::Request`] when the endpoint refuses.
    pub async fn edit(&self, author: &Author, message: &Message, text: &str) -> Result<bool, ChatError> {
        if !author.owns(message) {
            return Err(ChatError::NotOwner(message.id));
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            self.set_error(Some(TOO_LONG.to_owned()));
            return Err(ChatError::TooLong);
        }

        let edit = EditMessage { message_id: message.id, user_id: author.user_id, message: text.to_owned() };
        match self.api.edit_message(&edit).await {
            Ok(()) => {
                self.refresh().await;
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, message_id = message.id, "edit failed");
                self.set_error(Some(EDIT_FAILED.to_owned()));
                Err(ChatError::Request(EDIT_FAILED.to_owned()))
            }
        }
    }

    /// Delete one of the author's messages, then refetch.
    ///
    /// # Errors
    ///
    /// Same as [`ChatRoom::edit`].
    pub async fn delete(&self, author: &Author, message: &Message) -> Result<(), ChatError> {
        if !author.owns(message) {
            return Err(ChatError::NotOwner(message.id));
        }
        match self.api.delete_message(message.id, author.user_id).await {
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, message_id = message.id, "delete failed");
                self.set_error(Some(DELETE_FAILED.to_owned()));
                Err(ChatError::Request(DELETE_FAILED.to_owned()))
            }
        }
    }

    fn set_error(&self, error: Option<String>) {
        self.view.send_modify(|view| view.error = error);
    }
}

impl Drop for ChatRoom {
    fn drop(&mut self) {
        self.leave();
    }
}

fn spawn_poll(api: Arc<dyn ChatApi>, view: Arc<watch::Sender<ChatView>>, interval: Duration) -> PollHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            fetch_into(api.as_ref(), &view).await;
        }
    });
    PollHandle { task }
}

async fn fetch_into(api: &dyn ChatApi, view: &watch::Sender<ChatView>) -> bool {
    match api.list_messages().await {
        Ok(Some(messages)) => {
            view.send_modify(|v| v.messages = messages);
            true
        }
        Ok(None) => true,
        Err(e) => {
            error!(error = %e, "failed to fetch messages");
            false
        }
    }
}

/// One difference between two successive message lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewChange<'a> {
    Added(&'a Message),
    Edited(&'a Message),
    Removed(i64),
}

/// What changed from `previous` to `current`, matched by message id.
///
/// Added and edited messages come in `current` order; removals follow.
#[must_use]
pub fn view_changes<'a>(previous: &[Message], current: &'a [Message]) -> Vec<ViewChange<'a>> {
    let mut changes: Vec<ViewChange<'a>> = current
        .iter()
        .filter_map(|message| match previous.iter().find(|p| p.id == message.id) {
            None => Some(ViewChange::Added(message)),
            Some(old) if old.message != message.message => Some(ViewChange::Edited(message)),
            Some(_) => None,
        })
        .collect();
    changes.extend(
        previous
            .iter()
            .filter(|old| !current.iter().any(|m| m.id == old.id))
            .map(|old| ViewChange::Removed(old.id)),
    );
    changes
}

// =============================================================================
// DISPLAY
// =============================================================================

/// Local `HH:MM` of a server timestamp. Unparseable input yields `None`.
///
/// Accepts ISO-8601 with or without fractional seconds and offset. Offset
/// timestamps are shifted into the local zone; naive ones are already local.
#[must_use]
pub fn format_time(created_at: &str) -> Option<String> {
    let local = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format_time_at(created_at, local)
}

/// [`format_time`] rendered for a fixed viewer offset.
#[must_use]
pub fn format_time_at(created_at: &str, local: UtcOffset) -> Option<String> {
    let trimmed = created_at.trim();
    let (hour, minute) = match OffsetDateTime::parse(trimmed, &time::format_description::well_known::Rfc3339) {
        Ok(dt) => {
            let dt = dt.to_offset(local);
            (dt.hour(), dt.minute())
        }
        Err(_) => {
            let base = trimmed.split('.').next().unwrap_or(trimmed);
            let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
            match PrimitiveDateTime::parse(base, format) {
                Ok(dt) => (dt.hour(), dt.minute()),
                Err(e) => {
                    debug!(error = %e, created_at, "unparseable timestamp");
                    return None;
                }
            }
        }
    };
    Some(format!("{hour:02}:{minute:02}"))
}
