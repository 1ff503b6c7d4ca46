//! In-memory backend shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::net::api::{AuthApi, ChatApi, ContactsApi, Credentials, LikesApi, NewsApi};
use crate::net::types::{
    ApiError, AuthAction, AuthResponse, Contact, ContactDraft, EditMessage, LikeAction, LikeStatus, Message,
    NewsDraft, NewsItem, SendMessage, SendResponse,
};

pub(crate) const CREATED_AT: &str = "2025-10-28T08:30:00.123456";

#[derive(Default)]
pub(crate) struct FakeState {
    pub users: HashMap<String, (i64, String)>,
    pub admins: HashSet<String>,
    pub next_user_id: i64,
    pub messages: Vec<Message>,
    pub next_message_id: i64,
    pub list_calls: usize,
    pub send_calls: usize,
    pub edit_calls: usize,
    pub delete_calls: usize,
    pub auth_calls: usize,
    pub offline: bool,
    pub reject_next: Option<(u16, Option<String>)>,
    pub promote_on_send: Option<Option<String>>,
    pub likes: HashMap<String, HashSet<i64>>,
    pub news: Vec<NewsItem>,
    pub contacts: Vec<Contact>,
    pub last_credentials: Option<Credentials>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    inner: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        {
            let mut state = self.state();
            state.next_user_id += 1;
            let id = state.next_user_id;
            state.users.insert(username.to_owned(), (id, password.to_owned()));
        }
        self
    }

    /// Insert a message as if another client had posted it.
    pub fn push_message(&self, user_id: i64, username: &str, text: &str) -> i64 {
        let mut state = self.state();
        state.next_message_id += 1;
        let id = state.next_message_id;
        state.messages.push(Message {
            id,
            user_id,
            username: username.to_owned(),
            message: text.to_owned(),
            created_at: CREATED_AT.to_owned(),
            is_admin: false,
        });
        id
    }
}

fn gate(state: &mut FakeState) -> Result<(), ApiError> {
    if state.offline {
        return Err(ApiError::Transport("connection refused".to_owned()));
    }
    if let Some((status, message)) = state.reject_next.take() {
        return Err(ApiError::Status { status, message });
    }
    Ok(())
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn authenticate(
        &self,
        action: AuthAction,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let mut state = self.state();
        state.auth_calls += 1;
        gate(&mut state)?;
        let user_id = match action {
            AuthAction::Register => {
                if state.users.contains_key(username) {
                    return Err(ApiError::Status { status: 409, message: Some("Никнейм уже занят".to_owned()) });
                }
                state.next_user_id += 1;
                let id = state.next_user_id;
                state.users.insert(username.to_owned(), (id, password.to_owned()));
                id
            }
            AuthAction::Login => match state.users.get(username) {
                Some((id, stored)) if stored == password => *id,
                _ => {
                    return Err(ApiError::Status {
                        status: 401,
                        message: Some("Неверный никнейм или пароль".to_owned()),
                    });
                }
            },
        };
        Ok(AuthResponse {
            success: true,
            user_id,
            username: username.to_owned(),
            is_admin: state.admins.contains(username),
            admin_token: None,
        })
    }
}

#[async_trait]
impl ChatApi for FakeBackend {
    async fn list_messages(&self) -> Result<Option<Vec<Message>>, ApiError> {
        let mut state = self.state();
        state.list_calls += 1;
        gate(&mut state)?;
        Ok(Some(state.messages.clone()))
    }

    async fn send_message(&self, message: &SendMessage) -> Result<SendResponse, ApiError> {
        let mut state = self.state();
        state.send_calls += 1;
        gate(&mut state)?;
        state.next_message_id += 1;
        let id = state.next_message_id;
        state.messages.push(Message {
            id,
            user_id: message.user_id,
            username: message.username.clone(),
            message: message.message.clone(),
            created_at: CREATED_AT.to_owned(),
            is_admin: message.is_admin,
        });
        let (admin, admin_token) = match state.promote_on_send.take() {
            Some(token) => (true, token),
            None => (false, None),
        };
        Ok(SendResponse { success: true, admin, admin_token })
    }

    async fn edit_message(&self, edit: &EditMessage) -> Result<(), ApiError> {
        let mut state = self.state();
        state.edit_calls += 1;
        gate(&mut state)?;
        let Some(target) = state
            .messages
            .iter_mut()
            .find(|m| m.id == edit.message_id && m.user_id == edit.user_id)
        else {
            return Err(ApiError::Status { status: 403, message: Some("Forbidden".to_owned()) });
        };
        target.message.clone_from(&edit.message);
        Ok(())
    }

    async fn delete_message(&self, message_id: i64, user_id: i64) -> Result<(), ApiError> {
        let mut state = self.state();
        state.delete_calls += 1;
        gate(&mut state)?;
        let before = state.messages.len();
        state.messages.retain(|m| !(m.id == message_id && m.user_id == user_id));
        if state.messages.len() == before {
            return Err(ApiError::Status { status: 403, message: Some("Forbidden".to_owned()) });
        }
        Ok(())
    }
}

#[async_trait]
impl LikesApi for FakeBackend {
    async fn like_status(&self, subject: &str, user_id: Option<i64>) -> Result<LikeStatus, ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        let likers = state.likes.get(subject);
        let likes = likers.map_or(0, |set| u32::try_from(set.len()).unwrap_or(u32::MAX));
        let has_liked = matches!((likers, user_id), (Some(set), Some(id)) if set.contains(&id));
        Ok(LikeStatus { likes, has_liked })
    }

    async fn toggle_like(&self, user_id: i64, subject: &str, action: LikeAction) -> Result<u32, ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        let set = state.likes.entry(subject.to_owned()).or_default();
        match action {
            LikeAction::Like => set.insert(user_id),
            LikeAction::Unlike => set.remove(&user_id),
        };
        Ok(u32::try_from(set.len()).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl NewsApi for FakeBackend {
    async fn list_news(&self) -> Result<Vec<NewsItem>, ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        Ok(state.news.clone())
    }

    async fn create_news(&self, creds: &Credentials, draft: &NewsDraft) -> Result<NewsItem, ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        state.last_credentials = Some(creds.clone());
        let id = i64::try_from(state.news.len()).unwrap_or(0) + 1;
        let item = NewsItem {
            id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: CREATED_AT.to_owned(),
            updated_at: Some(CREATED_AT.to_owned()),
        };
        state.news.insert(0, item.clone());
        Ok(item)
    }

    async fn update_news(&self, creds: &Credentials, draft: &NewsDraft) -> Result<(), ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        state.last_credentials = Some(creds.clone());
        if let Some(item) = state.news.iter_mut().find(|n| Some(n.id) == draft.id) {
            item.title.clone_from(&draft.title);
            item.content.clone_from(&draft.content);
        }
        Ok(())
    }

    async fn delete_news(&self, creds: &Credentials, id: i64) -> Result<(), ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        state.last_credentials = Some(creds.clone());
        state.news.retain(|n| n.id != id);
        Ok(())
    }
}

#[async_trait]
impl ContactsApi for FakeBackend {
    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        Ok(state.contacts.clone())
    }

    async fn create_contact(&self, creds: &Credentials, draft: &ContactDraft) -> Result<Contact, ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        state.last_credentials = Some(creds.clone());
        let id = i64::try_from(state.contacts.len()).unwrap_or(0) + 1;
        let contact = Contact {
            id,
            name: draft.name.clone(),
            phone: draft.phone.clone(),
            role: draft.role,
            created_at: Some(CREATED_AT.to_owned()),
        };
        state.contacts.insert(0, contact.clone());
        Ok(contact)
    }

    async fn update_contact(&self, creds: &Credentials, draft: &ContactDraft) -> Result<(), ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        state.last_credentials = Some(creds.clone());
        if let Some(contact) = state.contacts.iter_mut().find(|c| Some(c.id) == draft.id) {
            contact.name.clone_from(&draft.name);
            contact.phone.clone_from(&draft.phone);
            contact.role = draft.role;
        }
        Ok(())
    }

    async fn delete_contact(&self, creds: &Credentials, id: i64) -> Result<(), ApiError> {
        let mut state = self.state();
        gate(&mut state)?;
        state.last_credentials = Some(creds.clone());
        state.contacts.retain(|c| c.id != id);
        Ok(())
    }
}
