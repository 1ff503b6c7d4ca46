//! Endpoint traits.
//!
//! DESIGN
//! ======
//! One trait per hosted function. `HttpBackend` implements all of them over
//! `reqwest`; tests implement them in memory. Callers hold `Arc<dyn ...>` so
//! the chat poll task can share the backend with foreground mutations.

use async_trait::async_trait;

use super::types::{
    ApiError, AuthAction, AuthResponse, Contact, ContactDraft, EditMessage, LikeAction, LikeStatus, Message,
    NewsDraft, NewsItem, SendMessage, SendResponse,
};

/// Identity attached to privileged (admin-only) requests.
///
/// The server is expected to verify `admin_token` on every call; the client
/// only forwards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: i64,
    pub admin_token: Option<String>,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Run a login or registration against the auth endpoint.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or an
    /// undecodable body.
    async fn authenticate(&self, action: AuthAction, username: &str, password: &str)
    -> Result<AuthResponse, ApiError>;
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Fetch the full message list in server order.
    ///
    /// `Ok(None)` means the body had no `messages` field; callers keep their
    /// current view in that case.
    async fn list_messages(&self) -> Result<Option<Vec<Message>>, ApiError>;

    async fn send_message(&self, message: &SendMessage) -> Result<SendResponse, ApiError>;

    async fn edit_message(&self, edit: &EditMessage) -> Result<(), ApiError>;

    async fn delete_message(&self, message_id: i64, user_id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait LikesApi: Send + Sync {
    async fn like_status(&self, subject: &str, user_id: Option<i64>) -> Result<LikeStatus, ApiError>;

    /// Apply a like/unlike and return the new total for the subject.
    async fn toggle_like(&self, user_id: i64, subject: &str, action: LikeAction) -> Result<u32, ApiError>;
}

#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn list_news(&self) -> Result<Vec<NewsItem>, ApiError>;

    async fn create_news(&self, creds: &Credentials, draft: &NewsDraft) -> Result<NewsItem, ApiError>;

    async fn update_news(&self, creds: &Credentials, draft: &NewsDraft) -> Result<(), ApiError>;

    async fn delete_news(&self, creds: &Credentials, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ContactsApi: Send + Sync {
    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError>;

    async fn create_contact(&self, creds: &Credentials, draft: &ContactDraft) -> Result<Contact, ApiError>;

    async fn update_contact(&self, creds: &Credentials, draft: &ContactDraft) -> Result<(), ApiError>;

    async fn delete_contact(&self, creds: &Credentials, id: i64) -> Result<(), ApiError>;
}
