//! `reqwest` implementation of the endpoint traits.
//!
//! Thin HTTP wrapper around the hosted functions. Status handling and body
//! decoding live in the pure `decode`/`check` helpers for testability.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use super::api::{AuthApi, ChatApi, ContactsApi, Credentials, LikesApi, NewsApi};
use super::types::{
    ApiError, AuthAction, AuthRequest, AuthResponse, Contact, ContactCreated, ContactDraft, ContactList,
    EditMessage, ErrorBody, LikeAction, LikeCount, LikeStatus, LikeToggle, Message, MessageList, NewsCreated,
    NewsDraft, NewsItem, NewsList, SendMessage, SendResponse,
};
use crate::config::{Endpoints, Timeouts};

const USER_ID_HEADER: &str = "X-User-Id";
const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpBackend {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpBackend {
    /// Build a backend for the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS/HTTP client cannot be
    /// constructed.
    pub fn new(endpoints: Endpoints, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoints })
    }

    fn news_url(&self) -> Result<&str, ApiError> {
        self.endpoints
            .news
            .as_deref()
            .ok_or(ApiError::Unconfigured("CLASS5U_NEWS_URL"))
    }

    fn contacts_url(&self) -> Result<&str, ApiError> {
        self.endpoints
            .contacts
            .as_deref()
            .ok_or(ApiError::Unconfigured("CLASS5U_CONTACTS_URL"))
    }
}

async fn execute(request: RequestBuilder) -> Result<(u16, String), ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    Ok((status, text))
}

fn privileged(request: RequestBuilder, creds: &Credentials) -> RequestBuilder {
    let request = request.header(USER_ID_HEADER, creds.user_id.to_string());
    match &creds.admin_token {
        Some(token) => request.header(ADMIN_TOKEN_HEADER, token),
        None => request,
    }
}

// =============================================================================
// DECODING
// =============================================================================

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Map a non-2xx status to [`ApiError::Status`], pulling `error` out of the body.
fn check(status: u16, body: &str) -> Result<(), ApiError> {
    if is_success(status) {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_default();
    Err(ApiError::Status { status, message })
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    check(status, body)?;
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

// =============================================================================
// AUTH
// =============================================================================

#[async_trait]
impl AuthApi for HttpBackend {
    async fn authenticate(
        &self,
        action: AuthAction,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = AuthRequest { action, username, password };
        let (status, text) = execute(self.http.post(&self.endpoints.auth).json(&body)).await?;
        decode(status, &text)
    }
}

// =============================================================================
// CHAT
// =============================================================================

#[async_trait]
impl ChatApi for HttpBackend {
    async fn list_messages(&self) -> Result<Option<Vec<Message>>, ApiError> {
        let (status, text) = execute(self.http.get(&self.endpoints.chat)).await?;
        let list: MessageList = decode(status, &text)?;
        Ok(list.messages)
    }

    async fn send_message(&self, message: &SendMessage) -> Result<SendResponse, ApiError> {
        let (status, text) = execute(self.http.post(&self.endpoints.chat).json(message)).await?;
        decode(status, &text)
    }

    async fn edit_message(&self, edit: &EditMessage) -> Result<(), ApiError> {
        let (status, text) = execute(self.http.put(&self.endpoints.chat).json(edit)).await?;
        check(status, &text)
    }

    async fn delete_message(&self, message_id: i64, user_id: i64) -> Result<(), ApiError> {
        let request = self
            .http
            .delete(&self.endpoints.chat)
            .query(&[("messageId", message_id), ("userId", user_id)]);
        let (status, text) = execute(request).await?;
        check(status, &text)
    }
}

// =============================================================================
// LIKES
// =============================================================================

#[async_trait]
impl LikesApi for HttpBackend {
    async fn like_status(&self, subject: &str, user_id: Option<i64>) -> Result<LikeStatus, ApiError> {
        let mut request = self.http.get(&self.endpoints.likes).query(&[("subject", subject)]);
        if let Some(user_id) = user_id {
            request = request.query(&[("userId", user_id)]);
        }
        let (status, text) = execute(request).await?;
        decode(status, &text)
    }

    async fn toggle_like(&self, user_id: i64, subject: &str, action: LikeAction) -> Result<u32, ApiError> {
        let body = LikeToggle { user_id, subject, action };
        let (status, text) = execute(self.http.post(&self.endpoints.likes).json(&body)).await?;
        let count: LikeCount = decode(status, &text)?;
        Ok(count.likes)
    }
}

// =============================================================================
// NEWS
// =============================================================================

#[async_trait]
impl NewsApi for HttpBackend {
    async fn list_news(&self) -> Result<Vec<NewsItem>, ApiError> {
        let (status, text) = execute(self.http.get(self.news_url()?)).await?;
        let list: NewsList = decode(status, &text)?;
        Ok(list.news)
    }

    async fn create_news(&self, creds: &Credentials, draft: &NewsDraft) -> Result<NewsItem, ApiError> {
        let request = privileged(self.http.post(self.news_url()?), creds).json(draft);
        let (status, text) = execute(request).await?;
        let created: NewsCreated = decode(status, &text)?;
        Ok(created.news)
    }

    async fn update_news(&self, creds: &Credentials, draft: &NewsDraft) -> Result<(), ApiError> {
        let request = privileged(self.http.put(self.news_url()?), creds).json(draft);
        let (status, text) = execute(request).await?;
        check(status, &text)
    }

    async fn delete_news(&self, creds: &Credentials, id: i64) -> Result<(), ApiError> {
        let request = privileged(self.http.delete(self.news_url()?), creds).query(&[("id", id)]);
        let (status, text) = execute(request).await?;
        check(status, &text)
    }
}

// =============================================================================
// CONTACTS
// =============================================================================

#[async_trait]
impl ContactsApi for HttpBackend {
    async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let (status, text) = execute(self.http.get(self.contacts_url()?)).await?;
        let list: ContactList = decode(status, &text)?;
        Ok(list.contacts)
    }

    async fn create_contact(&self, creds: &Credentials, draft: &ContactDraft) -> Result<Contact, ApiError> {
        let request = privileged(self.http.post(self.contacts_url()?), creds).json(draft);
        let (status, text) = execute(request).await?;
        let created: ContactCreated = decode(status, &text)?;
        Ok(created.contact)
    }

    async fn update_contact(&self, creds: &Credentials, draft: &ContactDraft) -> Result<(), ApiError> {
        let request = privileged(self.http.put(self.contacts_url()?), creds).json(draft);
        let (status, text) = execute(request).await?;
        check(status, &text)
    }

    async fn delete_contact(&self, creds: &Credentials, id: i64) -> Result<(), ApiError> {
        let request = privileged(self.http.delete(self.contacts_url()?), creds).query(&[("id", id)]);
        let (status, text) = execute(request).await?;
        check(status, &text)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
