//! Wire types shared by the remote endpoints.
//!
//! Field names follow the JSON the hosted functions speak (`camelCase`).
//! Missing optional fields default instead of failing the whole payload, so
//! an older server that omits `userId` or `isAdmin` still yields a list.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote endpoint calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    ///
    /// `message` is the server's `error` field when the body carried one.
    #[error("endpoint returned status {status}")]
    Status { status: u16, message: Option<String> },

    /// The response body could not be decoded.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// No URL is configured for the endpoint; names the env var to set.
    #[error("endpoint not configured: set {0}")]
    Unconfigured(&'static str),
}

impl ApiError {
    /// Server-supplied error text, if the endpoint sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Flatten into the single user-visible string for an operation.
    ///
    /// Server text wins; otherwise transport failures map to `offline` and
    /// everything else to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str, offline: &str) -> String {
        match self {
            Self::Status { message: Some(message), .. } => message.clone(),
            Self::Transport(_) | Self::HttpClientBuild(_) => offline.to_owned(),
            Self::Unconfigured(_) => self.to_string(),
            Self::Status { message: None, .. } | Self::Parse(_) => fallback.to_owned(),
        }
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// Which auth flow a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    Login,
    Register,
}

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub action: AuthAction,
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful auth response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub admin_token: Option<String>,
}

// =============================================================================
// CHAT
// =============================================================================

/// A chat message as listed by the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub username: String,
    pub message: String,
    pub created_at: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub user_id: i64,
    pub username: String,
    pub message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_admin: bool,
}

/// Response to a successful send.
///
/// `admin` is the server's promotion signal; `admin_token` is the
/// verifiable grant that accompanies it on servers that issue one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessage {
    pub message_id: i64,
    pub user_id: i64,
    pub message: String,
}

// =============================================================================
// LESSON LIKES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub has_liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle<'a> {
    pub user_id: i64,
    pub subject: &'a str,
    pub action: LikeAction,
}

#[derive(Debug, Deserialize)]
pub struct LikeCount {
    #[serde(default)]
    pub likes: u32,
}

// =============================================================================
// NEWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsList {
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
pub struct NewsCreated {
    pub news: NewsItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
}

// =============================================================================
// CONTACTS
// =============================================================================

/// Roles the contacts endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactRole {
    #[serde(rename = "ученик")]
    Student,
    #[serde(rename = "админ")]
    Admin,
    #[serde(rename = "учитель")]
    Teacher,
}

impl ContactRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "ученик",
            Self::Admin => "админ",
            Self::Teacher => "учитель",
        }
    }
}

impl std::str::FromStr for ContactRole {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "ученик" | "student" => Ok(Self::Student),
            "админ" | "admin" => Ok(Self::Admin),
            "учитель" | "teacher" => Ok(Self::Teacher),
            other => Err(format!("Role must be ученик, админ or учитель (got '{other}')")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub role: ContactRole,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactList {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
pub struct ContactCreated {
    pub contact: Contact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub role: ContactRole,
}

// =============================================================================
// ERROR BODY
// =============================================================================

/// The `{ "error": "..." }` body every endpoint uses for failures.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
