#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::storage::SessionStore;
use crate::net::api::{AuthApi, Credentials};
use crate::net::types::{AuthAction, AuthResponse};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;

const AUTH_FALLBACK: &str = "Ошибка при выполнении запроса";
const AUTH_OFFLINE: &str = "Ошибка подключения к серверу";

/// Client-held identity and role for the current user.
///
/// Serialized form is the durable key-value document, so field names are
/// the storage keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.username.is_some()
    }

    /// `(userId, username)` when authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<(i64, &str)> {
        match (self.user_id, self.username.as_deref()) {
            (Some(id), Some(name)) => Some((id, name)),
            _ => None,
        }
    }

    /// Credentials for privileged requests; only admins get them.
    #[must_use]
    pub fn admin_credentials(&self) -> Option<Credentials> {
        if !self.is_admin {
            return None;
        }
        self.user_id.map(|user_id| Credentials { user_id, admin_token: self.admin_token.clone() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The form input failed the client-side checks; no request was sent.
    #[error("{0}")]
    Invalid(String),
    /// The auth endpoint refused or could not be reached.
    #[error("{0}")]
    Rejected(String),
}

/// Owns the session and keeps the durable store in step with it.
pub struct SessionManager {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    session: Session,
}

impl SessionManager {
    /// Initialize from durable storage. An unreadable store starts signed out.
    pub fn restore(auth: Arc<dyn AuthApi>, store: Arc<dyn SessionStore>) -> Self {
        let session = match store.load() {
            Ok(Some(session)) => session,
            Ok(None) => Session::default(),
            Err(e) => {
                warn!(error = %e, "stored session unreadable; starting signed out");
                Session::default()
            }
        };
        Self { auth, store, session }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// # Errors
    ///
    /// [`SessionError::Invalid`] for bad input, [`SessionError::Rejected`]
    /// with the endpoint's message otherwise.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, SessionError> {
        self.authenticate(AuthAction::Login, username, password).await
    }

    /// # Errors
    ///
    /// Same as [`SessionManager::login`].
    pub async fn register(&mut self, username: &str, password: &str) -> Result<Session, SessionError> {
        self.authenticate(AuthAction::Register, username, password).await
    }

    pub fn logout(&mut self) {
        if let Some(user_id) = self.session.user_id {
            info!(%user_id, "logged out");
        }
        self.session = Session::default();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored session");
        }
    }

    /// Record a server-signalled admin promotion and persist it.
    pub fn grant_admin(&mut self, admin_token: Option<String>) {
        if !self.session.is_authenticated() {
            return;
        }
        self.session.is_admin = true;
        if admin_token.is_some() {
            self.session.admin_token = admin_token;
        }
        info!(user_id = ?self.session.user_id, "admin status granted");
        self.persist();
    }

    async fn authenticate(
        &mut self,
        action: AuthAction,
        username: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let username = validate_credentials(username, password)?;

        let response = self
            .auth
            .authenticate(action, username, password)
            .await
            .map_err(|e| {
                warn!(error = %e, ?action, "auth request failed");
                SessionError::Rejected(e.user_message(AUTH_FALLBACK, AUTH_OFFLINE))
            })?;

        let AuthResponse { success, user_id, username, is_admin, admin_token } = response;
        if !success {
            return Err(SessionError::Rejected(AUTH_FALLBACK.to_owned()));
        }

        self.session = Session { user_id: Some(user_id), username: Some(username), is_admin, admin_token };
        self.persist();
        info!(%user_id, ?action, "session established");
        Ok(self.session.clone())
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.session) {
            warn!(error = %e, "failed to persist session");
        }
    }
}

/// Trim and check the auth form; returns the trimmed username.
///
/// # Errors
///
/// Returns [`SessionError::Invalid`] describing the first failing field.
pub fn validate_credentials<'a>(username: &'a str, password: &str) -> Result<&'a str, SessionError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(SessionError::Invalid(format!(
            "Никнейм должен быть от {USERNAME_MIN_CHARS} до {USERNAME_MAX_CHARS} символов"
        )));
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(SessionError::Invalid(format!(
            "Пароль должен быть не короче {PASSWORD_MIN_CHARS} символов"
        )));
    }
    Ok(username)
}
