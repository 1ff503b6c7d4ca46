//! Admin console, command parsing, and admin-mode state.
//!
//! DESIGN
//! ======
//! The console does no interpretation: it records history and hands the
//! literal input to a host callback. The host parses with
//! [`AdminCommand::parse`] and applies the result to [`AdminMode`] only when
//! the session carries the admin flag.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::fmt;
use std::str::FromStr;

/// Help text shown by an empty console.
pub const HELP_LINES: [&str; 6] = [
    "Welcome to Admin Console",
    "Available commands:",
    "  /adminChat true/false - вкл/выкл админ сообщения",
    "  /admin anonim - писать от анонима",
    "  /admin default - писать как обычный пользователь",
    "  /adminLesson true/false - режим редактирования расписания",
];

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    /// `/adminChat <bool>`: mark outgoing chat messages as admin messages.
    AdminChat(bool),
    /// `/admin anonim`: post as the anonymous name.
    Anonymous,
    /// `/admin default`: post under the session username.
    DefaultIdentity,
    /// `/adminLesson <bool>`: allow schedule editing.
    AdminLesson(bool),
}

impl AdminCommand {
    /// Literal prefix match. Anything else (including a bad boolean) is `None`
    /// and belongs to the host.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(rest) = input.strip_prefix("/adminChat") {
            return parse_flag(rest).map(Self::AdminChat);
        }
        if let Some(rest) = input.strip_prefix("/adminLesson") {
            return parse_flag(rest).map(Self::AdminLesson);
        }
        match input.strip_prefix("/admin ").map(str::trim) {
            Some("anonim") => Some(Self::Anonymous),
            Some("default") => Some(Self::DefaultIdentity),
            _ => None,
        }
    }
}

fn parse_flag(rest: &str) -> Option<bool> {
    // Require a separator so `/adminChatty true` is not a command.
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    match rest.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// =============================================================================
// MODE
// =============================================================================

/// Display/editing toggles driven by admin commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdminMode {
    pub chat_admin: bool,
    pub anonymous: bool,
    pub lesson_edit: bool,
}

impl AdminMode {
    /// Apply a command and return the console reply.
    pub fn apply(&mut self, command: AdminCommand) -> String {
        match command {
            AdminCommand::AdminChat(on) => {
                self.chat_admin = on;
                format!("Admin chat mode: {}", on_off(on))
            }
            AdminCommand::Anonymous => {
                self.anonymous = true;
                "Identity: anonymous".to_owned()
            }
            AdminCommand::DefaultIdentity => {
                self.anonymous = false;
                "Identity: default".to_owned()
            }
            AdminCommand::AdminLesson(on) => {
                self.lesson_edit = on;
                format!("Lesson edit mode: {}", on_off(on))
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

// =============================================================================
// CONSOLE
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct AdminConsole {
    history: Vec<String>,
}

impl AdminConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo `input` into history and pass it, untouched, to `on_command`.
    ///
    /// Blank input is ignored and returns `false`.
    pub fn submit<F>(&mut self, input: &str, on_command: F) -> bool
    where
        F: FnOnce(&str),
    {
        if input.trim().is_empty() {
            return false;
        }
        self.history.push(format!("> {input}"));
        on_command(input);
        true
    }

    pub fn push_output(&mut self, line: impl Into<String>) {
        self.history.push(line.into());
    }

    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// What the console shows: help when nothing has run yet.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        if self.history.is_empty() {
            HELP_LINES.iter().map(|line| (*line).to_owned()).collect()
        } else {
            self.history.clone()
        }
    }
}

// =============================================================================
// GRANTS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminLevel {
    /// `ma1`: news and contacts.
    Junior,
    /// `sa1`: everything, gated by a verification code.
    Senior,
}

impl AdminLevel {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Junior => "ma1",
            Self::Senior => "sa1",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AdminLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "ma1" => Ok(Self::Junior),
            "sa1" => Ok(Self::Senior),
            other => Err(format!("unknown admin level '{other}' (expected ma1 or sa1)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AdminGrant {
    pub level: &'static str,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrantError {
    #[error("Введите имя пользователя")]
    MissingTarget,
    #[error("Неверный код доступа для старшего администратора")]
    BadCode,
    #[error("senior admin grants are disabled: CLASS5U_SENIOR_ADMIN_CODE is not set")]
    SeniorDisabled,
}

/// Check the grant form.
///
/// Senior grants compare `code` against the configured verification code;
/// with none configured they are refused outright.
///
/// # Errors
///
/// See [`GrantError`].
pub fn validate_grant(
    level: AdminLevel,
    target: &str,
    code: Option<&str>,
    configured_code: Option<&str>,
) -> Result<AdminGrant, GrantError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(GrantError::MissingTarget);
    }
    if level == AdminLevel::Senior {
        let Some(expected) = configured_code else {
            return Err(GrantError::SeniorDisabled);
        };
        if code != Some(expected) {
            return Err(GrantError::BadCode);
        }
    }
    Ok(AdminGrant { level: level.code(), target: target.to_owned() })
}
