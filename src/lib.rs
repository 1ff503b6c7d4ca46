//! Session & chat client for the 5У class group.
//!
//! Talks to the externally hosted functions behind the class site: auth,
//! chat messages, lesson likes, news, and contacts. The crate holds no
//! server logic; everything durable lives behind those endpoints except the
//! local session file.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Environment-driven [`config::ClientConfig`] |
//! | [`net`] | Wire types, endpoint traits, and the `reqwest` backend |
//! | [`state::session`] | Session manager and its injected store |
//! | [`state::chat`] | Chat room, poller, and message mutations |
//! | [`state::admin`] | Admin console, command parser, and grants |
//! | [`state::schedule`] | Weekly lessons, lesson status, classrooms |
//! | [`state::likes`] | Per-subject lesson likes |
//! | [`state::directory`] | Built-in contacts and contact drafts |
//! | [`state::news`] | Built-in news and news drafts |
//! | [`app`] | [`app::App`], the host that wires the pieces together |

pub mod app;
pub mod config;
pub mod net;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
