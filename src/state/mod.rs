//! Client-side state: session, chat, admin mode, and class content.
//!
//! DESIGN
//! ======
//! Each submodule owns one concern and talks to the network only through the
//! `net::api` traits it is handed. Nothing here prints; the host (`App` and
//! the binary) decides what to show.

pub mod admin;
pub mod chat;
pub mod directory;
pub mod likes;
pub mod news;
pub mod schedule;
pub mod session;
pub mod storage;
