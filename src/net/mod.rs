//! Networking: wire types, endpoint traits, and the HTTP backend.
//!
//! DESIGN
//! ======
//! Every hosted function gets a trait in `api` so the session, chat, and
//! schedule layers never see `reqwest` directly.

pub mod api;
pub mod http;
pub mod types;
