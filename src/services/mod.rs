//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own prompt building and conversation state so the route
//! handler can stay focused on frame translation.

pub mod chat;
pub mod explain;
pub mod session;
