//! Session value object and session-change events.

use serde::{Deserialize, Serialize};

/// Client-local record of a successful login.
///
/// Independent of any server-side token validation; lives until an explicit
/// logout clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Session state change, fanned out to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String },
    LoggedOut,
}
