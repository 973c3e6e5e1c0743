use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of `POST /messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageQuery {
    pub session_id: Uuid,
}

/// Session handle announced in the first `endpoint` event of `GET /sse`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
}

impl SessionInfo {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
        }
    }

    /// Relative URL the client must POST its JSON-RPC messages to.
    pub fn endpoint(&self) -> String {
        format!("/messages?session_id={}", self.session_id)
    }
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self::new()
    }
}
