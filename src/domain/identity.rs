//! Authenticated caller identity

use serde::{Deserialize, Serialize};

/// Caller resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self { user_id: user_id.into(), email }
    }
}
