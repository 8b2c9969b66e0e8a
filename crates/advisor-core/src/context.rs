//! Request Context: per-request identifiers carried alongside the state
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub conversation_id: Option<i64>,
    pub user_id: Option<i64>,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            conversation_id: None,
            user_id: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: Option<i64>) -> Self {
        self.conversation_id = conversation_id;
        self
    }

    pub fn with_user(mut self, user_id: Option<i64>) -> Self {
        self.user_id = user_id;
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
