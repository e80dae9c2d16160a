// SPDX-FileCopyrightText: 2026 Aiqus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared by the stream pipeline, the orchestrator, and history stores.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Speaker of a [`Message`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

/// A role-tagged unit of conversation sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Mode tag classifying a turn.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchType {
    Web,
    News,
    Academic,
    #[default]
    Chat,
    Writing,
    Link,
}

/// Descriptor of a file attached to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    /// MIME type or application-defined kind.
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One conversational turn, in flight or completed.
///
/// The orchestrator owns the record while a request runs. `answer` stays empty
/// until the stream ends, fails, or is cancelled; it is then set exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub conversation_id: String,
    pub message_id: String,
    pub query: String,
    pub search_type: SearchType,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub answer: String,
    pub model: String,
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl SessionRecord {
    /// Creates a record for a new turn.
    ///
    /// When `conversation_id` is `None` the turn starts a new conversation whose
    /// id equals the record id. The message id is left empty; it is assigned
    /// right before the request is dispatched.
    pub fn new(
        query: impl Into<String>,
        search_type: SearchType,
        model: impl Into<String>,
        files: Vec<Attachment>,
        conversation_id: Option<String>,
    ) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            conversation_id: conversation_id.unwrap_or_else(|| id.clone()),
            id,
            message_id: String::new(),
            query: query.into(),
            search_type,
            timestamp: chrono::Utc::now().timestamp_millis(),
            answer: String::new(),
            model: model.into(),
            files,
        }
    }

    /// Returns true if this turn opened its conversation.
    pub fn starts_conversation(&self) -> bool {
        self.id == self.conversation_id
    }
}

/// An incremental piece of answer text, tagged with the exchange it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub message_id: String,
}

/// A prior turn as returned by a history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub conversation_id: String,
    pub query: String,
    #[serde(default)]
    pub answer: Option<String>,
    pub timestamp: i64,
}

impl From<&SessionRecord> for HistoryTurn {
    fn from(record: &SessionRecord) -> Self {
        Self {
            conversation_id: record.conversation_id.clone(),
            query: record.query.clone(),
            answer: (!record.answer.is_empty()).then(|| record.answer.clone()),
            timestamp: record.timestamp,
        }
    }
}
