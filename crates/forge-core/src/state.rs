//! UI-agnostic application state types
//!
//! These structures are shared between the controller, the poller and any
//! front end, and don't depend on a specific UI framework.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which generation mode is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Design,
    #[default]
    Website,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Design => "design",
            ChatType::Website => "website",
        }
    }

    pub fn all() -> [ChatType; 2] {
        [ChatType::Website, ChatType::Design]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatType::Design => "Design (Logo + Banner)",
            ChatType::Website => "Website Mockup",
        }
    }

    /// The other tab
    pub fn toggled(&self) -> Self {
        match self {
            ChatType::Design => ChatType::Website,
            ChatType::Website => ChatType::Design,
        }
    }
}

/// Identifies one in-flight generation request within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A single generated image as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl ImageResult {
    pub fn new(kind: &str, url: &str) -> Self {
        Self {
            kind: kind.to_string(),
            url: url.to_string(),
        }
    }
}

/// One successful turn: what the user asked for and what came back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub user_message: String,
    pub images: Vec<ImageResult>,
}

/// Session-lifetime record per chat type, used to rebuild the transcript
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    entries: HashMap<ChatType, Vec<ChatHistoryEntry>>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, chat_type: ChatType) -> &[ChatHistoryEntry] {
        self.entries
            .get(&chat_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn push(&mut self, chat_type: ChatType, entry: ChatHistoryEntry) {
        self.entries.entry(chat_type).or_default().push(entry);
    }

    pub fn len(&self, chat_type: ChatType) -> usize {
        self.entries(chat_type).len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|v| v.is_empty())
    }
}

/// Aggregate metrics shown in the stats ticker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(deserialize_with = "count_from_number")]
    pub token_created: u64,
    pub trading_volume: f64,
    #[serde(deserialize_with = "count_from_number")]
    pub active_users: u64,
}

/// Counters arrive as plain JSON numbers, sometimes with a fractional part.
fn count_from_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value > 0.0 {
        Ok(value.round() as u64)
    } else {
        Ok(0)
    }
}

impl StatsSnapshot {
    /// Fallback used when the stats endpoint cannot be reached
    pub fn zeroed() -> Self {
        Self::default()
    }
}
