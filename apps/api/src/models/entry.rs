use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use tracing::warn;

/// Derived analysis of a user's history, stored alongside each entry.
pub type EntryContext = Map<String, Value>;

/// A stored diary entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: i64,
    pub user_id: String,
    pub content: String,
    pub enhanced_content: Option<String>,
    /// UTC RFC 3339 with microseconds; sorts lexically.
    pub created_at: String,
    #[serde(default)]
    pub context: EntryContext,
}

/// An entry that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewDiaryEntry {
    pub user_id: String,
    pub content: String,
    pub enhanced_content: Option<String>,
    pub created_at: String,
    pub context: EntryContext,
}

impl NewDiaryEntry {
    pub fn into_entry(self, id: i64) -> DiaryEntry {
        DiaryEntry {
            id,
            user_id: self.user_id,
            content: self.content,
            enhanced_content: self.enhanced_content,
            created_at: self.created_at,
            context: self.context,
        }
    }
}

/// Raw `diary_entries` row. `context` is still serialized text here.
#[derive(Debug, Clone, FromRow)]
pub struct DiaryEntryRow {
    pub id: i64,
    pub user_id: String,
    pub content: String,
    pub enhanced_content: Option<String>,
    pub created_at: String,
    pub context: Option<String>,
}

impl From<DiaryEntryRow> for DiaryEntry {
    fn from(row: DiaryEntryRow) -> Self {
        let context = match decode_context(row.context.as_deref()) {
            ContextDecode::Parsed(map) => map,
            ContextDecode::Defaulted(reason) => {
                if !matches!(reason, DefaultReason::Missing) {
                    warn!("Entry {} has unreadable context ({reason}); using empty", row.id);
                }
                EntryContext::new()
            }
        };

        DiaryEntry {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            enhanced_content: row.enhanced_content,
            created_at: row.created_at,
            context,
        }
    }
}

/// Outcome of decoding a persisted context column.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextDecode {
    Parsed(EntryContext),
    Defaulted(DefaultReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultReason {
    Missing,
    Malformed(String),
    NotAnObject,
}

impl std::fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultReason::Missing => write!(f, "no context stored"),
            DefaultReason::Malformed(e) => write!(f, "malformed JSON: {e}"),
            DefaultReason::NotAnObject => write!(f, "JSON is not an object"),
        }
    }
}

/// Decodes a stored context blob. Never fails; anything that is not a JSON
/// object yields `Defaulted` with the reason.
pub fn decode_context(raw: Option<&str>) -> ContextDecode {
    let Some(raw) = raw else {
        return ContextDecode::Defaulted(DefaultReason::Missing);
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => ContextDecode::Parsed(map),
        Ok(_) => ContextDecode::Defaulted(DefaultReason::NotAnObject),
        Err(e) => ContextDecode::Defaulted(DefaultReason::Malformed(e.to_string())),
    }
}
