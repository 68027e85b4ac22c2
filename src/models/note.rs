//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DisciplineId, NoteId};

/// A free-form study note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub discipline_id: Option<DisciplineId>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = super::time::now();
        Self {
            id: NoteId::new(),
            title: title.into(),
            content: content.into(),
            created_at: now,
            modified_at: now,
            discipline_id: None,
        }
    }

    /// Replace the content and bump the modification time
    pub fn edit(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.modified_at = super::time::now();
    }
}
