use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One saved translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub id: i64,
    pub project: String,
    pub provider: String,
    pub source_text: String,
    /// None for a record saved before translation finished
    pub target_text: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    /// UTC, set once on insert
    pub created_at: NaiveDateTime,
    /// UTC, refreshed on every update
    pub updated_at: NaiveDateTime,
}

impl TranslationRecord {
    pub fn is_completed(&self) -> bool {
        self.target_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// Insert payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTranslation {
    pub project: String,
    pub provider: String,
    pub source_text: String,
    pub target_text: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub note: Option<String>,
    /// Written to both `created_by` and `updated_by`
    pub user: Option<String>,
}

impl NewTranslation {
    pub fn new(
        project: impl Into<String>,
        provider: impl Into<String>,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            provider: provider.into(),
            source_text: source_text.into(),
            ..Self::default()
        }
    }
}

/// Progress counters for one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total: u64,
    /// Records with a non-empty target text
    pub completed: u64,
    pub pending: u64,
}
