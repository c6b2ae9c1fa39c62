use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One tracked school/program. Treated as a read-only snapshot by every
/// derivation function; only the CLI/db layer creates or edits these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub school_name: String,
    pub program_name: String,
    pub application_round: String,
    /// Raw `YYYY-MM-DD` string; may be absent or malformed.
    pub deadline: Option<String>,
    pub application_fee: Option<f64>,
    pub program_total_fee: Option<f64>,
    pub fee_currency: String,
    pub essays_required: i32,
    pub lors_required: i32,
    pub lors_submitted: i32,
    pub interview_required: bool,
    pub interview_completed: bool,
    pub decision_status: String,
    pub status: String,
    pub requirements_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Essay {
    pub id: i64,
    pub school_name: String,
    pub program_type: String,
    pub essay_prompt: String,
    pub essay_content: String,
    pub review_score: Option<f64>,
    pub parent_essay_id: Option<i64>,
    pub application_id: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct DocTemplate {
    pub id: &'static str,
    pub label: &'static str,
}

/// The fixed document checklist every application is tracked against.
pub const DOC_TEMPLATES: &[DocTemplate] = &[
    DocTemplate { id: "resume", label: "CV / Resume" },
    DocTemplate { id: "transcripts", label: "Transcripts" },
    DocTemplate { id: "sop", label: "Statement of Purpose" },
    DocTemplate { id: "test_scores", label: "GMAT / GRE Scores" },
    DocTemplate { id: "english_test", label: "English Proficiency" },
    DocTemplate { id: "passport", label: "Passport / ID" },
    DocTemplate { id: "financial_docs", label: "Financial Documents" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocState {
    #[default]
    Missing,
    InProgress,
    Ready,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocEntry {
    #[serde(default)]
    pub status: DocState,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Scope key -> (template id -> entry). Scope keys come from
/// [`doc_scope_key`].
pub type DocStatusMap = HashMap<String, HashMap<String, DocEntry>>;

pub const DOC_GLOBAL_SCOPE: &str = "global";

pub fn doc_scope_key(application_id: Option<i64>) -> String {
    match application_id {
        Some(id) => format!("application:{id}"),
        None => DOC_GLOBAL_SCOPE.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Advisory notice derived from current application state. Never persisted;
/// regenerated from scratch on every run with deterministic ids so that
/// dismissal-by-id survives recomputation.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub target_nav: &'static str,
    pub application_id: i64,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn application(id: i64) -> Application {
        Application {
            id,
            school_name: "Harborview".to_string(),
            program_name: "MBA".to_string(),
            application_round: "Round 1".to_string(),
            deadline: Some("2027-01-15".to_string()),
            application_fee: Some(250.0),
            program_total_fee: Some(80_000.0),
            fee_currency: "USD".to_string(),
            essays_required: 2,
            lors_required: 2,
            lors_submitted: 1,
            interview_required: false,
            interview_completed: false,
            decision_status: "Pending".to_string(),
            status: "Planning".to_string(),
            requirements_notes: String::new(),
        }
    }

    pub(crate) fn essay(id: i64, application_id: Option<i64>) -> Essay {
        Essay {
            id,
            school_name: "Harborview".to_string(),
            program_type: "MBA".to_string(),
            essay_prompt: "Why this program?".to_string(),
            essay_content: "Draft".to_string(),
            review_score: None,
            parent_essay_id: None,
            application_id,
        }
    }

    /// Doc status map with every template marked `status` for one scope.
    pub(crate) fn docs_all(application_id: i64, status: DocState) -> DocStatusMap {
        let mut scope = HashMap::new();
        for template in DOC_TEMPLATES {
            scope.insert(
                template.id.to_string(),
                DocEntry { status, ..DocEntry::default() },
            );
        }
        let mut map = HashMap::new();
        map.insert(doc_scope_key(Some(application_id)), scope);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_scope_key_formats() {
        assert_eq!(doc_scope_key(Some(7)), "application:7");
        assert_eq!(doc_scope_key(None), "global");
    }

    #[test]
    fn doc_state_defaults_to_missing() {
        let entry: DocEntry = serde_json::from_str("{}").unwrap();
        assert_eq!(entry.status, DocState::Missing);
    }

    #[test]
    fn doc_state_round_trips_snake_case() {
        let json = serde_json::to_string(&DocState::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
