//! Claim importer
//!
//! Turns unstructured text into candidate claims and drives them through
//! registration and a post-import gate check. Reimporting identical text is
//! idempotent: claim ids are synthesized from the assertion, so duplicates
//! are skipped rather than re-registered.

pub mod rules;

use crate::claim::models::{ChangeScope, Claim};
use crate::claim::store::ClaimStore;
use crate::error::AppError;
use crate::gate::evaluator::GateEvaluator;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Sentence terminators: '.', '!' or '?' runs followed by whitespace or EOL.
static SENTENCE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(\s+|$)").expect("sentence split pattern is a valid regex"));

const MAX_TITLE_LEN: usize = 60;

pub struct ClaimImporter;

impl ClaimImporter {
    /// Import claims from a raw body.
    ///
    /// The body may be a JSON array of sentence strings or plain text to be
    /// segmented. Each candidate goes through the registration gate: an
    /// already-known claim id is skipped silently, any other failure aborts
    /// the whole batch. When at least one claim was newly registered, a gate
    /// check runs over a scope built from the first import; conflicts reject
    /// the batch without rolling back prior registrations.
    pub async fn import(
        store: &ClaimStore,
        gate: &GateEvaluator,
        introduced_by: &str,
        body: &str,
    ) -> Result<Vec<Claim>, AppError> {
        let sentences = Self::parse_sentences(body)?;
        debug!(candidates = sentences.len(), "import candidates segmented");

        let mut imported = Vec::new();
        for sentence in &sentences {
            let candidate = Self::candidate_from_sentence(sentence, introduced_by);
            match store.register(candidate).await {
                Ok(claim) => imported.push(claim),
                // Already known from a previous import: skip, not an error.
                Err(AppError::DuplicateClaim(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        if let Some(first) = imported.first() {
            let scope = ChangeScope::wildcard_for(&first.scope_types);
            let result = gate.check(store, &scope).await;
            if !result.conflicts.is_empty() {
                // Registered batch members stay registered; the caller gets
                // the structured conflicts instead of a rollback.
                return Err(AppError::ImportBlocked(result.conflicts));
            }
        }

        info!(
            imported = imported.len(),
            skipped = sentences.len() - imported.len(),
            source = introduced_by,
            "import completed"
        );
        Ok(imported)
    }

    /// Decode the body into candidate sentences.
    ///
    /// A JSON array is taken as pre-segmented sentences; a JSON string or
    /// anything else is treated as raw text.
    pub fn parse_sentences(body: &str) -> Result<Vec<String>, AppError> {
        let sentences = if let Ok(list) = serde_json::from_str::<Vec<String>>(body) {
            list.into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        } else if let Ok(text) = serde_json::from_str::<String>(body) {
            Self::extract_sentences(&text)
        } else {
            Self::extract_sentences(body)
        };

        if sentences.is_empty() {
            return Err(AppError::ImportParse(
                "no candidate sentences found in import body".to_string(),
            ));
        }
        Ok(sentences)
    }

    /// Split text into candidate sentences on line breaks, bullet markers,
    /// and sentence-ending punctuation.
    pub fn extract_sentences(text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        for line in text.lines() {
            let line = line
                .trim()
                .trim_start_matches(|c: char| c == '-' || c == '*' || c == '•')
                .trim();
            for part in SENTENCE_SPLIT.split(line) {
                let part = part.trim();
                if !part.is_empty() {
                    sentences.push(part.to_string());
                }
            }
        }
        sentences
    }

    /// Minimal normalization: trim and collapse internal whitespace.
    pub fn normalize_assertion(sentence: &str) -> String {
        sentence.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Deterministic id from the normalized assertion, so reimporting the
    /// same text resolves to the same claim.
    pub fn synthesize_claim_id(assertion: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(assertion.as_bytes());
        let digest = hasher.finalize();
        let short: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
        format!("imported-{}", short)
    }

    /// Build a candidate claim from one sentence using the ordered rule
    /// tables in [`rules`].
    pub fn candidate_from_sentence(sentence: &str, introduced_by: &str) -> Claim {
        let category = rules::classify(sentence);
        let assertion = Self::normalize_assertion(sentence);
        Claim {
            claim_id: Self::synthesize_claim_id(&assertion),
            title: assertion.chars().take(MAX_TITLE_LEN).collect(),
            scope_types: rules::infer_scope_types(sentence),
            severity: rules::severity_for(category),
            owner: rules::infer_owner(sentence),
            category,
            introduced_by: introduced_by.to_string(),
            rationale: "Imported from document".to_string(),
            assertion,
            source_type: Some("imported".to_string()),
            rationale_ref: None,
            read_only: false,
            registered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::models::{Category, ClaimSeverity, ScopeType};

    #[test]
    fn test_extract_sentences_handles_bullets_and_punctuation() {
        let text = "Claims are atomic. The gate is unavoidable!\n- UI must not compute readiness\n* Snapshots are diagnostic\n";
        let sentences = ClaimImporter::extract_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "Claims are atomic",
                "The gate is unavoidable",
                "UI must not compute readiness",
                "Snapshots are diagnostic",
            ]
        );
    }

    #[test]
    fn test_parse_sentences_accepts_json_array() {
        let body = r#"["First claim sentence", "  Second one  ", ""]"#;
        let sentences = ClaimImporter::parse_sentences(body).unwrap();
        assert_eq!(sentences, vec!["First claim sentence", "Second one"]);
    }

    #[test]
    fn test_parse_sentences_rejects_empty_body() {
        let err = ClaimImporter::parse_sentences("   \n  ").unwrap_err();
        assert!(matches!(err, AppError::ImportParse(_)));
    }

    #[test]
    fn test_prohibition_sentence_yields_blocking_prohibition() {
        let claim = ClaimImporter::candidate_from_sentence(
            "Users must not disable the safety interlock",
            "policy.md",
        );
        assert_eq!(claim.category, Category::Prohibition);
        assert_eq!(claim.severity, ClaimSeverity::Block);
        assert_eq!(claim.source_type.as_deref(), Some("imported"));
        assert_eq!(claim.introduced_by, "policy.md");
    }

    #[test]
    fn test_claim_id_is_idempotent_under_whitespace_noise() {
        let a = ClaimImporter::candidate_from_sentence("The  api must\n validate input", "x");
        let b = ClaimImporter::candidate_from_sentence("The api must validate input", "y");
        assert_eq!(a.claim_id, b.claim_id);
        assert!(a.claim_id.starts_with("imported-"));
    }

    #[test]
    fn test_title_is_bounded() {
        let long = "This assertion keeps going well past the sixty character title bound";
        let claim = ClaimImporter::candidate_from_sentence(long, "x");
        assert_eq!(claim.title.chars().count(), 60);
        assert!(claim.assertion.len() > claim.title.len());
    }

    #[tokio::test]
    async fn test_reimport_skips_duplicates() {
        let store = ClaimStore::new();
        let gate = GateEvaluator::new();
        let body = "The api must validate input. Rollback paths exist.";

        let first = ClaimImporter::import(&store, &gate, "doc", body)
            .await
            .unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(store.count().await, 2);

        let second = ClaimImporter::import(&store, &gate, "doc", body)
            .await
            .unwrap();
        assert!(second.is_empty());
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_conflicting_import_is_blocked_without_rollback() {
        let store = ClaimStore::new();
        let gate = GateEvaluator::new();

        ClaimImporter::import(&store, &gate, "doc", "Deploys never skip review.")
            .await
            .unwrap();
        let before = store.count().await;

        let err = ClaimImporter::import(&store, &gate, "doc", "Deploys may skip review.")
            .await
            .unwrap_err();
        match err {
            AppError::ImportBlocked(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].claim_ids.len(), 2);
            }
            other => panic!("expected ImportBlocked, got {other}"),
        }
        // The conflicting claim stays registered - documented gap, no rollback.
        assert_eq!(store.count().await, before + 1);
    }

    #[tokio::test]
    async fn test_post_import_scope_comes_from_first_claim() {
        let store = ClaimStore::new();
        let gate = GateEvaluator::new();

        let imported =
            ClaimImporter::import(&store, &gate, "doc", "The api endpoint must validate input.")
                .await
                .unwrap();
        assert_eq!(imported[0].scope_types, vec![ScopeType::Api]);
    }
}
