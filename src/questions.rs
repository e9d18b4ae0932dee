//! Parliamentary question files and batch drafting.
//!
//! A question file is a JSON array of question objects. Fields this crate does
//! not know about are kept as they are, so drafting never drops data written
//! by other tools.

use crate::error::Result;
use crate::rag::{AnswerEngine, AnswerResult, QuestionContext};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Workflow state of a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
}

/// A stored draft answer.
///
/// Older question files hold the draft as plain text; drafts made here carry
/// their sentence citations. Either shape is written back as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DraftAnswer {
    Cited(AnswerResult),
    Text(String),
}

impl DraftAnswer {
    pub fn as_cited(&self) -> Option<&AnswerResult> {
        match self {
            DraftAnswer::Cited(answer) => Some(answer),
            DraftAnswer::Text(_) => None,
        }
    }
}

/// A parliamentary question as stored in a question file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default = "new_question_id")]
    pub id: String,

    #[serde(rename = "question_text", alias = "text", default)]
    pub question_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub status: QuestionStatus,

    /// The last successful draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_answer: Option<DraftAnswer>,

    /// Why the last drafting attempt failed, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_error: Option<String>,

    /// RFC 3339 time of the last drafting attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn new_question_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Question {
    pub fn new(question_text: impl Into<String>) -> Self {
        Self {
            id: new_question_id(),
            question_text: question_text.into(),
            speaker: None,
            party: None,
            category: None,
            status: QuestionStatus::Draft,
            draft_answer: None,
            draft_error: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }

    /// The question with who asked it, for prompt assembly.
    pub fn context(&self) -> QuestionContext {
        QuestionContext {
            question: self.question_text.clone(),
            speaker: non_blank(&self.speaker),
            party: non_blank(&self.party),
            category: non_blank(&self.category),
        }
    }

    fn record(&mut self, outcome: Result<AnswerResult>) {
        self.updated_at = Some(chrono::Utc::now().to_rfc3339());
        match outcome {
            Ok(answer) => {
                self.draft_answer = Some(DraftAnswer::Cited(answer));
                self.draft_error = None;
            }
            Err(e) => {
                self.draft_error = Some(e.to_string());
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read a question file.
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)?;
    let questions: Vec<Question> = serde_json::from_str(&content)?;
    Ok(questions)
}

/// Write a question file as pretty-printed JSON.
pub fn save_questions(path: &Path, questions: &[Question]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(questions)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Counts from one drafting run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftSummary {
    pub drafted: usize,
    pub failed: usize,
    /// Questions not selected for this run.
    pub skipped: usize,
}

/// Draft answers for the selected questions, `concurrency` at a time.
///
/// An empty `ids` selects every question. A failed question gets a
/// `draft_error` and keeps its previous draft; the rest of the batch goes on.
/// `on_done` is called once per finished question.
#[instrument(skip_all, fields(total = questions.len(), concurrency = concurrency))]
pub async fn draft_all(
    engine: &AnswerEngine,
    questions: &mut [Question],
    ids: &[String],
    concurrency: usize,
    mut on_done: impl FnMut(&Question),
) -> DraftSummary {
    for id in ids {
        if !questions.iter().any(|q| &q.id == id) {
            warn!("No question with id {}", id);
        }
    }

    let selected: Vec<(usize, QuestionContext)> = questions
        .iter()
        .enumerate()
        .filter(|(_, q)| ids.is_empty() || ids.contains(&q.id))
        .map(|(i, q)| (i, q.context()))
        .collect();

    let mut summary = DraftSummary {
        skipped: questions.len() - selected.len(),
        ..Default::default()
    };

    info!("Drafting {} questions", selected.len());

    let mut outcomes = stream::iter(selected)
        .map(|(i, context)| async move { (i, engine.answer(&context).await) })
        .buffer_unordered(concurrency.max(1));

    while let Some((i, outcome)) = outcomes.next().await {
        let question = &mut questions[i];
        match &outcome {
            Ok(_) => summary.drafted += 1,
            Err(e) => {
                warn!("Drafting question {} failed: {}", question.id, e);
                summary.failed += 1;
            }
        }
        question.record(outcome);
        on_done(question);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Page, PageStore};
    use crate::error::KamerbronError;
    use crate::generation::Generator;
    use crate::index::Tokenizer;
    use crate::knowledge::{KnowledgeBase, Snapshot};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedGenerator;

    #[async_trait]
    impl Generator for FixedGenerator {
        async fn generate(&self, _system: &str, _user: &str) -> crate::error::Result<String> {
            Ok("De werkdruk is gedaald. [source-1]".to_string())
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    fn engine() -> AnswerEngine {
        let pages = PageStore::from_pages(vec![Page::new(
            "Werkprogramma ATR 2025.pdf",
            12,
            "Het college toetst regeldruk en werkdruk van nieuwe wetgeving.",
            "/kb/Werkprogramma ATR 2025.pdf",
        )]);
        let kb = KnowledgeBase::new(Snapshot::build(pages, Tokenizer::default()));
        AnswerEngine::new(Arc::new(kb), Arc::new(FixedGenerator))
    }

    const FILE: &str = r#"[
        {"id": "q1", "question_text": "Hoe ontwikkelt de regeldruk zich?", "speaker": "Jansen",
         "party": "VVD", "category": "Regeldruk", "timestamp": "00:12:03", "nextAction": "Bellen"},
        {"id": "q2", "text": "Wat doet het college aan werkdruk?", "status": "InProgress"},
        {"id": "q3", "question_text": ""}
    ]"#;

    #[test]
    fn test_parse_question_file() {
        let questions: Vec<Question> = serde_json::from_str(FILE).unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question_text, "Hoe ontwikkelt de regeldruk zich?");
        assert_eq!(questions[0].speaker.as_deref(), Some("Jansen"));
        assert_eq!(questions[0].extra["nextAction"], "Bellen");
        assert_eq!(questions[0].extra["timestamp"], "00:12:03");
        assert_eq!(questions[1].question_text, "Wat doet het college aan werkdruk?");
        assert_eq!(questions[1].status, QuestionStatus::InProgress);
        assert_eq!(questions[1].speaker, None);
    }

    #[test]
    fn test_missing_id_generated() {
        let questions: Vec<Question> = serde_json::from_str(r#"[{"text": "Vraag?"}]"#).unwrap();
        assert!(uuid::Uuid::parse_str(&questions[0].id).is_ok());
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("questions.json");
        let questions: Vec<Question> = serde_json::from_str(FILE).unwrap();

        save_questions(&path, &questions).unwrap();
        let reloaded = load_questions(&path).unwrap();
        assert_eq!(reloaded, questions);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"question_text\""));
        assert!(raw.contains("\"nextAction\""));
    }

    #[test]
    fn test_plain_text_draft_answer_loads_and_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(
            &path,
            r#"[{"id":"q1","question_text":"Vraag?","draftAnswer":"Eerder concept"}]"#,
        )
        .unwrap();

        let questions = load_questions(&path).unwrap();
        let draft = questions[0].draft_answer.as_ref().unwrap();
        assert_eq!(draft, &DraftAnswer::Text("Eerder concept".to_string()));
        assert!(draft.as_cited().is_none());

        save_questions(&path, &questions).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["draftAnswer"], "Eerder concept");
    }

    #[tokio::test]
    async fn test_drafting_replaces_plain_text_draft() {
        let engine = engine();
        let mut questions: Vec<Question> = serde_json::from_str(
            r#"[{"id":"q1","question_text":"Hoe ontwikkelt de werkdruk zich?","draftAnswer":"Eerder concept"}]"#,
        )
        .unwrap();

        let summary = draft_all(&engine, &mut questions, &[], 1, |_| {}).await;

        assert_eq!(summary.drafted, 1);
        let draft = questions[0].draft_answer.as_ref().unwrap();
        let cited = draft.as_cited().unwrap();
        assert_eq!(cited.sentences.len(), 1);
        assert_eq!(cited.answer_text, "De werkdruk is gedaald. [source-1]");
    }

    #[test]
    fn test_context_defaults_blank_metadata() {
        let mut question = Question::new("Vraag?");
        question.speaker = Some("  ".to_string());
        question.party = Some("D66".to_string());

        let context = question.context();
        assert_eq!(context.speaker, None);
        assert_eq!(context.party.as_deref(), Some("D66"));
    }

    #[tokio::test]
    async fn test_draft_all_records_each_outcome() {
        let engine = engine();
        let mut questions: Vec<Question> = serde_json::from_str(FILE).unwrap();
        let mut done = Vec::new();

        let summary = draft_all(&engine, &mut questions, &[], 2, |q| done.push(q.id.clone())).await;

        assert_eq!(
            summary,
            DraftSummary {
                drafted: 2,
                failed: 1,
                skipped: 0
            }
        );
        assert_eq!(done.len(), 3);

        let draft = questions[0].draft_answer.as_ref().unwrap().as_cited().unwrap();
        assert_eq!(draft.sentences.len(), 1);
        assert_eq!(draft.sentences[0].citations[0].page, 12);
        assert!(questions[0].updated_at.is_some());
        assert!(questions[0].draft_error.is_none());

        // The blank question fails on its own
        assert!(questions[2].draft_answer.is_none());
        assert!(questions[2].draft_error.is_some());
        assert!(questions[2].updated_at.is_some());
    }

    #[tokio::test]
    async fn test_draft_selected_ids_only() {
        let engine = engine();
        let mut questions: Vec<Question> = serde_json::from_str(FILE).unwrap();

        let summary = draft_all(&engine, &mut questions, &["q2".to_string()], 4, |_| {}).await;

        assert_eq!(summary.drafted, 1);
        assert_eq!(summary.skipped, 2);
        assert!(questions[0].draft_answer.is_none());
        assert!(questions[0].updated_at.is_none());
        assert!(questions[1].draft_answer.is_some());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_draft() {
        let engine = engine();
        let mut questions: Vec<Question> = serde_json::from_str(FILE).unwrap();
        draft_all(&engine, &mut questions, &["q1".to_string()], 1, |_| {}).await;
        let previous = questions[0].draft_answer.clone();

        questions[0].question_text = String::new();
        let summary = draft_all(&engine, &mut questions, &["q1".to_string()], 1, |_| {}).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(questions[0].draft_answer, previous);
        assert!(questions[0]
            .draft_error
            .as_deref()
            .unwrap()
            .contains(&KamerbronError::InvalidInput("question is empty".to_string()).to_string()));
    }
}
