//! Turning generated prose into a per-sentence citation map.
//!
//! The model is asked to end every sentence with `[source-N]` markers but
//! nothing enforces it, so parsing is a small state machine over tokens:
//!
//! - text is collected into a running sentence;
//! - a marker directly after terminal punctuation opens a marker run, and
//!   further markers (whitespace between them allowed) extend it;
//! - the first non-blank text after a run closes it, producing one
//!   [`Sentence`] for the last sentence of the running text;
//! - a marker that does not follow terminal punctuation stays literal text.
//!
//! Ids that are out of range or unreadable are dropped from their sentence.
//! Text that never gets a marker run is left out of `sentences` but is
//! always present in `answer_text`.

use super::prompt::Source;
use crate::error::{KamerbronError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TERMINALS: &[char] = &['.', '!', '?', '…'];
const CLOSERS: &[char] = &['"', '\'', '”', '’', '»', ')', '*', '_'];

/// A resolved reference from a sentence to a source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationRef {
    pub source_id: String,
    pub title: String,
    pub page: u32,
}

/// One generated sentence and the sources it cites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub citations: Vec<CitationRef>,
}

/// Whether any sentence of the answer could be tied to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// At least one sentence carries a citation marker run.
    Cited,
    /// The model followed none of the citation format.
    NoCitationsFound,
}

/// Structured answer for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    /// The full generated text, trimmed.
    pub answer_text: String,
    /// Every source presented to the model, cited or not.
    pub sources: Vec<Source>,
    pub sentences: Vec<Sentence>,
}

impl AnswerResult {
    pub fn status(&self) -> AnswerStatus {
        if self.sentences.is_empty() {
            AnswerStatus::NoCitationsFound
        } else {
            AnswerStatus::Cited
        }
    }

    /// Ids of the sources referenced by at least one sentence, in first-use order.
    pub fn cited_source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for citation in self.sentences.iter().flat_map(|s| &s.citations) {
            if !ids.contains(&citation.source_id.as_str()) {
                ids.push(&citation.source_id);
            }
        }
        ids
    }

    /// Format the answer for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer_text.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n[{}] {} p.{} (score: {:.2})",
                    source.id, source.title, source.page, source.similarity_score
                ));
            }
        }

        output
    }
}

/// A lexical token of generated text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Text(&'a str),
    /// A `[source-…]` marker with every digit run found inside it.
    /// `None` marks a digit run too large to be an id.
    Marker {
        raw: &'a str,
        ids: Vec<Option<usize>>,
    },
}

/// Parses generated answers against the sources of their prompt.
#[derive(Debug, Clone)]
pub struct CitationParser {
    marker_regex: Regex,
    digits_regex: Regex,
}

impl CitationParser {
    pub fn new() -> Self {
        let marker_regex = Regex::new(r"(?i)\[\s*source-[^\[\]]*\]").expect("Invalid regex");
        let digits_regex = Regex::new(r"\d+").expect("Invalid regex");

        Self {
            marker_regex,
            digits_regex,
        }
    }

    /// Split text into literal text and citation markers.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut last = 0;

        for m in self.marker_regex.find_iter(text) {
            if m.start() > last {
                tokens.push(Token::Text(&text[last..m.start()]));
            }
            let ids = self
                .digits_regex
                .find_iter(m.as_str())
                .map(|d| d.as_str().parse::<usize>().ok())
                .collect();
            tokens.push(Token::Marker { raw: m.as_str(), ids });
            last = m.end();
        }

        if last < text.len() {
            tokens.push(Token::Text(&text[last..]));
        }

        tokens
    }

    /// Parse a generated answer.
    ///
    /// An empty or blank answer is [`KamerbronError::NoAnswerProduced`]. Any
    /// other text parses, possibly to zero sentences.
    pub fn parse(&self, raw: &str, sources: &[Source]) -> Result<AnswerResult> {
        let answer_text = raw.trim();
        if answer_text.is_empty() {
            return Err(KamerbronError::NoAnswerProduced);
        }

        let mut sentences = Vec::new();
        let mut running = String::new();
        let mut run: Option<Vec<Option<usize>>> = None;

        for token in self.tokenize(answer_text) {
            match token {
                Token::Marker { raw, ids } => match run.as_mut() {
                    Some(run_ids) => run_ids.extend(ids),
                    None if ends_with_terminal(&running) => run = Some(ids),
                    None => {
                        debug!("Marker {} does not close a sentence; kept as text", raw);
                        running.push_str(raw);
                    }
                },
                Token::Text(text) => match run.take() {
                    Some(run_ids) if text.trim().is_empty() => run = Some(run_ids),
                    Some(run_ids) => {
                        sentences.push(close_sentence(&running, &run_ids, sources));
                        running.clear();
                        running.push_str(text);
                    }
                    None => running.push_str(text),
                },
            }
        }

        match run {
            Some(run_ids) => sentences.push(close_sentence(&running, &run_ids, sources)),
            None if !running.trim().is_empty() => {
                debug!("Trailing text without citation: {:?}", running.trim());
            }
            None => {}
        }

        if sentences.is_empty() {
            debug!("No cited sentences found in generated answer");
        }

        Ok(AnswerResult {
            answer_text: answer_text.to_string(),
            sources: sources.to_vec(),
            sentences,
        })
    }
}

impl Default for CitationParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the sentence for a finished marker run.
fn close_sentence(running: &str, ids: &[Option<usize>], sources: &[Source]) -> Sentence {
    let (uncited, text) = split_last_sentence(running);
    if !uncited.is_empty() {
        debug!("Uncited text omitted from sentences: {:?}", uncited);
    }

    let mut citations: Vec<CitationRef> = Vec::new();
    for &id in ids {
        let source = id
            .filter(|&n| n >= 1)
            .and_then(|n| sources.get(n - 1));
        match source {
            Some(source) => {
                if !citations.iter().any(|c| c.source_id == source.id) {
                    citations.push(CitationRef {
                        source_id: source.id.clone(),
                        title: source.title.clone(),
                        page: source.page,
                    });
                }
            }
            None => debug!(
                "Dropping citation {:?}: {} sources available",
                id,
                sources.len()
            ),
        }
    }

    Sentence {
        text: text.to_string(),
        citations,
    }
}

/// Whether text (ignoring trailing whitespace and closing quotes or brackets)
/// ends in sentence-final punctuation.
fn ends_with_terminal(text: &str) -> bool {
    text.trim_end()
        .trim_end_matches(CLOSERS)
        .ends_with(TERMINALS)
}

/// Split text into everything before its last sentence, and that sentence.
///
/// A sentence starts after a line break, or after terminal punctuation
/// (plus closers) followed by whitespace. `€50.000` therefore stays whole.
fn split_last_sentence(text: &str) -> (&str, &str) {
    let text = text.trim();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut start = 0;
    let mut k = 0;

    while k < chars.len() {
        let (offset, c) = chars[k];
        if c == '\n' {
            start = offset + c.len_utf8();
        } else if TERMINALS.contains(&c) {
            let mut j = k + 1;
            while j < chars.len() && CLOSERS.contains(&chars[j].1) {
                j += 1;
            }
            if j < chars.len() && chars[j].1.is_whitespace() {
                start = chars[j].0;
            }
            k = j;
            continue;
        }
        k += 1;
    }

    (text[..start].trim(), text[start..].trim())
}
