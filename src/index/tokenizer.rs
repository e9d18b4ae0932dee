//! Tokenization and stopword filtering.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Built-in stopword list to apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StopwordLanguage {
    #[default]
    Dutch,
    English,
    /// No built-in stopwords.
    None,
}

impl StopwordLanguage {
    /// The built-in stopwords for this language.
    pub fn words(&self) -> &'static [&'static str] {
        match self {
            StopwordLanguage::Dutch => DUTCH_STOPWORDS,
            StopwordLanguage::English => ENGLISH_STOPWORDS,
            StopwordLanguage::None => &[],
        }
    }
}

impl std::str::FromStr for StopwordLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dutch" | "nl" | "nederlands" => Ok(StopwordLanguage::Dutch),
            "english" | "en" => Ok(StopwordLanguage::English),
            "none" | "" => Ok(StopwordLanguage::None),
            _ => Err(format!("Unknown stopword language: {}", s)),
        }
    }
}

impl std::fmt::Display for StopwordLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopwordLanguage::Dutch => write!(f, "dutch"),
            StopwordLanguage::English => write!(f, "english"),
            StopwordLanguage::None => write!(f, "none"),
        }
    }
}

/// Splits text into lowercase word tokens, dropping stopwords and short tokens.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    word_regex: Regex,
    stopwords: HashSet<String>,
    min_token_len: usize,
}

impl Tokenizer {
    pub fn new(language: StopwordLanguage, extra_stopwords: &[String], min_token_len: usize) -> Self {
        let word_regex = Regex::new(r"\w+").expect("Invalid regex");

        let stopwords = language
            .words()
            .iter()
            .map(|w| w.to_string())
            .chain(extra_stopwords.iter().map(|w| w.to_lowercase()))
            .collect();

        Self {
            word_regex,
            stopwords,
            min_token_len,
        }
    }

    /// Tokenizer configured from index settings.
    pub fn from_settings(settings: &crate::config::IndexSettings) -> Self {
        Self::new(
            settings.stopwords,
            &settings.extra_stopwords,
            settings.min_token_len,
        )
    }

    /// Tokenize text in order of appearance (duplicates kept).
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.word_regex
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|t| t.chars().count() >= self.min_token_len)
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(StopwordLanguage::default(), &[], 2)
    }
}

const DUTCH_STOPWORDS: &[&str] = &[
    "aan", "al", "alles", "als", "altijd", "andere", "ben", "bij", "daar", "dan", "dat", "de",
    "der", "deze", "die", "dit", "doch", "doen", "door", "dus", "een", "eens", "en", "er", "ge",
    "geen", "geweest", "haar", "had", "heb", "hebben", "heeft", "hem", "het", "hier", "hij",
    "hoe", "hun", "iemand", "iets", "ik", "in", "is", "ja", "je", "kan", "kon", "kunnen", "maar",
    "me", "meer", "men", "met", "mij", "mijn", "moet", "na", "naar", "niet", "niets", "nog",
    "nu", "of", "om", "omdat", "onder", "ons", "ook", "op", "over", "reeds", "te", "tegen",
    "toch", "toen", "tot", "u", "uit", "uw", "van", "veel", "voor", "want", "waren", "was",
    "wat", "we", "wel", "werd", "wezen", "wie", "wij", "wil", "worden", "wordt", "zal", "ze",
    "zelf", "zich", "zij", "zijn", "zo", "zonder", "zou",
];

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];
