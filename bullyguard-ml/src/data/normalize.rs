//! Text cleaning applied to dataset rows and to prediction inputs.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid URL pattern"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("valid mention pattern"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:#\d+|[a-z]+);").expect("valid entity pattern"));
static NON_ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\s']+").expect("valid letter pattern"));

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "both", "but", "by", "can", "did", "do", "does", "doing", "down",
    "during", "each", "for", "from", "further", "had", "has", "have", "having", "here", "how",
    "if", "in", "into", "is", "it", "its", "itself", "just", "more", "most", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would",
];

/// Maps raw text to the canonical form the classifiers see.
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

/// Regex and Unicode based cleaner for social-media text.
///
/// Pronouns and negations are kept even with stopword removal enabled since
/// they carry most of the signal in abusive messages ("you", "not", "no").
#[derive(Debug, Clone)]
pub struct TextCleaner {
    stopwords: Option<HashSet<&'static str>>,
}

impl TextCleaner {
    pub fn new(remove_stopwords: bool) -> Self {
        Self {
            stopwords: remove_stopwords.then(|| STOPWORDS.iter().copied().collect()),
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TextNormalizer for TextCleaner {
    fn normalize(&self, text: &str) -> String {
        let text: String = text.nfkc().collect::<String>().to_lowercase();
        let text = URL_RE.replace_all(&text, " ");
        let text = MENTION_RE.replace_all(&text, " ");
        let text = ENTITY_RE.replace_all(&text, " ");
        let text = NON_ALPHA_RE.replace_all(&text, " ");

        text.split_whitespace()
            .map(|w| w.trim_matches('\''))
            .filter(|w| !w.is_empty())
            .filter(|w| match &self.stopwords {
                Some(stop) => !stop.contains(w),
                None => true,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
