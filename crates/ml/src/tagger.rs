use studio_core::extract::{month_number, PERSON_LABEL, SERVICE_NAMES, STATUS_NAMES};
use studio_core::{TaggedSpan, TokenTagger};
use unicode_segmentation::UnicodeSegmentation;

pub const MISC_LABEL: &str = "MISC";

/// Capitalized words that open commands or name record kinds rather than people.
const NON_PERSON_WORDS: &[&str] = &[
    "a", "add", "all", "an", "any", "are", "attendance", "book", "can", "class", "classes",
    "client", "clients", "could", "create", "do", "does", "email", "enquiry", "enroll", "fetch",
    "filter", "find", "for", "get", "give", "hello", "hi", "how", "i", "instructor", "is", "list",
    "make", "me", "new", "order", "phone", "please", "register", "report", "revenue", "show",
    "status", "tell", "the", "top", "total", "upcoming", "what", "when", "where", "which", "who",
];

struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

/// Offline tagger: service-catalog matches become MISC spans and runs of
/// capitalized words become PER spans. Offsets count characters.
#[derive(Debug, Clone, Default)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    pub fn new() -> Self {
        Self
    }
}

impl TokenTagger for HeuristicTagger {
    fn model_name(&self) -> &'static str {
        "heuristic-tagger"
    }

    fn tag(&self, text: &str) -> Vec<TaggedSpan> {
        let words = words_with_char_offsets(text);
        let mut spans = Vec::new();
        let mut idx = 0;

        while idx < words.len() {
            if let Some(len) = catalog_match_len(&words[idx..]) {
                spans.extend(
                    words[idx..idx + len]
                        .iter()
                        .map(|word| TaggedSpan::new(MISC_LABEL, word.text, word.start, word.end)),
                );
                idx += len;
                continue;
            }

            let word = &words[idx];
            if looks_like_name(word.text) {
                spans.push(TaggedSpan::new(PERSON_LABEL, word.text, word.start, word.end));
            }
            idx += 1;
        }

        spans
    }
}

fn words_with_char_offsets(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut chars_before = 0usize;
    let mut last_byte = 0usize;

    for (byte_idx, word) in text.unicode_word_indices() {
        chars_before += text[last_byte..byte_idx].chars().count();
        let len = word.chars().count();
        words.push(Word {
            text: word,
            start: chars_before,
            end: chars_before + len,
        });
        chars_before += len;
        last_byte = byte_idx + word.len();
    }

    words
}

fn catalog_match_len(words: &[Word<'_>]) -> Option<usize> {
    SERVICE_NAMES.iter().find_map(|service| {
        let parts = service.split_whitespace().collect::<Vec<_>>();
        let matches = parts.len() <= words.len()
            && parts
                .iter()
                .zip(words)
                .all(|(part, word)| part.eq_ignore_ascii_case(word.text));
        matches.then_some(parts.len())
    })
}

fn looks_like_name(word: &str) -> bool {
    let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper || word.chars().any(|ch| ch.is_ascii_digit()) {
        return false;
    }

    let lower = word.to_lowercase();
    !NON_PERSON_WORDS.contains(&lower.as_str())
        && month_number(&lower).is_none()
        && !STATUS_NAMES
            .iter()
            .any(|status| status.eq_ignore_ascii_case(word))
}
