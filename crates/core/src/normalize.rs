use std::sync::Arc;

use tracing::{debug, warn};

use crate::contracts::TranslationService;
use crate::models::LanguageTrace;

pub const CANONICAL_LANGUAGE: &str = "en";

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Script and stop-word based language guess. Returns an ISO 639-1 code.
pub fn guess_language(text: &str) -> Option<&'static str> {
    let mut hebrew_count = 0usize;
    let mut arabic_count = 0usize;
    let mut cyrillic_count = 0usize;
    let mut devanagari_count = 0usize;
    let mut latin_count = 0usize;

    for ch in text.chars() {
        let code = ch as u32;
        if (0x0590..=0x05FF).contains(&code) {
            hebrew_count += 1;
        } else if (0x0600..=0x06FF).contains(&code) {
            arabic_count += 1;
        } else if (0x0400..=0x04FF).contains(&code) {
            cyrillic_count += 1;
        } else if (0x0900..=0x097F).contains(&code) {
            devanagari_count += 1;
        } else if ch.is_ascii_alphabetic() || is_latin_extended(ch) {
            latin_count += 1;
        }
    }

    if devanagari_count > latin_count && devanagari_count > 0 {
        Some("hi")
    } else if hebrew_count > latin_count && hebrew_count > 0 {
        Some("he")
    } else if arabic_count > latin_count && arabic_count > 0 {
        Some("ar")
    } else if cyrillic_count > latin_count && cyrillic_count > 0 {
        Some("ru")
    } else if latin_count > 0 {
        Some(guess_latin_language(text))
    } else {
        None
    }
}

fn is_latin_extended(ch: char) -> bool {
    ('\u{00C0}'..='\u{024F}').contains(&ch)
}

const LATIN_STOPWORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "for", "with", "what", "show", "get", "list", "is", "are", "of", "to",
            "my", "how", "many", "this", "all",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "mit", "für", "können", "sie", "kunden",
            "ein", "eine", "wie", "viele", "diesen", "bald",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "et", "est", "pour", "avec", "des", "une", "un", "quels", "clients",
            "combien", "ce", "mois",
        ],
    ),
    (
        "es",
        &[
            "el", "los", "las", "y", "es", "para", "con", "una", "cuántos", "clientes", "este",
            "mes", "del",
        ],
    ),
];

fn guess_latin_language(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let words = lower
        .split(|ch: char| !ch.is_alphabetic())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>();

    let mut best = CANONICAL_LANGUAGE;
    let mut best_hits = 0usize;
    for (code, stopwords) in LATIN_STOPWORDS {
        let hits = words.iter().filter(|word| stopwords.contains(*word)).count();
        if hits > best_hits {
            best = *code;
            best_hits = hits;
        }
    }
    best
}

#[derive(Debug, Clone)]
pub struct NormalizedText {
    pub text: String,
    pub trace: LanguageTrace,
}

/// Brings raw input into the canonical language. Never fails: any detection
/// or translation error keeps the original text and records the reason.
#[derive(Clone)]
pub struct LanguageNormalizer {
    service: Arc<dyn TranslationService>,
    canonical: String,
}

impl LanguageNormalizer {
    pub fn new(service: Arc<dyn TranslationService>) -> Self {
        Self {
            service,
            canonical: CANONICAL_LANGUAGE.to_string(),
        }
    }

    pub fn with_canonical(mut self, code: impl Into<String>) -> Self {
        self.canonical = code.into();
        self
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub async fn normalize(&self, raw: &str) -> NormalizedText {
        let text = normalize_text(raw);
        let mut trace = LanguageTrace::default();

        if text.is_empty() {
            return NormalizedText { text, trace };
        }

        let detected = match self.service.detect_language(&text).await {
            Ok(code) => code,
            Err(err) => {
                warn!(error = %err, "language detection failed; keeping original text");
                trace.fallback = Some(err.to_string());
                return NormalizedText { text, trace };
            }
        };
        trace.detected = Some(detected.clone());

        if same_language(&detected, &self.canonical) {
            return NormalizedText { text, trace };
        }

        match self.service.translate(&text, &self.canonical).await {
            Ok(translated) if !translated.trim().is_empty() => {
                let translated = normalize_text(&translated);
                debug!(source = %detected, translated = %translated, "query translated");
                trace.translated = Some(translated.clone());
                NormalizedText {
                    text: translated,
                    trace,
                }
            }
            Ok(_) => {
                warn!(source = %detected, "translation came back empty; keeping original text");
                trace.fallback = Some("empty translation".to_string());
                NormalizedText { text, trace }
            }
            Err(err) => {
                warn!(source = %detected, error = %err, "translation failed; keeping original text");
                trace.fallback = Some(err.to_string());
                NormalizedText { text, trace }
            }
        }
    }
}

fn same_language(detected: &str, canonical: &str) -> bool {
    let primary = |code: &str| {
        code.split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase()
    };
    primary(detected) == primary(canonical)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::TranslationError;

    struct FixedService {
        detected: Result<String, TranslationError>,
        translated: Result<String, TranslationError>,
    }

    #[async_trait]
    impl TranslationService for FixedService {
        async fn detect_language(&self, _text: &str) -> Result<String, TranslationError> {
            self.detected.clone()
        }

        async fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslationError> {
            self.translated.clone()
        }
    }

    fn normalizer(
        detected: Result<String, TranslationError>,
        translated: Result<String, TranslationError>,
    ) -> LanguageNormalizer {
        LanguageNormalizer::new(Arc::new(FixedService {
            detected,
            translated,
        }))
    }

    #[test]
    fn detects_german_by_stopwords() {
        assert_eq!(
            guess_language("Können Sie Kunden abrufen, deren Geburtstag bald ansteht?"),
            Some("de")
        );
        assert_eq!(guess_language("show revenue for march"), Some("en"));
        assert_eq!(guess_language("1234"), None);
    }

    #[tokio::test]
    async fn canonical_input_is_not_translated() {
        let normalizer = normalizer(
            Ok("en-US".to_string()),
            Err(TranslationError::Translation("must not be called".into())),
        );
        let out = normalizer.normalize("  list   upcoming classes ").await;
        assert_eq!(out.text, "list upcoming classes");
        assert_eq!(out.trace.detected.as_deref(), Some("en-US"));
        assert!(out.trace.translated.is_none());
        assert!(out.trace.fallback.is_none());
    }

    #[tokio::test]
    async fn translation_failure_falls_back_to_original() {
        let normalizer = normalizer(
            Ok("de".to_string()),
            Err(TranslationError::Translation("quota exceeded".into())),
        );
        let out = normalizer.normalize("Umsatz im März").await;
        assert_eq!(out.text, "Umsatz im März");
        assert!(out.trace.translated.is_none());
        assert!(out.trace.fallback.unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn detection_failure_falls_back_to_original() {
        let normalizer = normalizer(
            Err(TranslationError::Detection("no features".into())),
            Ok("unused".to_string()),
        );
        let out = normalizer.normalize("???").await;
        assert_eq!(out.text, "???");
        assert!(out.trace.detected.is_none());
        assert!(out.trace.fallback.is_some());
    }

    #[tokio::test]
    async fn foreign_input_uses_translation() {
        let normalizer = normalizer(
            Ok("de".to_string()),
            Ok("Revenue in  March".to_string()),
        );
        let out = normalizer.normalize("Umsatz im März").await;
        assert_eq!(out.text, "Revenue in March");
        assert_eq!(out.trace.translated.as_deref(), Some("Revenue in March"));
    }
}
