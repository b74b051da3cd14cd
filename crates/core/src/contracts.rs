use anyhow::Result;
use async_trait::async_trait;

use crate::error::TranslationError;
use crate::input::ToolInput;
use crate::models::{Intent, IntentScore, TaggedSpan, ToolOutput};

/// Produces ordered, position-bounded labelled spans over canonical text.
pub trait TokenTagger: Send + Sync {
    fn model_name(&self) -> &'static str;
    fn tag(&self, text: &str) -> Vec<TaggedSpan>;
}

/// Ranks the given closed label set against the text, highest score first.
pub trait IntentClassifier: Send + Sync {
    fn model_name(&self) -> &'static str;
    fn classify(&self, text: &str, labels: &[Intent]) -> Vec<IntentScore>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn detect_language(&self, text: &str) -> Result<String, TranslationError>;
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError>;
}

/// An operation bound to one intent. Receives the normalized entity mapping.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    async fn invoke(&self, input: &ToolInput) -> Result<ToolOutput>;
}
