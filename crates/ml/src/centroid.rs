use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use studio_core::{Intent, IntentClassifier, IntentScore};
use tracing::warn;

use crate::vector::{centroid, cosine_similarity, rank};
use crate::EmbeddingModel;

const TEMPERATURE: f32 = 8.0;

#[derive(Debug, Deserialize)]
struct LabeledExample {
    text: String,
    intent: String,
}

/// Nearest-centroid classifier trained from `{"text": .., "intent": ..}` lines.
#[derive(Clone)]
pub struct CentroidIntentClassifier {
    model_name: &'static str,
    centroids: HashMap<Intent, Vec<f32>>,
    embedder: Arc<dyn EmbeddingModel>,
}

impl CentroidIntentClassifier {
    pub fn from_jsonl(
        path: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingModel>,
        model_name: &'static str,
    ) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "failed reading intent training dataset at {}",
                path.as_ref().display()
            )
        })?;
        Self::from_lines(&raw, embedder, model_name)
    }

    pub fn from_lines(
        raw: &str,
        embedder: Arc<dyn EmbeddingModel>,
        model_name: &'static str,
    ) -> Result<Self> {
        let mut by_intent: HashMap<Intent, Vec<Vec<f32>>> = HashMap::new();

        for (line_no, line) in raw
            .lines()
            .map(str::trim)
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
        {
            let example: LabeledExample = serde_json::from_str(line)
                .with_context(|| format!("invalid jsonl training line {}", line_no + 1))?;
            match Intent::parse(&example.intent) {
                Some(intent) => by_intent
                    .entry(intent)
                    .or_default()
                    .push(embedder.embed(&example.text)),
                None => warn!(label = %example.intent, "skipping example with unknown intent"),
            }
        }

        let centroids = by_intent
            .into_iter()
            .filter(|(_, vectors)| !vectors.is_empty())
            .map(|(intent, vectors)| (intent, centroid(&vectors)))
            .collect::<HashMap<_, _>>();

        if centroids.is_empty() {
            anyhow::bail!("training dataset produced zero intent centroids");
        }

        Ok(Self {
            model_name,
            centroids,
            embedder,
        })
    }

    pub fn trained_intents(&self) -> usize {
        self.centroids.len()
    }
}

impl IntentClassifier for CentroidIntentClassifier {
    fn model_name(&self) -> &'static str {
        self.model_name
    }

    fn classify(&self, text: &str, labels: &[Intent]) -> Vec<IntentScore> {
        let query = self.embedder.embed(text);
        let raw = labels
            .iter()
            .map(|intent| {
                let score = self
                    .centroids
                    .get(intent)
                    .map(|center| cosine_similarity(&query, center))
                    .unwrap_or(-1.0);
                (*intent, score)
            })
            .collect();
        rank(raw, TEMPERATURE)
    }
}
