mod centroid;
mod fallback;
mod keyword;
mod tagger;
mod translate;
mod vector;

use std::path::PathBuf;
use std::sync::Arc;

use studio_core::{IntentClassifier, TokenTagger, TranslationService};
use tracing::{info, warn};

pub use centroid::CentroidIntentClassifier;
pub use fallback::HashEmbeddingModel;
pub use keyword::KeywordIntentClassifier;
pub use tagger::{HeuristicTagger, MISC_LABEL};
pub use translate::{LibreTranslateClient, OfflineTranslator};

const EMBEDDING_DIMS: usize = 192;

pub trait EmbeddingModel: Send + Sync {
    fn model_name(&self) -> &'static str;
    fn embed(&self, text: &str) -> Vec<f32>;
}

#[derive(Debug, Clone, Default)]
pub struct MlConfig {
    pub intent_dataset: Option<PathBuf>,
    pub translate_url: Option<String>,
    pub translate_api_key: Option<String>,
}

/// Collaborators shared by every profile pipeline.
#[derive(Clone)]
pub struct MlStack {
    pub tagger: Arc<dyn TokenTagger>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub translator: Arc<dyn TranslationService>,
}

impl MlStack {
    pub fn load(config: &MlConfig) -> Self {
        let embedder: Arc<dyn EmbeddingModel> = Arc::new(HashEmbeddingModel::new(EMBEDDING_DIMS));

        let classifier: Arc<dyn IntentClassifier> = match &config.intent_dataset {
            Some(path) => match CentroidIntentClassifier::from_jsonl(
                path,
                embedder.clone(),
                "fallback-centroid-intent",
            ) {
                Ok(clf) => Arc::new(clf),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "intent dataset unusable; using keyword classifier");
                    Arc::new(KeywordIntentClassifier::new(embedder.clone()))
                }
            },
            None => Arc::new(KeywordIntentClassifier::new(embedder.clone())),
        };

        let translator: Arc<dyn TranslationService> = match &config.translate_url {
            Some(url) => match LibreTranslateClient::new(url.as_str(), config.translate_api_key.clone()) {
                Ok(client) => Arc::new(client),
                Err(err) => {
                    warn!(url = %url, error = %err, "translation client unavailable; running offline");
                    Arc::new(OfflineTranslator)
                }
            },
            None => Arc::new(OfflineTranslator),
        };

        info!(
            embedder = embedder.model_name(),
            classifier = classifier.model_name(),
            "ml stack loaded"
        );

        Self {
            tagger: Arc::new(HeuristicTagger),
            classifier,
            translator,
        }
    }

    pub fn offline() -> Self {
        Self::load(&MlConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dataset_falls_back_to_keywords() {
        let stack = MlStack::load(&MlConfig {
            intent_dataset: Some(PathBuf::from("/nonexistent/intents.jsonl")),
            ..MlConfig::default()
        });
        assert_eq!(stack.classifier.model_name(), "keyword-intent");
        assert_eq!(stack.tagger.model_name(), "heuristic-tagger");
    }

    #[test]
    fn dataset_trains_centroid_classifier() {
        let path = std::env::temp_dir().join(format!("studio-intents-{}.jsonl", std::process::id()));
        std::fs::write(
            &path,
            "{\"text\": \"book a yoga class\", \"intent\": \"create_order\"}\n",
        )
        .unwrap();

        let stack = MlStack::load(&MlConfig {
            intent_dataset: Some(path.clone()),
            ..MlConfig::default()
        });
        std::fs::remove_file(&path).ok();

        assert_eq!(stack.classifier.model_name(), "fallback-centroid-intent");
    }
}
