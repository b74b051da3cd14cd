mod dispatcher;
pub mod tools;

use std::sync::Arc;
use std::time::Instant;

use studio_core::{
    merge_spans, IntentClassifier, IntentRouter, LanguageNormalizer, PipelineError, ProcessedQuery,
    Profile, QueryResult, QueryTrace, RoutingError, TokenTagger, ToolInput,
};
use studio_ml::MlStack;
use studio_observability::AppMetrics;
use tracing::{debug, info, instrument, warn};

pub use dispatcher::ToolDispatcher;
pub use tools::{dashboard_tools, studio_profile, support_tools, Clock};

/// Query-understanding pipeline for one profile: normalize, tag, merge,
/// extract, classify, route, dispatch.
#[derive(Clone)]
pub struct QueryPipeline {
    profile: Profile,
    normalizer: LanguageNormalizer,
    tagger: Arc<dyn TokenTagger>,
    classifier: Arc<dyn IntentClassifier>,
    router: IntentRouter,
    dispatcher: ToolDispatcher,
    metrics: Arc<AppMetrics>,
    min_confidence: Option<f32>,
}

impl QueryPipeline {
    pub fn new(
        profile: Profile,
        normalizer: LanguageNormalizer,
        tagger: Arc<dyn TokenTagger>,
        classifier: Arc<dyn IntentClassifier>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            profile,
            normalizer,
            tagger,
            classifier,
            router: IntentRouter,
            dispatcher: ToolDispatcher::new(),
            metrics,
            min_confidence: None,
        }
    }

    pub fn from_stack(profile: Profile, stack: &MlStack, metrics: Arc<AppMetrics>) -> Self {
        Self::new(
            profile,
            LanguageNormalizer::new(stack.translator.clone()),
            stack.tagger.clone(),
            stack.classifier.clone(),
            metrics,
        )
    }

    /// Rejects top intents scoring below `floor`. Off unless set.
    pub fn with_min_confidence(mut self, floor: Option<f32>) -> Self {
        self.min_confidence = floor;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: ToolDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Runs the understanding stages only: no routing, no tool call.
    #[instrument(skip(self, raw), fields(profile = %self.profile.kind()))]
    pub async fn understand(&self, raw: &str) -> Result<QueryResult, PipelineError> {
        let normalized = self.normalizer.normalize(raw).await;
        if normalized.trace.fallback.is_some() {
            self.metrics.inc_translation_fallback();
        }
        let text = normalized.text;

        let spans = self.tagger.tag(&text);
        let mut entities = merge_spans(&spans);
        let overlays = self.profile.extractor().overlay(&text, &mut entities);
        self.metrics.add_extractor_overlays(overlays);
        debug!(
            tagger = self.tagger.model_name(),
            spans = spans.len(),
            overlays,
            entities = ?entities.labels().collect::<Vec<_>>(),
            "entities resolved"
        );

        let scores = self.classifier.classify(&text, self.profile.labels());
        let top = match scores.first() {
            Some(top) => *top,
            None => {
                self.metrics.inc_routing_failure();
                return Err(RoutingError::EmptyRanking {
                    profile: self.profile.kind(),
                }
                .into());
            }
        };

        if let Some(floor) = self.min_confidence {
            if top.score < floor {
                self.metrics.inc_routing_failure();
                warn!(intent = %top.intent, score = top.score, floor, "top intent below confidence floor");
                return Err(RoutingError::BelowConfidence {
                    intent: top.intent,
                    score: top.score,
                    floor,
                }
                .into());
            }
        }

        let trace = QueryTrace {
            language: normalized.trace,
            scores,
            spans,
        };
        Ok(QueryResult::new(
            self.profile.kind(),
            text,
            top.intent,
            entities,
            trace,
        ))
    }

    #[instrument(skip(self, raw), fields(profile = %self.profile.kind()))]
    pub async fn process(&self, raw: &str) -> Result<ProcessedQuery, PipelineError> {
        let started = Instant::now();
        self.metrics.inc_query();

        let query = self.understand(raw).await?;

        let task = self
            .router
            .route(&self.profile, query.intent(), query.entities())
            .inspect_err(|_| self.metrics.inc_routing_failure())?;

        let input = ToolInput::from_bag(query.entities());
        let outcome = self.dispatcher.dispatch(&task, &input).await;
        if !outcome.is_completed() {
            self.metrics.inc_tool_failure();
        }

        let elapsed = started.elapsed();
        self.metrics.observe_latency(elapsed);
        info!(
            intent = %query.intent(),
            tool = task.tool.name(),
            completed = outcome.is_completed(),
            latency_ms = elapsed.as_millis() as u64,
            "query handled"
        );

        Ok(ProcessedQuery {
            tool: task.tool.name().to_string(),
            instruction: task.instruction,
            expected_output: task.expected_output.to_string(),
            outcome,
            query,
        })
    }
}
