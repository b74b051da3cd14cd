use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use studio_agents::{studio_profile, Clock, QueryPipeline};
use studio_core::{
    DispatchOutcome, EntityBag, Intent, IntentClassifier, IntentScore, LanguageNormalizer,
    Profile, ProfileKind, TaggedSpan, TokenTagger, Tool, ToolInput, ToolOutput, TranslationError,
    TranslationService,
};
use studio_observability::AppMetrics;
use studio_storage::{seed_dataset, MemoryStore, StudioRepository};

const BOOKING: &str = "Book Yoga Beginner for Priya Sharma, email priya@x.com, phone 9876543210";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn seeded_store() -> Arc<dyn StudioRepository> {
    Arc::new(MemoryStore::with_dataset(seed_dataset(today())))
}

struct ScriptedTagger(Vec<TaggedSpan>);

impl TokenTagger for ScriptedTagger {
    fn model_name(&self) -> &'static str {
        "scripted-tagger"
    }

    fn tag(&self, _text: &str) -> Vec<TaggedSpan> {
        self.0.clone()
    }
}

/// Always ranks `top` first, then the remaining labels with small scores.
struct ScriptedClassifier {
    top: Intent,
}

impl IntentClassifier for ScriptedClassifier {
    fn model_name(&self) -> &'static str {
        "scripted-classifier"
    }

    fn classify(&self, _text: &str, labels: &[Intent]) -> Vec<IntentScore> {
        let mut ranked = vec![IntentScore {
            intent: self.top,
            score: 0.9,
        }];
        ranked.extend(
            labels
                .iter()
                .filter(|intent| **intent != self.top)
                .map(|intent| IntentScore {
                    intent: *intent,
                    score: 0.01,
                }),
        );
        ranked
    }
}

struct ScriptedTranslator {
    detected: &'static str,
    translation: Option<&'static str>,
}

#[async_trait]
impl TranslationService for ScriptedTranslator {
    async fn detect_language(&self, _text: &str) -> Result<String, TranslationError> {
        Ok(self.detected.to_string())
    }

    async fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslationError> {
        self.translation
            .map(str::to_string)
            .ok_or_else(|| TranslationError::Translation("service unreachable".to_string()))
    }
}

fn english() -> Arc<dyn TranslationService> {
    Arc::new(ScriptedTranslator {
        detected: "en",
        translation: None,
    })
}

struct Harness {
    pipeline: QueryPipeline,
    metrics: Arc<AppMetrics>,
}

fn harness(
    profile: Profile,
    translator: Arc<dyn TranslationService>,
    spans: Vec<TaggedSpan>,
    top: Intent,
) -> Harness {
    let metrics = AppMetrics::shared();
    let pipeline = QueryPipeline::new(
        profile,
        LanguageNormalizer::new(translator),
        Arc::new(ScriptedTagger(spans)),
        Arc::new(ScriptedClassifier { top }),
        metrics.clone(),
    );
    Harness { pipeline, metrics }
}

fn bundled(kind: ProfileKind, store: Arc<dyn StudioRepository>) -> Profile {
    studio_profile(kind, store, Clock::fixed(today())).unwrap()
}

#[tokio::test]
async fn support_booking_scenario() {
    let store = seeded_store();
    let spans = vec![
        TaggedSpan::new("MISC", "Yoga", 5, 9),
        TaggedSpan::new("PER", "Pri", 23, 26),
        TaggedSpan::from_wordpiece("PER", "##ya", 26, 28),
        TaggedSpan::new("PER", "Sharma", 29, 35),
    ];
    let h = harness(
        bundled(ProfileKind::Support, store.clone()),
        english(),
        spans,
        Intent::CreateOrder,
    );

    let processed = h.pipeline.process(BOOKING).await.unwrap();

    let expected: EntityBag = [
        ("MISC", "Yoga Beginner"),
        ("PER", "Priya Sharma"),
        ("EMAIL", "priya@x.com"),
        ("PHONE", "9876543210"),
    ]
    .into_iter()
    .collect();
    assert_eq!(processed.query.entities(), &expected);
    assert_eq!(
        processed.instruction,
        "Create an order for Yoga Beginner for client Priya Sharma with email priya@x.com and phone number 9876543210"
    );
    assert!(processed.final_text().starts_with("Order created"));

    let orders = store.orders_for_client("client_001").await.unwrap();
    assert_eq!(orders.last().unwrap().service_name, "Yoga Beginner");
    assert_eq!(h.metrics.snapshot().extractor_overlays_total, 3);
}

#[tokio::test]
async fn dashboard_class_id_comes_from_extractor() {
    let h = harness(
        bundled(ProfileKind::Dashboard, seeded_store()),
        english(),
        Vec::new(),
        Intent::GetAttendanceReport,
    );

    let processed = h.pipeline.process("attendance for class_22").await.unwrap();

    assert_eq!(processed.query.entities().get_str("CLASS_ID"), Some("class_22"));
    assert_eq!(processed.query.entities().len(), 1);
    assert!(processed
        .final_text()
        .starts_with("Attendance Percentage for class_22:"));
}

#[tokio::test]
async fn translated_query_feeds_extractors() {
    let h = harness(
        bundled(ProfileKind::Dashboard, seeded_store()),
        Arc::new(ScriptedTranslator {
            detected: "de",
            translation: Some("Show revenue for march 2024"),
        }),
        Vec::new(),
        Intent::GetRevenueMetrics,
    );

    let processed = h.pipeline.process("Umsatz für März 2024").await.unwrap();

    let trace = &processed.query.trace().language;
    assert_eq!(trace.detected.as_deref(), Some("de"));
    assert_eq!(trace.translated.as_deref(), Some("Show revenue for march 2024"));
    assert_eq!(processed.query.entities().get_str("MONTH"), Some("March"));
    assert_eq!(processed.query.entities().get_str("YEAR"), Some("2024"));
    assert!(processed
        .final_text()
        .starts_with("Total revenue for March 2024: "));
}

#[tokio::test]
async fn translation_failure_keeps_original_text() {
    let h = harness(
        bundled(ProfileKind::Dashboard, seeded_store()),
        Arc::new(ScriptedTranslator {
            detected: "fr",
            translation: None,
        }),
        Vec::new(),
        Intent::GetActiveInactiveClientInsights,
    );

    let processed = h
        .pipeline
        .process("Combien de clients actifs ce mois")
        .await
        .unwrap();

    assert_eq!(processed.query.text(), "Combien de clients actifs ce mois");
    assert!(processed.query.trace().language.fallback.is_some());
    assert_eq!(processed.final_text(), "Active clients: 17, Inactive clients: 8");
    assert_eq!(h.metrics.snapshot().translation_fallbacks_total, 1);
}

#[tokio::test]
async fn missing_entities_fill_unknown_and_tool_treats_them_as_absent() {
    let h = harness(
        bundled(ProfileKind::Dashboard, seeded_store()),
        english(),
        Vec::new(),
        Intent::GetRevenueMetrics,
    );

    let processed = h.pipeline.process("how much did we earn").await.unwrap();

    assert_eq!(
        processed.instruction,
        "Get revenue for month Unknown, and year Unknown using the Revenue Metrics tool"
    );
    assert!(processed.final_text().starts_with("Total revenue: "));
}

#[tokio::test]
async fn support_refusal_is_a_normal_result() {
    let h = harness(
        bundled(ProfileKind::Support, seeded_store()),
        english(),
        vec![TaggedSpan::new("PER", "Divya", 22, 27)],
        Intent::CreateEnquiry,
    );

    let processed = h
        .pipeline
        .process("Create an enquiry for Divya")
        .await
        .unwrap();

    assert!(processed.outcome.is_completed());
    assert_eq!(
        processed.final_text(),
        "Missing contact information to create enquiry."
    );
}

struct BrokenTool {
    panics: bool,
}

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn invoke(&self, _input: &ToolInput) -> Result<ToolOutput> {
        if self.panics {
            panic!("tool state corrupted");
        }
        bail!("upstream store timed out")
    }
}

fn broken_profile(panics: bool) -> Profile {
    let tools = ProfileKind::Dashboard
        .labels()
        .iter()
        .map(|intent| (*intent, Arc::new(BrokenTool { panics }) as Arc<dyn Tool>))
        .collect::<HashMap<_, _>>();
    Profile::bind(ProfileKind::Dashboard, tools).unwrap()
}

#[tokio::test]
async fn failing_tools_yield_no_result() {
    for panics in [false, true] {
        let h = harness(
            broken_profile(panics),
            english(),
            Vec::new(),
            Intent::GetOutstandingPayment,
        );

        let processed = h.pipeline.process("outstanding dues").await.unwrap();

        assert!(matches!(processed.outcome, DispatchOutcome::NoResult { .. }));
        assert_eq!(
            processed.final_text(),
            "No result could be produced for this request."
        );
        assert_eq!(h.metrics.snapshot().tool_failures_total, 1);
    }
}

#[tokio::test]
async fn coerced_list_input_reaches_revenue_tool() {
    let profile = bundled(ProfileKind::Dashboard, seeded_store());
    let descriptor = profile.descriptor(Intent::GetRevenueMetrics).unwrap();

    let raw = json!(r#"[{"MONTH": {"description": "Jan", "type": "str"}}, {"YEAR": "2024"}]"#);
    let output = descriptor
        .tool
        .invoke(&ToolInput::coerce(&raw))
        .await
        .unwrap();

    assert!(output.to_string().starts_with("Total revenue for January 2024: "));
}

#[tokio::test]
async fn profiles_run_concurrently_over_one_store() {
    let store = seeded_store();
    let support = harness(
        bundled(ProfileKind::Support, store.clone()),
        english(),
        Vec::new(),
        Intent::ListUpcomingClasses,
    );
    let dashboard = harness(
        bundled(ProfileKind::Dashboard, store),
        english(),
        Vec::new(),
        Intent::GetOutstandingPayment,
    );

    let (classes, dues) = tokio::join!(
        support.pipeline.process("list upcoming classes"),
        dashboard.pipeline.process("outstanding payments")
    );

    assert!(matches!(
        classes.unwrap().outcome.output(),
        Some(ToolOutput::Structured(_))
    ));
    assert!(dues
        .unwrap()
        .final_text()
        .starts_with("Total outstanding payments amount: "));
}
