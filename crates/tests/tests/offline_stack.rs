use std::sync::Arc;

use chrono::NaiveDate;
use studio_agents::{studio_profile, Clock, QueryPipeline};
use studio_core::{Intent, ProfileKind};
use studio_ml::MlStack;
use studio_observability::AppMetrics;
use studio_storage::{seed_dataset, MemoryStore, StudioRepository};

fn pipeline(kind: ProfileKind) -> QueryPipeline {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let store: Arc<dyn StudioRepository> =
        Arc::new(MemoryStore::with_dataset(seed_dataset(today)));
    let profile = studio_profile(kind, store, Clock::fixed(today)).unwrap();
    QueryPipeline::from_stack(profile, &MlStack::offline(), AppMetrics::shared())
}

#[tokio::test]
async fn offline_stack_understands_a_booking() {
    let query = pipeline(ProfileKind::Support)
        .understand("Book Yoga Beginner for Priya Sharma, email priya@x.com, phone 9876543210")
        .await
        .unwrap();

    assert_eq!(query.intent(), Intent::CreateOrder);
    let entities = query.entities();
    assert_eq!(entities.get_str("MISC"), Some("Yoga Beginner"));
    assert_eq!(entities.get_str("PER"), Some("Priya Sharma"));
    assert_eq!(entities.get_str("EMAIL"), Some("priya@x.com"));
    assert_eq!(entities.get_str("PHONE"), Some("9876543210"));
}

#[tokio::test]
async fn offline_stack_answers_revenue_question() {
    let processed = pipeline(ProfileKind::Dashboard)
        .process("What was the revenue in March 2024?")
        .await
        .unwrap();

    assert_eq!(processed.query.intent(), Intent::GetRevenueMetrics);
    assert!(processed
        .final_text()
        .starts_with("Total revenue for March 2024: "));
}

#[tokio::test]
async fn offline_stack_keeps_untranslatable_text() {
    let query = pipeline(ProfileKind::Dashboard)
        .understand("Wie viele Kunden sind aktiv und nicht inaktiv?")
        .await
        .unwrap();

    let language = &query.trace().language;
    assert_eq!(language.detected.as_deref(), Some("de"));
    assert!(language.translated.is_none());
    assert!(language.fallback.is_some());
    assert_eq!(query.text(), "Wie viele Kunden sind aktiv und nicht inaktiv?");
}
