use std::collections::HashMap;
use std::sync::Arc;

use studio_core::{Intent, IntentClassifier, IntentScore};

use crate::vector::{centroid, cosine_similarity, rank};
use crate::EmbeddingModel;

const TEMPERATURE: f32 = 8.0;

const SEED_PHRASES: &[(Intent, &[&str])] = &[
    (
        Intent::CreateOrder,
        &[
            "book a class for client",
            "create an order",
            "enroll client in course",
            "sign up for service",
            "buy purchase book yoga pilates zumba",
        ],
    ),
    (
        Intent::CreateEnquiry,
        &[
            "create an enquiry",
            "new enquiry about",
            "interested in joining lead",
            "wants information about enquiry inquiry",
        ],
    ),
    (
        Intent::ListUpcomingClasses,
        &[
            "list upcoming classes",
            "show available classes",
            "what classes are scheduled next",
            "upcoming sessions",
        ],
    ),
    (
        Intent::GetClientInfo,
        &[
            "get client info",
            "fetch client details",
            "show client profile",
            "information about client contact details",
        ],
    ),
    (
        Intent::GetClientServices,
        &[
            "services for client",
            "what services has client bought",
            "client orders purchased",
            "courses enrolled by client",
        ],
    ),
    (
        Intent::FilterClassesByInstructor,
        &[
            "classes by instructor",
            "classes taught by",
            "instructor schedule",
            "filter classes by trainer teacher",
        ],
    ),
    (
        Intent::FilterClassesByStatus,
        &[
            "classes with status",
            "show canceled classes",
            "completed classes ongoing",
            "filter classes by status",
        ],
    ),
    (
        Intent::GetRevenueMetrics,
        &[
            "revenue for month",
            "total revenue",
            "how much money earned income",
            "revenue in march 2024 year",
        ],
    ),
    (
        Intent::GetOutstandingPayment,
        &[
            "outstanding payments",
            "pending payments",
            "unpaid dues",
            "how much is owed outstanding amount",
        ],
    ),
    (
        Intent::GetActiveInactiveClientInsights,
        &[
            "active vs inactive clients",
            "how many active clients",
            "inactive client count",
        ],
    ),
    (
        Intent::GetClientBirthdayReminder,
        &[
            "upcoming client birthdays",
            "birthday reminders",
            "whose birthday is coming soon",
        ],
    ),
    (
        Intent::GetNewClientsThisMonth,
        &[
            "new clients this month",
            "clients who joined this month",
            "recent signups new members",
        ],
    ),
    (
        Intent::GetServiceAnalytics,
        &[
            "service analytics",
            "top services",
            "enrollment trends",
            "most popular courses analytics",
        ],
    ),
    (
        Intent::GetAttendanceReport,
        &[
            "attendance report",
            "attendance percentage for class",
            "drop off rate",
            "class attendance",
        ],
    ),
];

/// Zero-shot style ranking against built-in seed phrases for every intent.
#[derive(Clone)]
pub struct KeywordIntentClassifier {
    centroids: HashMap<Intent, Vec<f32>>,
    embedder: Arc<dyn EmbeddingModel>,
}

impl KeywordIntentClassifier {
    pub fn new(embedder: Arc<dyn EmbeddingModel>) -> Self {
        let centroids = SEED_PHRASES
            .iter()
            .map(|(intent, phrases)| {
                let vectors = phrases
                    .iter()
                    .map(|phrase| embedder.embed(phrase))
                    .collect::<Vec<_>>();
                (*intent, centroid(&vectors))
            })
            .collect();
        Self {
            centroids,
            embedder,
        }
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn model_name(&self) -> &'static str {
        "keyword-intent"
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
                    .unwrap_or(0.0);
                (*intent, score)
            })
            .collect();
        rank(raw, TEMPERATURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashEmbeddingModel;

    fn classifier() -> KeywordIntentClassifier {
        KeywordIntentClassifier::new(Arc::new(HashEmbeddingModel::new(256)))
    }

    #[test]
    fn every_intent_has_seed_phrases() {
        for intent in Intent::ALL {
            assert!(SEED_PHRASES.iter().any(|(seeded, _)| *seeded == intent));
        }
    }

    #[test]
    fn dashboard_queries_rank_expected_intent_first() {
        let labels = [
            Intent::GetRevenueMetrics,
            Intent::GetOutstandingPayment,
            Intent::GetAttendanceReport,
            Intent::GetClientBirthdayReminder,
        ];
        let clf = classifier();
        assert_eq!(
            clf.classify("total revenue for march", &labels)[0].intent,
            Intent::GetRevenueMetrics
        );
        assert_eq!(
            clf.classify("attendance report for class_22", &labels)[0].intent,
            Intent::GetAttendanceReport
        );
        assert_eq!(
            clf.classify("any birthday reminders?", &labels)[0].intent,
            Intent::GetClientBirthdayReminder
        );
    }

    #[test]
    fn empty_label_set_ranks_nothing() {
        assert!(classifier().classify("anything", &[]).is_empty());
    }
}
