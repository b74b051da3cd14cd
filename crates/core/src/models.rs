use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Sentinel substituted for placeholders that have no entity value.
pub const UNKNOWN_VALUE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Support,
    Dashboard,
}

impl ProfileKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "support" | "support_agent" => Some(Self::Support),
            "dashboard" | "dashboard_agent" | "analytics" => Some(Self::Dashboard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateOrder,
    CreateEnquiry,
    ListUpcomingClasses,
    GetClientInfo,
    GetClientServices,
    FilterClassesByInstructor,
    FilterClassesByStatus,
    GetRevenueMetrics,
    GetOutstandingPayment,
    GetActiveInactiveClientInsights,
    GetClientBirthdayReminder,
    GetNewClientsThisMonth,
    GetServiceAnalytics,
    GetAttendanceReport,
}

impl Intent {
    pub const ALL: [Intent; 14] = [
        Intent::CreateOrder,
        Intent::CreateEnquiry,
        Intent::ListUpcomingClasses,
        Intent::GetClientInfo,
        Intent::GetClientServices,
        Intent::FilterClassesByInstructor,
        Intent::FilterClassesByStatus,
        Intent::GetRevenueMetrics,
        Intent::GetOutstandingPayment,
        Intent::GetActiveInactiveClientInsights,
        Intent::GetClientBirthdayReminder,
        Intent::GetNewClientsThisMonth,
        Intent::GetServiceAnalytics,
        Intent::GetAttendanceReport,
    ];

    pub fn as_label(self) -> &'static str {
        match self {
            Self::CreateOrder => "create_order",
            Self::CreateEnquiry => "create_enquiry",
            Self::ListUpcomingClasses => "list_upcoming_classes",
            Self::GetClientInfo => "get_client_info",
            Self::GetClientServices => "get_client_services",
            Self::FilterClassesByInstructor => "filter_classes_by_instructor",
            Self::FilterClassesByStatus => "filter_classes_by_status",
            Self::GetRevenueMetrics => "get_revenue_metrics",
            Self::GetOutstandingPayment => "get_outstanding_payment",
            Self::GetActiveInactiveClientInsights => "get_active_inactive_client_insights",
            Self::GetClientBirthdayReminder => "get_client_birthday_reminder",
            Self::GetNewClientsThisMonth => "get_new_clients_this_month",
            Self::GetServiceAnalytics => "get_service_analytics",
            Self::GetAttendanceReport => "get_attendance_report",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_label() == wanted)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One labelled fragment emitted by a token tagger. Offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub label: String,
    pub text: String,
    pub continuation: bool,
    pub start: usize,
    pub end: usize,
}

impl TaggedSpan {
    pub fn new(label: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            continuation: false,
            start,
            end,
        }
    }

    pub fn continuation(mut self) -> Self {
        self.continuation = true;
        self
    }

    /// Builds a span from a WordPiece token, where a `##` prefix marks a sub-word piece.
    pub fn from_wordpiece(label: impl Into<String>, word: &str, start: usize, end: usize) -> Self {
        let continuation = word.starts_with("##");
        Self {
            label: label.into(),
            text: word.replace("##", ""),
            continuation,
            start,
            end,
        }
    }
}

/// Ordered label -> value map. Re-inserting a label replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityBag {
    entries: Vec<(String, Value)>,
}

impl EntityBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == label) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((label, value));
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, label: &str) -> Option<&str> {
        self.get(label).and_then(Value::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for EntityBag
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = EntityBag::new();
        for (label, value) in iter {
            bag.insert(label, value);
        }
        bag
    }
}

impl Serialize for EntityBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: Intent,
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageTrace {
    pub detected: Option<String>,
    pub translated: Option<String>,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryTrace {
    pub language: LanguageTrace,
    pub scores: Vec<IntentScore>,
    pub spans: Vec<TaggedSpan>,
}

/// Structured understanding of one query. Built once, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    profile: ProfileKind,
    text: String,
    intent: Intent,
    entities: EntityBag,
    trace: QueryTrace,
}

impl QueryResult {
    pub fn new(
        profile: ProfileKind,
        text: String,
        intent: Intent,
        entities: EntityBag,
        trace: QueryTrace,
    ) -> Self {
        Self {
            profile,
            text,
            intent,
            entities,
            trace,
        }
    }

    pub fn profile(&self) -> ProfileKind {
        self.profile
    }

    /// Canonical-language text the entities were extracted from.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn entities(&self) -> &EntityBag {
        &self.entities
    }

    pub fn trace(&self) -> &QueryTrace {
        &self.trace
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ToolOutput {
    Text(String),
    Structured(Value),
}

impl ToolOutput {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Structured(value) => {
                let rendered = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Completed { output: ToolOutput },
    NoResult { reason: String },
}

impl DispatchOutcome {
    pub fn output(&self) -> Option<&ToolOutput> {
        match self {
            Self::Completed { output } => Some(output),
            Self::NoResult { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Final record of one pipeline run: understanding, routing and the tool outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedQuery {
    pub query: QueryResult,
    pub tool: String,
    pub instruction: String,
    pub expected_output: String,
    pub outcome: DispatchOutcome,
}

impl ProcessedQuery {
    pub fn final_text(&self) -> String {
        match &self.outcome {
            DispatchOutcome::Completed { output } => output.to_string(),
            DispatchOutcome::NoResult { .. } => {
                "No result could be produced for this request.".to_string()
            }
        }
    }
}
