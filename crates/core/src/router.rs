use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::error;

use crate::contracts::Tool;
use crate::error::RoutingError;
use crate::input::flatten_value;
use crate::models::{EntityBag, Intent, UNKNOWN_VALUE};
use crate::profile::Profile;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Replaces every `{NAME}` placeholder with the matching entity, or `Unknown`.
pub fn fill_template(template: &str, entities: &EntityBag) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            entities
                .get(&caps[1])
                .and_then(flatten_value)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
        })
        .into_owned()
}

pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

#[derive(Clone)]
pub struct RoutedTask {
    pub intent: Intent,
    pub tool: Arc<dyn Tool>,
    pub instruction: String,
    pub expected_output: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntentRouter;

impl IntentRouter {
    pub fn route(
        &self,
        profile: &Profile,
        intent: Intent,
        entities: &EntityBag,
    ) -> Result<RoutedTask, RoutingError> {
        let Some(descriptor) = profile.descriptor(intent) else {
            error!(profile = %profile.kind(), intent = %intent, "no tool descriptor for intent");
            return Err(RoutingError::MissingDescriptor {
                profile: profile.kind(),
                intent,
            });
        };

        Ok(RoutedTask {
            intent,
            tool: descriptor.tool.clone(),
            instruction: fill_template(descriptor.instruction, entities),
            expected_output: descriptor.expected_output,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::input::ToolInput;
    use crate::models::{ProfileKind, ToolOutput};

    struct Noop;

    #[async_trait]
    impl Tool for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        async fn invoke(&self, _input: &ToolInput) -> Result<ToolOutput> {
            Ok(ToolOutput::text(""))
        }
    }

    fn bound(kind: ProfileKind) -> Profile {
        let tools = kind
            .labels()
            .iter()
            .map(|intent| (*intent, Arc::new(Noop) as Arc<dyn Tool>))
            .collect::<HashMap<_, _>>();
        Profile::bind(kind, tools).expect("total binding")
    }

    #[test]
    fn missing_entities_become_unknown() {
        let bag: EntityBag = [("PER", "Priya Sharma")].into_iter().collect();
        let out = fill_template("Order {MISC} for {PER} ({EMAIL})", &bag);
        assert_eq!(out, "Order Unknown for Priya Sharma (Unknown)");
    }

    #[test]
    fn description_records_fill_placeholders() {
        let bag: EntityBag = [("STATUS", json!({ "description": "Canceled" }))]
            .into_iter()
            .collect();
        assert_eq!(
            fill_template("Filter classes with status {STATUS}", &bag),
            "Filter classes with status Canceled"
        );
    }

    #[test]
    fn every_label_routes_with_unknown_fill() {
        let router = IntentRouter;
        for kind in [ProfileKind::Support, ProfileKind::Dashboard] {
            let profile = bound(kind);
            for intent in kind.labels() {
                let task = router
                    .route(&profile, *intent, &EntityBag::new())
                    .expect("label routes");
                assert!(!task.instruction.is_empty());
                assert!(!task.instruction.contains('{'));
                let template = kind
                    .templates()
                    .iter()
                    .find(|t| t.intent == *intent)
                    .unwrap();
                let expected_unknowns = placeholders(template.instruction).len();
                assert_eq!(task.instruction.matches(UNKNOWN_VALUE).count(), expected_unknowns);
            }
        }
    }

    #[test]
    fn foreign_intent_is_a_routing_error() {
        let profile = bound(ProfileKind::Dashboard);
        let err = IntentRouter
            .route(&profile, Intent::CreateOrder, &EntityBag::new())
            .err()
            .unwrap();
        assert_eq!(
            err,
            RoutingError::MissingDescriptor {
                profile: ProfileKind::Dashboard,
                intent: Intent::CreateOrder
            }
        );
    }
}
