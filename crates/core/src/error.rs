use thiserror::Error;

use crate::models::{Intent, ProfileKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("no tool descriptor for intent `{intent}` in the {profile} profile")]
    MissingDescriptor { profile: ProfileKind, intent: Intent },
    #[error("classifier returned no ranked intent for the {profile} profile")]
    EmptyRanking { profile: ProfileKind },
    #[error("top intent `{intent}` scored {score:.3}, below the configured floor {floor:.3}")]
    BelowConfidence {
        intent: Intent,
        score: f32,
        floor: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslationError {
    #[error("language detection failed: {0}")]
    Detection(String),
    #[error("translation failed: {0}")]
    Translation(String),
    #[error("no translation backend available for `{source_lang}` -> `{target_lang}`")]
    Unavailable {
        source_lang: String,
        target_lang: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("intent `{intent}` of the {profile} profile has no bound tool")]
    Unbound { profile: ProfileKind, intent: Intent },
    #[error("tool bound to `{intent}` is not part of the {profile} label set")]
    Foreign { profile: ProfileKind, intent: Intent },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Routing(#[from] RoutingError),
}
