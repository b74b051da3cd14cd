pub mod contracts;
pub mod error;
pub mod extract;
pub mod input;
pub mod models;
pub mod normalize;
pub mod profile;
pub mod router;
pub mod spans;

pub use contracts::{IntentClassifier, TokenTagger, Tool, TranslationService};
pub use error::{PipelineError, ProfileError, RoutingError, TranslationError};
pub use extract::{DomainExtractor, EntityKind};
pub use input::ToolInput;
pub use models::*;
pub use normalize::{guess_language, normalize_text, LanguageNormalizer, NormalizedText};
pub use profile::{Profile, ToolDescriptor};
pub use router::{fill_template, IntentRouter, RoutedTask};
pub use spans::merge_spans;
