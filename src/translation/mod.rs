/*!
 * Caption translation.
 *
 * - `core`: the translation service that batches cue texts for one language
 * - `orchestrator`: concurrent fan-out of a caption set to many languages
 */

pub use self::core::{CaptionTranslator, TranslationService};
pub use self::orchestrator::{ProgressCallback, TranslationOrchestrator, TranslationResult};

pub mod core;
pub mod orchestrator;
