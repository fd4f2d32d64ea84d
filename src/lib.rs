/*!
 * # VTTwAI - WebVTT subtitles from speech, translated
 *
 * A Rust library that turns speech transcripts into WebVTT captions and
 * translates those captions into many languages concurrently.
 *
 * ## Features
 *
 * - Transcribe media through an OpenAI-compatible speech-to-text server, or
 *   read a transcript JSON produced earlier
 * - Lay words out into cues bounded by line width and line count, breaking on
 *   long pauses
 * - Optional word-by-word highlighting with `<u>` tags
 * - Bit-exact WebVTT output
 * - Concurrent per-language translation through DeepL, with failures isolated
 *   to the language that failed
 *
 * ## Architecture
 *
 * - `transcript`: typed timing model (words, segments, transcript result)
 * - `segmentation`: lazy cue production from a transcript
 * - `highlight`: per-word highlighted sub-cues
 * - `subtitle_processor`: cue model, WebVTT serialization and parsing
 * - `transcription`: speech-to-text backends
 * - `translation`: translation service and per-language fan-out
 * - `providers`: translation backend clients (DeepL, mock)
 * - `app_config`: configuration management
 * - `app_controller`: end-to-end workflows used by the CLI
 * - `file_utils`: file system operations and artifact naming
 * - `language_utils`: ISO language code utilities
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod highlight;
pub mod language_utils;
pub mod providers;
pub mod segmentation;
pub mod subtitle_processor;
pub mod transcript;
pub mod transcription;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ProviderError, SubtitleError, TranslationError};
pub use segmentation::{SegmentationOptions, segment_cues};
pub use subtitle_processor::{CaptionSet, Cue, to_webvtt};
pub use transcript::{Segment, TranscriptResult, Word};
pub use translation::{CaptionTranslator, TranslationOrchestrator, TranslationResult, TranslationService};
