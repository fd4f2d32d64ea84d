use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::segmentation::{SegmentationOptions, segment_cues};
use crate::subtitle_processor::{CaptionSet, write_cues_to_vtt};
use crate::transcript::TranscriptResult;
use crate::transcription::{self, JsonTranscriptBackend, TranscriptionBackend};
use crate::translation::{CaptionTranslator, TranslationOrchestrator, TranslationResult, TranslationService};

// @module: Application controller for transcription, captioning and translation

/// A source-language caption file produced by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleArtifact {
    /// Where the caption file was written
    pub path: PathBuf,
    /// Externally reachable address of the caption file
    pub locator: String,
    /// Spoken language of the transcript
    pub language: String,
    /// Number of cues written
    pub cue_count: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Self {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read or produce a transcript for an input file.
    ///
    /// Transcript JSON is read as is; media goes to the configured backend.
    pub async fn load_transcript(&self, input_file: &Path) -> Result<TranscriptResult> {
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        match FileManager::detect_file_type(input_file) {
            FileType::Transcript => JsonTranscriptBackend.transcribe(input_file).await,
            FileType::Media => {
                let backend = transcription::backend_from_config(&self.config.transcription)?;
                info!("Transcribing {:?} with {}", input_file, backend.name());
                backend.transcribe(input_file).await
            }
            FileType::Subtitle | FileType::Unknown => Err(anyhow!(
                "Unsupported input {:?}: expected a transcript JSON or one of {:?}",
                input_file,
                crate::file_utils::ALLOWED_MEDIA_EXTENSIONS
            )),
        }
    }

    /// Segment a transcript and write it as a WebVTT file.
    ///
    /// The transcript is validated first; any write failure is returned.
    pub fn write_subtitles(
        &self,
        transcript: &TranscriptResult,
        output_path: &Path,
        options: &SegmentationOptions,
    ) -> Result<usize> {
        transcript.validate()?;

        let cues: Vec<_> = segment_cues(transcript, options).collect();
        write_cues_to_vtt(&cues, output_path)?;

        info!("Wrote {} cues to {:?}", cues.len(), output_path);
        Ok(cues.len())
    }

    /// Produce `<stem>-subtitles.vtt` for a media file or transcript JSON
    pub async fn generate_subtitles(
        &self,
        input_file: &Path,
        output_dir: &Path,
        options: &SegmentationOptions,
        force_overwrite: bool,
    ) -> Result<SubtitleArtifact> {
        let start_time = Instant::now();

        FileManager::ensure_dir(output_dir)?;
        let output_path = FileManager::subtitle_output_path(input_file, output_dir);
        if output_path.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {:?} (use --force-overwrite to replace it)",
                output_path
            ));
        }

        let transcript = self.load_transcript(input_file).await?;
        let cue_count = self
            .write_subtitles(&transcript, &output_path, options)
            .with_context(|| format!("Failed to write subtitles for {:?}", input_file))?;

        info!("Subtitles ready in {:.1}s", start_time.elapsed().as_secs_f64());

        Ok(SubtitleArtifact {
            locator: FileManager::artifact_locator(&self.config.output.get_server_url(), &output_path),
            path: output_path,
            language: transcript.language,
            cue_count,
        })
    }

    /// Translate a WebVTT file into every requested language, with a progress bar
    pub async fn translate_subtitles(&self, vtt_file: &Path, languages: &[String]) -> Result<TranslationResult> {
        self.config.validate_for_translation()?;

        let source = CaptionSet::from_file(vtt_file)
            .with_context(|| format!("Failed to read captions from {:?}", vtt_file))?;
        let service = TranslationService::new(self.config.translation.clone())?;
        service
            .test_connection()
            .await
            .with_context(|| format!("{} is not reachable", self.config.translation.provider.display_name()))?;

        info!("{} translation of {:?}", self.config.translation.provider.display_name(), vtt_file);

        let progress_bar = ProgressBar::new(languages.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} languages {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let result = self
            .translate_caption_set_with(source, languages, Arc::new(service), move |done, total| {
                pb.set_length(total as u64);
                pb.set_position(done as u64);
            })
            .await;

        progress_bar.finish_and_clear();

        if result.is_empty() {
            warn!("No language could be translated");
        }
        Ok(result)
    }

    /// Remove artifacts once `output.cleanup_after_secs` has passed; returns at
    /// once when no delay is configured
    pub async fn cleanup_artifacts(&self, paths: Vec<PathBuf>) {
        let Some(secs) = self.config.output.cleanup_after_secs else {
            return;
        };

        info!("Removing {} artifacts in {}s", paths.len(), secs);
        FileManager::remove_files_after(paths, Duration::from_secs(secs)).await;
    }

    /// Fan a caption set out through the given translator
    pub async fn translate_caption_set_with<F>(
        &self,
        source: CaptionSet,
        languages: &[String],
        translator: Arc<dyn CaptionTranslator>,
        on_progress: F,
    ) -> TranslationResult
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        let orchestrator = TranslationOrchestrator::new(translator, self.config.output.get_server_url())
            .with_job_timeout(self.config.translation.job_timeout_secs.map(Duration::from_secs))
            .with_progress(Arc::new(on_progress));

        orchestrator.translate(Arc::new(source), languages).await
    }
}
