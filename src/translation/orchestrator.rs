/*!
 * Per-language fan-out of caption translation.
 *
 * Every requested language gets its own tokio task. A job that errors, panics
 * or runs past its deadline is logged and dropped from the result; its siblings
 * keep running and the call always returns once every job has settled.
 *
 * The deadline covers the translation request only. Once texts are back, the
 * caption file is always written to completion, so a file on disk is never
 * missing from the result.
 */

use futures::FutureExt;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::subtitle_processor::CaptionSet;
use crate::translation::core::CaptionTranslator;

/// Callback invoked as `(settled_jobs, total_jobs)` whenever a job settles
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Artifacts of the languages that translated successfully
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    /// Externally reachable address of each translated caption file
    pub locator_by_language: BTreeMap<String, String>,

    /// Local path of each translated caption file
    pub path_by_language: BTreeMap<String, PathBuf>,
}

impl TranslationResult {
    pub fn is_empty(&self) -> bool {
        self.locator_by_language.is_empty()
    }

    /// Number of languages that succeeded
    pub fn len(&self) -> usize {
        self.locator_by_language.len()
    }

    fn insert(&mut self, artifact: LanguageArtifact) {
        self.locator_by_language.insert(artifact.language.clone(), artifact.locator);
        self.path_by_language.insert(artifact.language, artifact.path);
    }
}

/// Output of one successful job
#[derive(Debug)]
struct LanguageArtifact {
    language: String,
    locator: String,
    path: PathBuf,
}

/// Fans a caption set out to several target languages
pub struct TranslationOrchestrator {
    translator: Arc<dyn CaptionTranslator>,
    server_url: String,
    job_timeout: Option<Duration>,
    progress: Option<ProgressCallback>,
}

impl TranslationOrchestrator {
    /// Create an orchestrator; locators are built under `server_url`
    pub fn new(translator: Arc<dyn CaptionTranslator>, server_url: impl Into<String>) -> Self {
        Self {
            translator,
            server_url: server_url.into(),
            job_timeout: None,
            progress: None,
        }
    }

    /// Give up on a language whose translation takes longer than `timeout`
    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Normalize requested codes, dropping invalid ones and duplicates
    fn target_languages(languages: &[String]) -> BTreeSet<String> {
        languages
            .iter()
            .filter_map(|code| match language_utils::normalize_language_key(code) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!("Skipping target language '{}': {}", code, e);
                    None
                }
            })
            .collect()
    }

    /// Translate `source` into every language in `languages`.
    ///
    /// Never fails: languages whose job failed are absent from the result.
    /// Result keys are the normalized codes (lower case, `-` separated), so a
    /// request for `DE` or `pt_BR` is found under `de` or `pt-br`.
    pub async fn translate(&self, source: Arc<CaptionSet>, languages: &[String]) -> TranslationResult {
        let targets = Self::target_languages(languages);
        let total = targets.len();
        let start_time = Instant::now();

        if total == 0 {
            warn!("No valid target languages requested");
            return TranslationResult::default();
        }

        info!("Translating {} cues into {} languages", source.cues.len(), total);

        let result = Arc::new(Mutex::new(TranslationResult::default()));
        let settled = Arc::new(AtomicUsize::new(0));
        let mut jobs = JoinSet::new();

        for language in targets {
            let translator = Arc::clone(&self.translator);
            let source = Arc::clone(&source);
            let server_url = self.server_url.clone();
            let job_timeout = self.job_timeout;
            let result = Arc::clone(&result);
            let settled = Arc::clone(&settled);
            let progress = self.progress.clone();

            jobs.spawn(async move {
                let job = translate_language(translator, source, language.clone(), server_url, job_timeout);
                let outcome = run_isolated(job).await;

                match outcome {
                    Ok(artifact) => {
                        debug!("Translation to '{}' written to {}", language, artifact.path.display());
                        result.lock().insert(artifact);
                    }
                    Err(e) => error!("Translation to '{}' failed: {}", language, e),
                }

                let done = settled.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(progress) = progress {
                    progress(done, total);
                }
            });
        }

        while let Some(joined) = jobs.join_next().await {
            // Jobs catch their own panics; this only fires on runtime shutdown
            if let Err(e) = joined {
                error!("Translation task did not complete: {}", e);
            }
        }

        let result = Arc::try_unwrap(result)
            .map(|shared| shared.into_inner())
            .unwrap_or_else(|shared| shared.lock().clone());

        info!(
            "Translated into {}/{} languages in {:.1}s",
            result.len(),
            total,
            start_time.elapsed().as_secs_f64()
        );

        result
    }
}

/// Run one job, turning a panic into an error
async fn run_isolated<F>(job: F) -> Result<LanguageArtifact, TranslationError>
where
    F: std::future::Future<Output = Result<LanguageArtifact, TranslationError>> + Send,
{
    AssertUnwindSafe(job)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(TranslationError::JobAborted(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "job panicked".to_string()
    }
}

/// Translate, write and locate one language's caption file
async fn translate_language(
    translator: Arc<dyn CaptionTranslator>,
    source: Arc<CaptionSet>,
    language: String,
    server_url: String,
    job_timeout: Option<Duration>,
) -> Result<LanguageArtifact, TranslationError> {
    let texts = source.texts();
    let language_name = language_utils::get_language_name(&language).unwrap_or_else(|_| language.clone());
    debug!("Translating {} cues into {}", texts.len(), language_name);

    let request = translator.translate_texts(&texts, &language);
    let translated_texts = match job_timeout {
        Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| TranslationError::Timeout {
            language: language.clone(),
            seconds: limit.as_secs(),
        })??,
        None => request.await?,
    };

    let path = FileManager::translated_output_path(&source.source_path, &language);
    let translated = source.with_translated_texts(translated_texts, &path)?;

    tokio::task::spawn_blocking(move || translated.save())
        .await
        .map_err(|e| TranslationError::JobAborted(format!("writing captions: {}", e)))??;

    let locator = FileManager::artifact_locator(&server_url, &path);

    Ok(LanguageArtifact { language, locator, path })
}
