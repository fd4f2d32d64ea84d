use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, error, info};

// @module: File and directory utilities

/// Media extensions accepted for transcription
pub const ALLOWED_MEDIA_EXTENSIONS: [&str; 4] = ["mp3", "m4a", "mp4", "mov"];

/// Kinds of input the CLI accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Audio or video to transcribe
    Media,
    /// Transcript JSON produced earlier
    Transcript,
    /// WebVTT caption file
    Subtitle,
    Unknown,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Lower-case extension of a path or URL, if any
    fn extension_of(name: &str) -> Option<String> {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }

    // @checks: Extension is one of the accepted media types
    pub fn allowed_media_extension(name: &str) -> bool {
        Self::extension_of(name)
            .is_some_and(|ext| ALLOWED_MEDIA_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Classify an input by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let name = path.as_ref().to_string_lossy();
        match Self::extension_of(&name).as_deref() {
            Some("vtt") => FileType::Subtitle,
            Some("json") => FileType::Transcript,
            Some(_) if Self::allowed_media_extension(&name) => FileType::Media,
            _ => FileType::Unknown,
        }
    }

    /// Path without its final extension
    fn strip_extension(path: &Path) -> PathBuf {
        match path.file_stem() {
            Some(stem) => path.with_file_name(stem),
            None => path.to_path_buf(),
        }
    }

    // @generates: `<dir>/<stem>-subtitles.vtt` for a media file
    pub fn subtitle_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(input_file: P1, output_dir: P2) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        output_dir.as_ref().join(format!("{}-subtitles.vtt", stem))
    }

    // @generates: `<caption path without extension>_<lang>.vtt` next to the source captions
    pub fn translated_output_path<P: AsRef<Path>>(source_path: P, language: &str) -> PathBuf {
        let base = Self::strip_extension(source_path.as_ref());
        let mut name = base.file_name().unwrap_or_default().to_os_string();
        name.push(format!("_{}.vtt", language));
        base.with_file_name(name)
    }

    /// Externally reachable address of an artifact: `{server_url}/upload_files/{file name}`
    pub fn artifact_locator<P: AsRef<Path>>(server_url: &str, path: P) -> String {
        let file_name = path.as_ref().file_name().unwrap_or_default().to_string_lossy();
        format!("{}/upload_files/{}", server_url.trim_end_matches('/'), file_name)
    }

    /// Remove files after a delay; missing files and failures are only logged
    pub async fn remove_files_after(paths: Vec<PathBuf>, delay: Duration) {
        tokio::time::sleep(delay).await;

        let removals = paths.into_iter().map(|path| async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!("File {} removed successfully.", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("File {} already gone", path.display())
                }
                Err(e) => error!("Error removing file {}: {}", path.display(), e),
            }
        });
        futures::future::join_all(removals).await;
    }
}
