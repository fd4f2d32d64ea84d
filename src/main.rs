// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use vttwai::app_config::{self, Config, TranslationProvider};
use vttwai::app_controller::Controller;
use vttwai::file_utils::{FileManager, FileType};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "deepl")]
    DeepL,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::DeepL => TranslationProvider::DeepL,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the transcript text and spoken language of a media file
    Transcript {
        /// Media file or transcript JSON
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Write WebVTT subtitles for a media file or transcript JSON
    Subtitles(SubtitlesArgs),

    /// Translate a WebVTT file into one or more languages
    Translate(TranslateArgs),

    /// Generate shell completions for vttwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct SubtitlesArgs {
    /// Media file (mp3, m4a, mp4, mov) or transcript JSON
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory; defaults to the configured upload folder
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum characters per line
    #[arg(long)]
    max_line_width: Option<usize>,

    /// Maximum lines per cue
    #[arg(long)]
    max_line_count: Option<usize>,

    /// Emit one cue per word with the spoken word underlined
    #[arg(long)]
    highlight_words: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Remove the written subtitles after this many seconds
    #[arg(long, value_name = "SECS")]
    cleanup_after: Option<u64>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// WebVTT file to translate
    #[arg(value_name = "VTT")]
    input: PathBuf,

    /// Target language codes (e.g. 'de', 'fr', 'pt-br')
    #[arg(short, long = "language", required = true, num_args = 1..)]
    languages: Vec<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Remove the source and translated files after this many seconds
    #[arg(long, value_name = "SECS")]
    cleanup_after: Option<u64>,
}

/// VTTwAI - subtitles from speech, translated
///
/// Transcribes audio and video, lays the transcript out as WebVTT captions and
/// translates the captions into many languages at once.
#[derive(Parser, Debug)]
#[command(name = "vttwai")]
#[command(version)]
#[command(about = "Speech to WebVTT subtitles, with translation")]
#[command(long_about = "VTTwAI transcribes media, writes WebVTT subtitles and translates them.

EXAMPLES:
    vttwai transcript talk.mp3                      # Print transcript and language
    vttwai subtitles talk.mp4                       # Write talk-subtitles.vtt
    vttwai subtitles talk.json --highlight-words    # Word-by-word highlighted cues
    vttwai translate talk-subtitles.vtt -l de fr es # Translate into three languages
    vttwai translate talk.vtt -l de --cleanup-after 300  # Remove the files after 5 minutes
    vttwai completions bash > vttwai.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. DEEPL_KEY, OPENAI_API_KEY and SERVER_URL are
    read from the environment when the config leaves them empty.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    /// ANSI colour for a level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Accept everything; the effective level is applied through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "vttwai", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config)?;
    if let Some(log_level) = cli.log_level.clone() {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Transcript { input } => run_transcript(config, &input).await,
        Commands::Subtitles(args) => run_subtitles(config, args).await,
        Commands::Translate(args) => run_translate(config, args).await,
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_transcript(config: Config, input: &Path) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config);

    let transcript = controller.load_transcript(input).await?;

    println!("{}", transcript.full_text.trim());
    info!("Language: {}", transcript.language);
    Ok(())
}

async fn run_subtitles(mut config: Config, args: SubtitlesArgs) -> Result<()> {
    if let Some(width) = args.max_line_width {
        config.subtitles.max_line_width = Some(width);
    }
    if let Some(count) = args.max_line_count {
        config.subtitles.max_line_count = Some(count);
    }
    if args.highlight_words {
        config.subtitles.highlight_words = true;
    }
    if args.cleanup_after.is_some() {
        config.output.cleanup_after_secs = args.cleanup_after;
    }
    config.validate().context("Configuration validation failed")?;

    match FileManager::detect_file_type(&args.input) {
        FileType::Media | FileType::Transcript => {}
        _ => return Err(anyhow!("Unsupported input file: {:?}", args.input)),
    }

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.output.upload_folder));
    let options = config.subtitles.segmentation_options();
    let controller = Controller::with_config(config);

    let artifact = controller
        .generate_subtitles(&args.input, &output_dir, &options, args.force_overwrite)
        .await?;

    info!("Success: {:?} ({} cues)", artifact.path, artifact.cue_count);
    println!("{}", serde_json::json!({
        "locator": artifact.locator,
        "path": artifact.path,
        "language": artifact.language,
    }));

    controller.cleanup_artifacts(vec![artifact.path]).await;
    Ok(())
}

async fn run_translate(mut config: Config, args: TranslateArgs) -> Result<()> {
    if let Some(provider) = args.provider {
        config.translation.provider = provider.into();
    }
    if args.cleanup_after.is_some() {
        config.output.cleanup_after_secs = args.cleanup_after;
    }

    if FileManager::detect_file_type(&args.input) != FileType::Subtitle {
        return Err(anyhow!("Expected a .vtt file, got {:?}", args.input));
    }

    let controller = Controller::with_config(config);
    let result = controller.translate_subtitles(&args.input, &args.languages).await?;

    info!("Translated into {}/{} languages", result.len(), args.languages.len());
    println!("{}", serde_json::to_string_pretty(&result.locator_by_language)?);

    let mut artifacts: Vec<PathBuf> = result.path_by_language.into_values().collect();
    artifacts.push(args.input);
    controller.cleanup_artifacts(artifacts).await;
    Ok(())
}
