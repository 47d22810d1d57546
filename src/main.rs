//! content-studio command line
//!
//! - `generate`: produce a script, images, thumbnail and voice-over for a prompt
//! - `history`: inspect or clear saved productions
//! - `settings`: inspect or save default production settings

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use content_studio::export::export_result;
use content_studio::utils::init_logger;
use content_studio::{
    AspectRatio, ConsoleProgressObserver, ContentFormat, HistoryRecord, HistoryStore,
    ProductionConfig, ProgressBarObserver, ProgressObserver, SettingsStore, SpeakingSpeed, Studio,
    StudioConfig, Tone,
};

#[derive(Parser)]
#[command(name = "content-studio")]
#[command(about = "Generate scripts, images and voice-overs from a topic prompt", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full production for a prompt
    Generate {
        /// Topic of the content
        prompt: String,

        #[command(flatten)]
        overrides: ProductionOverrides,

        /// Output directory (default: ./content-studio-output/<id>)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Do not save the result to history
        #[arg(long)]
        no_history: bool,

        /// Print one progress line per update instead of a progress bar
        #[arg(long)]
        plain: bool,
    },
    /// Saved productions
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Default production settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved productions, newest first
    List,
    /// Print a saved production as JSON
    Show { id: Uuid },
    /// Remove all saved productions
    Clear,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Update and persist settings
    Save {
        #[command(flatten)]
        overrides: ProductionOverrides,
    },
}

/// Flags overriding saved settings
#[derive(Args, Default)]
struct ProductionOverrides {
    /// short-form, long-form, podcast or news
    #[arg(long)]
    format: Option<ContentFormat>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    tone: Option<Tone>,
    /// slow, normal or fast
    #[arg(long)]
    speed: Option<SpeakingSpeed>,
    /// Voice name (Kore, Puck, Charon, Fenrir, Zephyr, Aoede)
    #[arg(long)]
    voice: Option<String>,
    #[arg(long)]
    minutes: Option<u32>,
    #[arg(long)]
    seconds: Option<u32>,
    /// 9:16 or 16:9
    #[arg(long)]
    aspect_ratio: Option<AspectRatio>,
    /// Voice-over gain, 1.0 keeps the original level
    #[arg(long)]
    volume: Option<f32>,
    #[arg(long)]
    category: Option<String>,
}

impl ProductionOverrides {
    fn apply(self, mut config: ProductionConfig) -> ProductionConfig {
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(tone) = self.tone {
            config.tone = tone;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(voice) = self.voice {
            config.voice = voice;
        }
        if let Some(minutes) = self.minutes {
            config.duration_minutes = minutes;
        }
        if let Some(seconds) = self.seconds {
            config.duration_seconds = seconds;
        }
        if let Some(aspect_ratio) = self.aspect_ratio {
            config.aspect_ratio = aspect_ratio;
        }
        if let Some(volume) = self.volume {
            config.volume = volume.max(0.0);
        }
        if let Some(category) = self.category {
            config.category = category;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            prompt,
            overrides,
            out,
            no_history,
            plain,
        } => generate(prompt, overrides, out, no_history, plain).await,
        Command::History { action } => history(action),
        Command::Settings { action } => settings(action),
    }
}

async fn generate(
    prompt: String,
    overrides: ProductionOverrides,
    out: Option<PathBuf>,
    no_history: bool,
    plain: bool,
) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(anyhow!("Prompt must not be empty"));
    }

    let studio_config = StudioConfig::from_env()?;
    let settings = SettingsStore::open_default()?;
    let config = overrides.apply(settings.load());

    let studio = Studio::new(studio_config)?;
    let observer: Box<dyn ProgressObserver> = if plain {
        Box::new(ConsoleProgressObserver::new())
    } else {
        Box::new(ProgressBarObserver::default())
    };
    let result = studio
        .produce(&prompt, &config, observer.as_ref())
        .await
        .context("Production failed")?;

    let record = HistoryRecord::new(prompt, result);
    let dir = out.unwrap_or_else(|| PathBuf::from("content-studio-output").join(record.id.to_string()));
    let written = export_result(&record.result, &dir)
        .with_context(|| format!("Failed to export to {}", dir.display()))?;

    println!("{}", record.result.content.title);
    for path in &written {
        println!("  {}", path.display());
    }
    if record.result.audio.is_empty() {
        println!("  (voice-over unavailable)");
    }

    if !no_history {
        let mut history = HistoryStore::open_default()?;
        history.add(record).context("Failed to save history")?;
    }
    Ok(())
}

fn history(action: HistoryAction) -> Result<()> {
    let mut store = HistoryStore::open_default()?;
    match action {
        HistoryAction::List => {
            if store.is_empty() {
                println!("History is empty");
            }
            for record in store.list() {
                println!("{}", record.format_display());
            }
        }
        HistoryAction::Show { id } => {
            let record = store
                .get(id)
                .ok_or_else(|| anyhow!("No history record with id {}", id))?;
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        HistoryAction::Clear => {
            store.clear()?;
            println!("History cleared");
        }
    }
    Ok(())
}

fn settings(action: SettingsAction) -> Result<()> {
    let store = SettingsStore::open_default()?;
    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&store.load())?);
        }
        SettingsAction::Save { overrides } => {
            let config = overrides.apply(store.load());
            store.save(&config)?;
            println!("Settings saved to {}", store.path().display());
        }
    }
    Ok(())
}
