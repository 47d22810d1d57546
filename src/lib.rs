//! Основной файл библиотеки content-studio
//!
//! Библиотека превращает тему, заданную пользователем, в готовый к
//! публикации пакет: сценарий с метаданными, иллюстрации, обложку и
//! озвучку, с отслеживанием прогресса выполнения.

pub mod config;
pub mod error;
pub mod export;
pub mod genai;
pub mod history;
pub mod media;
pub mod notification;
pub mod pipeline;
pub mod progress;
pub mod retry;
pub mod settings;
pub mod utils;

pub use config::{
    AspectRatio, ContentFormat, ProductionConfig, SpeakingSpeed, StudioConfig, Tone, Voice,
};
pub use error::{Result, StudioError};
pub use genai::{ContentPackage, GeminiBackend, GenerativeBackend};
pub use history::{HistoryRecord, HistoryStore};
pub use media::AudioArtifact;
pub use notification::{
    CallbackProgressObserver, ConsoleProgressObserver, MemoryProgressObserver, ProgressBarObserver,
};
pub use pipeline::{ProductionResult, Studio};
pub use progress::{PipelineStage, ProgressInfo, ProgressObserver};
pub use settings::SettingsStore;

