//! Модуль конфигурации библиотеки content-studio
//!
//! Этот модуль содержит параметры производства (формат, язык, тон, голос,
//! длительность), а также настройки клиента: ключ API, модели и таблицы
//! политик повторов, пауз и прогресса.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Переменные окружения, в которых ищется ключ API (по порядку)
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Количество иллюстраций в одном проекте
pub const IMAGE_COUNT: usize = 4;

/// Формат контента
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFormat {
    /// Короткое вертикальное видео
    #[default]
    ShortForm,
    /// Длинное видео
    LongForm,
    /// Подкаст на два голоса
    Podcast,
    /// Новостной выпуск
    News,
}

impl ContentFormat {
    /// Получить строковое представление формата
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortForm => "short-form",
            Self::LongForm => "long-form",
            Self::Podcast => "podcast",
            Self::News => "news",
        }
    }

    /// Человекочитаемое название для инструкций модели
    pub fn label(&self) -> &'static str {
        match self {
            Self::ShortForm => "short-form vertical video (Shorts / Reels / TikTok)",
            Self::LongForm => "long-form video",
            Self::Podcast => "two-host podcast episode",
            Self::News => "news bulletin",
        }
    }

    /// Максимальная длительность в секундах
    pub fn max_duration_secs(&self) -> u32 {
        match self {
            Self::ShortForm => 60,
            Self::LongForm | Self::Podcast | Self::News => 300,
        }
    }
}

impl FromStr for ContentFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short-form" | "short" | "shorts" => Ok(Self::ShortForm),
            "long-form" | "long" => Ok(Self::LongForm),
            "podcast" => Ok(Self::Podcast),
            "news" => Ok(Self::News),
            other => Err(format!("unknown content format: {}", other)),
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Соотношение сторон изображений
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    /// 9:16
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    /// 16:9
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "9:16",
            Self::Landscape => "16:9",
        }
    }

    /// Размер заглушки в пикселях (ширина, высота)
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Portrait => (720, 1280),
            Self::Landscape => (1280, 720),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "9:16" | "portrait" | "vertical" => Ok(Self::Portrait),
            "16:9" | "landscape" | "horizontal" => Ok(Self::Landscape),
            other => Err(format!("unknown aspect ratio: {}", other)),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Тон повествования
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Energetic,
    Dramatic,
    Humorous,
    Educational,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Energetic => "energetic",
            Self::Dramatic => "dramatic",
            Self::Humorous => "humorous",
            Self::Educational => "educational",
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(Self::Professional),
            "casual" => Ok(Self::Casual),
            "energetic" => Ok(Self::Energetic),
            "dramatic" => Ok(Self::Dramatic),
            "humorous" | "funny" => Ok(Self::Humorous),
            "educational" => Ok(Self::Educational),
            other => Err(format!("unknown tone: {}", other)),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Скорость речи
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeakingSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeakingSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
        }
    }

    /// Слов в секунду для расчета объема сценария
    pub fn words_per_second(&self) -> f64 {
        match self {
            Self::Slow => 2.0,
            Self::Normal => 2.5,
            Self::Fast => 3.0,
        }
    }
}

impl FromStr for SpeakingSpeed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "normal" => Ok(Self::Normal),
            "fast" => Ok(Self::Fast),
            other => Err(format!("unknown speaking speed: {}", other)),
        }
    }
}

impl fmt::Display for SpeakingSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Голос синтеза речи
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Voice {
    #[default]
    Kore,
    Puck,
    Charon,
    Fenrir,
    Zephyr,
    Aoede,
}

impl Voice {
    /// Все доступные голоса
    pub const ALL: [Voice; 6] = [
        Voice::Kore,
        Voice::Puck,
        Voice::Charon,
        Voice::Fenrir,
        Voice::Zephyr,
        Voice::Aoede,
    ];

    /// Имя голоса у провайдера
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kore => "Kore",
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Fenrir => "Fenrir",
            Self::Zephyr => "Zephyr",
            Self::Aoede => "Aoede",
        }
    }

    /// Найти голос по идентификатору; неизвестный идентификатор дает голос по умолчанию
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|voice| voice.as_str().eq_ignore_ascii_case(id.trim()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Параметры одного производства
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionConfig {
    /// Язык сценария и озвучки
    pub language: String,
    /// Предпочитаемый голос (идентификатор провайдера)
    pub voice: String,
    pub tone: Tone,
    pub speed: SpeakingSpeed,
    /// Множитель громкости озвучки (1.0 - без изменений)
    pub volume: f32,
    pub format: ContentFormat,
    /// Тематика сценария
    pub category: String,
    pub duration_minutes: u32,
    pub duration_seconds: u32,
    pub aspect_ratio: AspectRatio,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            voice: Voice::default().as_str().to_string(),
            tone: Tone::default(),
            speed: SpeakingSpeed::default(),
            volume: 1.0,
            format: ContentFormat::default(),
            category: "General".to_string(),
            duration_minutes: 0,
            duration_seconds: 30,
            aspect_ratio: AspectRatio::default(),
        }
    }
}

impl ProductionConfig {
    /// Длительность в секундах с учетом ограничения формата
    pub fn total_seconds(&self) -> u32 {
        let requested = self
            .duration_minutes
            .saturating_mul(60)
            .saturating_add(self.duration_seconds);
        requested.min(self.format.max_duration_secs())
    }

    /// Целевое количество слов сценария
    pub fn target_word_count(&self) -> u32 {
        (f64::from(self.total_seconds()) * self.speed.words_per_second()).round() as u32
    }

    /// Выбранный голос
    pub fn voice(&self) -> Voice {
        Voice::from_id(&self.voice)
    }
}

/// Политика повторов удаленного вызова
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Количество повторов после первой попытки
    pub max_retries: u32,
    /// Начальная задержка в миллисекундах
    pub initial_delay_ms: u64,
    /// Множитель задержки при исчерпании квоты
    pub rate_limit_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay_ms: initial_delay.as_millis() as u64,
            ..Self::default()
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 2000,
            rate_limit_multiplier: 2.0,
        }
    }
}

/// Паузы между запросами изображений
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PacingPolicy {
    /// Пауза перед каждым изображением, кроме первого
    pub image_delay_ms: u64,
    /// Пауза перед обложкой
    pub thumbnail_delay_ms: u64,
}

impl PacingPolicy {
    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_delay_ms)
    }

    pub fn thumbnail_delay(&self) -> Duration {
        Duration::from_millis(self.thumbnail_delay_ms)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            image_delay_ms: 2000,
            thumbnail_delay_ms: 3000,
        }
    }
}

/// Пороговые значения прогресса (в процентах) на границах этапов
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProgressPolicy {
    pub text_started: u8,
    pub text_finished: u8,
    /// Прогресс после всех иллюстраций не поднимается выше этого значения
    pub images_cap: u8,
    pub thumbnail_finished: u8,
    pub audio_started: u8,
    pub complete: u8,
}

impl ProgressPolicy {
    /// Прогресс после `completed` готовых иллюстраций из `total`
    pub fn image_progress(&self, completed: usize, total: usize) -> u8 {
        if total == 0 {
            return self.text_finished;
        }
        let span = f64::from(self.images_cap.saturating_sub(self.text_finished));
        let value = f64::from(self.text_finished) + span * completed as f64 / total as f64;
        (value.round() as u8).min(self.images_cap)
    }
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self {
            text_started: 5,
            text_finished: 25,
            images_cap: 80,
            thumbnail_finished: 85,
            audio_started: 90,
            complete: 100,
        }
    }
}

/// Конфигурация клиента генерации
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// API ключ провайдера
    pub api_key: String,
    /// Базовый URL API
    pub api_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub speech_model: String,
    /// Таймаут одного HTTP запроса в секундах
    pub request_timeout_secs: u64,
    pub text_retry: RetryPolicy,
    pub image_retry: RetryPolicy,
    pub speech_retry: RetryPolicy,
    pub pacing: PacingPolicy,
    pub progress: ProgressPolicy,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            request_timeout_secs: 180,
            text_retry: RetryPolicy::default(),
            image_retry: RetryPolicy::new(2, Duration::from_millis(3000)),
            speech_retry: RetryPolicy::default(),
            pacing: PacingPolicy::default(),
            progress: ProgressPolicy::default(),
        }
    }
}

// Ключ не попадает в логи
impl fmt::Debug for StudioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioConfig")
            .field("api_key", &if self.api_key.is_empty() { "<empty>" } else { "<redacted>" })
            .field("api_base_url", &self.api_base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("text_retry", &self.text_retry)
            .field("image_retry", &self.image_retry)
            .field("speech_retry", &self.speech_retry)
            .field("pacing", &self.pacing)
            .field("progress", &self.progress)
            .finish()
    }
}

impl StudioConfig {
    /// Создать конфигурацию с ключом из окружения
    pub fn from_env() -> Result<Self> {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .unwrap_or_default();
        Self::with_api_key(api_key)
    }

    /// Создать конфигурацию с явно переданным ключом
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        let config = Self {
            api_key: api_key.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Проверить, что ключ API задан
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(StudioError::Configuration(format!(
                "API key is not set; export {} before running",
                API_KEY_ENV_VARS.join(" or ")
            )));
        }
        Ok(())
    }
}
