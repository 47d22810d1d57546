//! Конвейер производства контента
//!
//! Последовательно вызывает генерацию сценария, четырех иллюстраций,
//! обложки и озвучки. Фатальна только ошибка генерации сценария: вместо
//! неудавшихся изображений подставляются заглушки, вместо озвучки пустой
//! артефакт. Удаленные вызовы никогда не выполняются параллельно.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{AspectRatio, ContentFormat, ProductionConfig, StudioConfig, IMAGE_COUNT};
use crate::error::Result;
use crate::genai::backend::GenerativeBackend;
use crate::genai::gemini::GeminiBackend;
use crate::genai::text::ContentPackage;
use crate::genai::{image, speech, text};
use crate::media::placeholder::{image_placeholder, thumbnail_placeholder};
use crate::media::AudioArtifact;
use crate::progress::{PipelineStage, ProgressObserver, ProgressTracker};

/// Результат одного производства
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionResult {
    #[serde(flatten)]
    pub content: ContentPackage,
    /// Иллюстрации: `data:` ссылки или заглушки, по одной на каждый промпт
    pub images: Vec<String>,
    pub thumbnail: String,
    pub format: ContentFormat,
    pub aspect_ratio: AspectRatio,
    /// Озвучка живет только в текущем сеансе
    #[serde(skip)]
    pub audio: AudioArtifact,
}

/// Состояние одного запуска
#[derive(Debug, Default)]
struct RunState {
    /// Квота провайдера исчерпана: оставшиеся изображения без запросов
    quota_exhausted: bool,
}

/// Студия: клиент генеративного сервиса и политики конвейера
pub struct Studio {
    backend: Arc<dyn GenerativeBackend>,
    config: StudioConfig,
}

impl Studio {
    /// Создать студию с клиентом Gemini
    pub fn new(config: StudioConfig) -> Result<Self> {
        let backend = GeminiBackend::new(&config)?;
        Ok(Self::with_backend(Arc::new(backend), config))
    }

    /// Создать студию с произвольным генеративным сервисом
    pub fn with_backend(backend: Arc<dyn GenerativeBackend>, config: StudioConfig) -> Self {
        Self { backend, config }
    }

    /// Выполнить полный цикл производства
    pub async fn produce(
        &self,
        prompt: &str,
        config: &ProductionConfig,
        observer: &dyn ProgressObserver,
    ) -> Result<ProductionResult> {
        let thresholds = &self.config.progress;
        let backend = self.backend.as_ref();
        let mut tracker = ProgressTracker::new(observer);
        let mut run = RunState::default();

        log::info!("Starting production: format={}, aspect={}", config.format, config.aspect_ratio);

        // 1. Сценарий и метаданные
        tracker.advance(PipelineStage::TextGeneration, thresholds.text_started);
        let content = match text::generate_content(backend, prompt, config, &self.config.text_retry).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Script generation failed, aborting production: {}", e);
                tracker.fail();
                return Err(e);
            }
        };
        tracker.report(thresholds.text_finished, Some(content.title.clone()));

        // 2. Иллюстрации
        let mut images = Vec::with_capacity(IMAGE_COUNT);
        for index in 0..IMAGE_COUNT {
            tracker.set_stage(PipelineStage::ImageGeneration(index));
            let scene = scene_prompt(&content, prompt, index);
            let uri = self
                .image_or_placeholder(&scene, index, index > 0, config.aspect_ratio, &mut run)
                .await;
            images.push(uri);
            tracker.report(thresholds.image_progress(index + 1, IMAGE_COUNT), None);
        }

        // 3. Обложка
        tracker.set_stage(PipelineStage::ThumbnailGeneration);
        let thumbnail = self.thumbnail_or_placeholder(&content, prompt, config.aspect_ratio, &mut run).await;
        tracker.report(thresholds.thumbnail_finished, None);

        // 4. Озвучка
        tracker.advance(PipelineStage::AudioGeneration, thresholds.audio_started);
        let audio = speech::generate_voiceover(backend, &content.script, config, &self.config.speech_retry).await;

        let result = ProductionResult {
            content,
            images,
            thumbnail,
            format: config.format,
            aspect_ratio: config.aspect_ratio,
            audio,
        };
        tracker.complete(thresholds.complete);

        log::info!(
            "Production complete: \"{}\" (audio: {} bytes)",
            result.content.title,
            result.audio.len()
        );
        Ok(result)
    }

    async fn image_or_placeholder(
        &self,
        scene: &str,
        index: usize,
        paced: bool,
        aspect_ratio: AspectRatio,
        run: &mut RunState,
    ) -> String {
        if run.quota_exhausted {
            log::info!("Quota exhausted, using placeholder for image {}", index + 1);
            return image_placeholder(index, aspect_ratio);
        }

        if paced {
            tokio::time::sleep(self.config.pacing.image_delay()).await;
        }

        match image::generate_image(self.backend.as_ref(), scene, aspect_ratio, &self.config.image_retry).await {
            Ok(uri) => uri,
            Err(e) => {
                if e.is_rate_limit() {
                    log::warn!("Image {} hit the rate limit, remaining images use placeholders", index + 1);
                    run.quota_exhausted = true;
                } else {
                    log::warn!("Image {} failed, using placeholder: {}", index + 1, e);
                }
                image_placeholder(index, aspect_ratio)
            }
        }
    }

    async fn thumbnail_or_placeholder(
        &self,
        content: &ContentPackage,
        prompt: &str,
        aspect_ratio: AspectRatio,
        run: &mut RunState,
    ) -> String {
        if run.quota_exhausted {
            log::info!("Quota exhausted, using placeholder for thumbnail");
            return thumbnail_placeholder(aspect_ratio);
        }

        tokio::time::sleep(self.config.pacing.thumbnail_delay()).await;

        let scene = thumbnail_prompt(content, prompt);
        match image::generate_image(self.backend.as_ref(), &scene, aspect_ratio, &self.config.image_retry).await {
            Ok(uri) => uri,
            Err(e) => {
                if e.is_rate_limit() {
                    run.quota_exhausted = true;
                }
                log::warn!("Thumbnail failed, using placeholder: {}", e);
                thumbnail_placeholder(aspect_ratio)
            }
        }
    }
}

/// Промпт сцены; если модель его не вернула, используется общий
fn scene_prompt(content: &ContentPackage, prompt: &str, index: usize) -> String {
    match content.image_prompts.get(index).map(|s| s.trim()) {
        Some(scene) if !scene.is_empty() => scene.to_string(),
        _ => format!("A cinematic, high quality illustration about {}, scene {}", subject(content, prompt), index + 1),
    }
}

fn thumbnail_prompt(content: &ContentPackage, prompt: &str) -> String {
    let scene = content.thumbnail_prompt.trim();
    if scene.is_empty() {
        format!("An eye-catching cover image about {}", subject(content, prompt))
    } else {
        scene.to_string()
    }
}

fn subject<'a>(content: &'a ContentPackage, prompt: &'a str) -> &'a str {
    let title = content.title.trim();
    if title.is_empty() {
        prompt.trim()
    } else {
        title
    }
}
