//! Генерация сценария и метаданных
//!
//! Строит системные инструкции и строгую JSON схему по параметрам
//! производства, затем разбирает ответ в [`ContentPackage`]. Пустой или
//! испорченный ответ не считается ошибкой: возвращается пустой пакет.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{ContentFormat, ProductionConfig, RetryPolicy, IMAGE_COUNT};
use crate::error::Result;
use crate::genai::backend::{GenerativeBackend, StructuredRequest};
use crate::genai::speech::{GUEST_SPEAKER, HOST_SPEAKER};
use crate::retry::retry;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid regex"));

/// Сценарий и метаданные, полученные от модели
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentPackage {
    pub title: String,
    pub script: String,
    pub description: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub best_posting_time: String,
    pub image_prompts: Vec<String>,
    pub thumbnail_prompt: String,
}

/// Системные инструкции для модели
pub fn build_system_instruction(config: &ProductionConfig) -> String {
    let total_seconds = config.total_seconds();
    let mut instruction = format!(
        "You are an expert scriptwriter and social media strategist. \
         Write a {format} about the user's topic.\n\
         - Category: {category}\n\
         - Language: write every field in {language}\n\
         - Tone: {tone}\n\
         - Target duration: {minutes}m {seconds}s when read aloud at a {speed} pace\n\
         - Target length: about {words} words of spoken script\n\
         - Visual aspect ratio: {aspect}\n\
         Provide a catchy title, the full script, a description, a social caption, \
         relevant hashtags and the best time to post.\n\
         Provide exactly {images} image prompts describing distinct scenes that follow the \
         script in order, and exactly one thumbnail prompt for an eye-catching cover image. \
         Image prompts must be in English and describe {aspect} compositions.",
        format = config.format.label(),
        category = config.category,
        language = config.language,
        tone = config.tone.as_str(),
        minutes = total_seconds / 60,
        seconds = total_seconds % 60,
        speed = config.speed.as_str(),
        words = config.target_word_count(),
        aspect = config.aspect_ratio.as_str(),
        images = IMAGE_COUNT,
    );

    match config.format {
        ContentFormat::Podcast => instruction.push_str(&format!(
            "\nWrite the script as a dialogue between two hosts. Start every line with \
             \"{}:\" or \"{}:\" and do not include stage directions.",
            HOST_SPEAKER, GUEST_SPEAKER
        )),
        ContentFormat::News => instruction.push_str(
            "\nWrite the script as a news anchor would read it: factual, concise, no stage directions.",
        ),
        ContentFormat::ShortForm | ContentFormat::LongForm => instruction.push_str(
            "\nWrite only the words to be spoken by the narrator, without scene headings.",
        ),
    }

    instruction
}

/// JSON схема ответа: все поля обязательны, ровно 4 иллюстрации
pub fn build_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "script": { "type": "STRING" },
            "description": { "type": "STRING" },
            "caption": { "type": "STRING" },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "bestPostingTime": { "type": "STRING" },
            "imagePrompts": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": IMAGE_COUNT,
                "maxItems": IMAGE_COUNT,
            },
            "thumbnailPrompt": { "type": "STRING" },
        },
        "required": [
            "title",
            "script",
            "description",
            "caption",
            "hashtags",
            "bestPostingTime",
            "imagePrompts",
            "thumbnailPrompt",
        ],
    })
}

/// Разобрать ответ модели; при ошибке вернуть пустой пакет
pub fn parse_content_package(raw: &str) -> ContentPackage {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        log::warn!("Text generation returned an empty response, using an empty content package");
        return ContentPackage::default();
    }

    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    match serde_json::from_str::<ContentPackage>(body) {
        Ok(package) => package,
        Err(e) => {
            log::warn!("Failed to parse text generation response ({}), using an empty content package", e);
            ContentPackage::default()
        }
    }
}

/// Сгенерировать сценарий и метаданные
pub async fn generate_content(
    backend: &dyn GenerativeBackend,
    prompt: &str,
    config: &ProductionConfig,
    policy: &RetryPolicy,
) -> Result<ContentPackage> {
    let request = StructuredRequest {
        system_instruction: build_system_instruction(config),
        prompt: prompt.to_string(),
        response_schema: build_response_schema(),
    };

    log::info!(
        "Generating {} script ({} words target) for prompt: {}",
        config.format,
        config.target_word_count(),
        prompt
    );

    let request = &request;
    let response = retry(policy, "text generation", move || backend.generate_structured(request)).await?;
    let package = parse_content_package(&response.joined_text());

    log::info!(
        "Script generated: \"{}\" ({} image prompts)",
        package.title,
        package.image_prompts.len()
    );
    Ok(package)
}
