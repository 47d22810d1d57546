//! Абстракция удаленного генеративного сервиса
//!
//! Адаптеры текста, изображений и речи работают с этим трейтом и не знают
//! о формате запросов конкретного провайдера.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{AspectRatio, Voice};
use crate::error::Result;

/// Запрос структурированного текста
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Системные инструкции
    pub system_instruction: String,
    /// Запрос пользователя
    pub prompt: String,
    /// JSON схема ответа
    pub response_schema: Value,
}

/// Голос одного из собеседников подкаста
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerVoice {
    /// Имя собеседника, как оно записано в сценарии
    pub speaker: String,
    pub voice: Voice,
}

impl SpeakerVoice {
    pub fn new(speaker: impl Into<String>, voice: Voice) -> Self {
        Self {
            speaker: speaker.into(),
            voice,
        }
    }
}

/// Настройка синтеза речи
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechConfig {
    /// Один голос
    SingleVoice(Voice),
    /// Диалог двух голосов
    DualSpeaker {
        speaker_a: SpeakerVoice,
        speaker_b: SpeakerVoice,
    },
}

/// Часть ответа модели
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePart {
    Text(String),
    /// Встроенные данные в base64
    Inline { mime_type: String, data: String },
}

/// Ответ модели
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub parts: Vec<ResponsePart>,
}

impl ModelResponse {
    pub fn new(parts: Vec<ResponsePart>) -> Self {
        Self { parts }
    }

    /// Ответ из одной текстовой части
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ResponsePart::Text(text.into())])
    }

    /// Ответ из одной части со встроенными данными
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(vec![ResponsePart::Inline {
            mime_type: mime_type.into(),
            data: data.into(),
        }])
    }

    /// Все текстовые части, склеенные вместе
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text(text) => Some(text.as_str()),
                ResponsePart::Inline { .. } => None,
            })
            .collect()
    }

    /// Первая часть со встроенными данными
    pub fn first_inline(&self) -> Option<(&str, &str)> {
        self.parts.iter().find_map(|part| match part {
            ResponsePart::Inline { mime_type, data } => Some((mime_type.as_str(), data.as_str())),
            ResponsePart::Text(_) => None,
        })
    }
}

/// Удаленный генеративный сервис
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Сгенерировать текст по JSON схеме
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<ModelResponse>;

    /// Сгенерировать изображение с заданным соотношением сторон
    async fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> Result<ModelResponse>;

    /// Синтезировать речь (16-bit PCM во встроенных данных)
    async fn synthesize_speech(&self, text: &str, speech: &SpeechConfig) -> Result<ModelResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_text_skips_inline_parts() {
        let response = ModelResponse::new(vec![
            ResponsePart::Text("{\"title\":".into()),
            ResponsePart::Inline { mime_type: "image/png".into(), data: "AAAA".into() },
            ResponsePart::Text("\"x\"}".into()),
        ]);
        assert_eq!(response.joined_text(), "{\"title\":\"x\"}");
        assert_eq!(response.first_inline(), Some(("image/png", "AAAA")));
    }

    #[test]
    fn test_first_inline_absent() {
        assert_eq!(ModelResponse::text("hello").first_inline(), None);
        assert_eq!(ModelResponse::default().first_inline(), None);
    }
}
