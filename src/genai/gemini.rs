//! Клиент Gemini API (Generative Language REST)
//!
//! Реализует [`GenerativeBackend`] поверх `models/{model}:generateContent`.
//! Клиент создается один раз и передается в конвейер; ключ API берется из
//! [`StudioConfig`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{AspectRatio, StudioConfig};
use crate::error::{Result, StudioError};
use crate::genai::backend::{
    GenerativeBackend, ModelResponse, ResponsePart, SpeechConfig, StructuredRequest,
};

/// Клиент Gemini
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    speech_model: String,
}

impl GeminiBackend {
    /// Создать клиент; ключ API должен быть задан
    pub fn new(config: &StudioConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            speech_model: config.speech_model.clone(),
        })
    }

    async fn generate_content(&self, model: &str, body: &Value) -> Result<ModelResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        log::debug!("Sending generateContent request to {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("{} responded with status {}", model, status);

        if !status.is_success() {
            let error_text = match response.text().await {
                Ok(text) => text,
                Err(e) => format!("Failed to read error response: {}", e),
            };
            return Err(error_from_status(status, &error_text));
        }

        let payload: GenerateContentResponse = response.json().await?;
        Ok(payload.into_model_response())
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<ModelResponse> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.response_schema,
            }
        });
        self.generate_content(&self.text_model, &body).await
    }

    async fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> Result<ModelResponse> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": aspect_ratio.as_str() },
            }
        });
        self.generate_content(&self.image_model, &body).await
    }

    async fn synthesize_speech(&self, text: &str, speech: &SpeechConfig) -> Result<ModelResponse> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": speech_config_json(speech),
            }
        });
        self.generate_content(&self.speech_model, &body).await
    }
}

fn voice_config_json(voice_name: &str) -> Value {
    json!({ "prebuiltVoiceConfig": { "voiceName": voice_name } })
}

/// JSON представление настройки голоса
pub(crate) fn speech_config_json(speech: &SpeechConfig) -> Value {
    match speech {
        SpeechConfig::SingleVoice(voice) => json!({
            "voiceConfig": voice_config_json(voice.as_str()),
        }),
        SpeechConfig::DualSpeaker { speaker_a, speaker_b } => json!({
            "multiSpeakerVoiceConfig": {
                "speakerVoiceConfigs": [
                    {
                        "speaker": speaker_a.speaker,
                        "voiceConfig": voice_config_json(speaker_a.voice.as_str()),
                    },
                    {
                        "speaker": speaker_b.speaker,
                        "voiceConfig": voice_config_json(speaker_b.voice.as_str()),
                    },
                ]
            }
        }),
    }
}

/// Преобразовать неуспешный HTTP ответ в ошибку
pub(crate) fn error_from_status(status: StatusCode, body: &str) -> StudioError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| match envelope.error.status {
            Some(code) => format!("{}: {}", code, envelope.error.message),
            None => envelope.error.message,
        })
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StudioError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => StudioError::RateLimited(message),
        _ => StudioError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

impl GenerateContentResponse {
    fn into_model_response(self) -> ModelResponse {
        let parts = self
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| match (part.inline_data, part.text) {
                (Some(inline), _) if !inline.data.is_empty() => Some(ResponsePart::Inline {
                    mime_type: inline.mime_type,
                    data: inline.data,
                }),
                (_, Some(text)) => Some(ResponsePart::Text(text)),
                _ => None,
            })
            .collect();
        ModelResponse::new(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Voice;
    use crate::genai::backend::SpeakerVoice;

    #[test]
    fn test_parse_response_parts() {
        let payload = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(payload).unwrap();
        let response = response.into_model_response();
        assert_eq!(response.parts.len(), 2);
        assert_eq!(response.joined_text(), "Here is your image");
        assert_eq!(response.first_inline(), Some(("image/png", "iVBORw0KGgo=")));
    }

    #[test]
    fn test_parse_empty_response() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(response.into_model_response().parts.is_empty());
    }

    #[test]
    fn test_error_mapping() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let error = error_from_status(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(error, StudioError::RateLimited(ref m) if m.contains("RESOURCE_EXHAUSTED")));
        assert!(error.is_rate_limit());

        let error = error_from_status(StatusCode::FORBIDDEN, "forbidden");
        assert!(error.is_credential_error());

        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let error = error_from_status(StatusCode::BAD_REQUEST, body);
        assert!(matches!(error, StudioError::Api { status: 400, .. }));
        assert!(error.is_credential_error());

        let error = error_from_status(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert!(!error.is_credential_error());
        assert!(!error.is_rate_limit());
    }

    #[test]
    fn test_speech_config_json() {
        let single = speech_config_json(&SpeechConfig::SingleVoice(Voice::Fenrir));
        assert_eq!(single["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"], "Fenrir");

        let dual = speech_config_json(&SpeechConfig::DualSpeaker {
            speaker_a: SpeakerVoice::new("Host", Voice::Puck),
            speaker_b: SpeakerVoice::new("Guest", Voice::Kore),
        });
        let speakers = &dual["multiSpeakerVoiceConfig"]["speakerVoiceConfigs"];
        assert_eq!(speakers[0]["speaker"], "Host");
        assert_eq!(speakers[1]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"], "Kore");
    }

    #[test]
    fn test_backend_requires_api_key() {
        let config = StudioConfig::default();
        assert!(matches!(GeminiBackend::new(&config), Err(StudioError::Configuration(_))));
    }
}
