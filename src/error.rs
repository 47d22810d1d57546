//! Модуль обработки ошибок библиотеки content-studio
//!
//! Этот модуль содержит типы ошибок, которые могут возникнуть при генерации
//! контента, а также классификацию ошибок для политики повторов.

use thiserror::Error;

/// Признаки ошибки авторизации в тексте сообщения провайдера
///
/// Коды HTTP сюда не входят: у типизированных ошибок проверяется статус.
const CREDENTIAL_MARKERS: &[&str] = &[
    "PERMISSION_DENIED",
    "API key not valid",
    "API_KEY_INVALID",
    "UNAUTHENTICATED",
];

/// Признаки исчерпания квоты в тексте сообщения провайдера
const RATE_LIMIT_MARKERS: &[&str] = &["RESOURCE_EXHAUSTED", "quota", "Quota"];

/// Ошибки библиотеки content-studio
#[derive(Debug, Error)]
pub enum StudioError {
    /// Ошибка конфигурации: отсутствует или неверен ключ API
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Провайдер отклонил учетные данные (HTTP 401/403)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Превышен лимит запросов (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Провайдер вернул ошибку
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Ошибка HTTP запроса
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// В ответе нет встроенных данных изображения
    #[error("No image data in response")]
    NoImageData,

    /// Не удалось декодировать аудио из ответа
    #[error("Audio decode error: {0}")]
    AudioDecode(String),

    /// Другая ошибка
    #[error("Other error: {0}")]
    Other(String),
}

impl StudioError {
    /// Ошибка связана с ключом API и не должна повторяться
    pub fn is_credential_error(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::Unauthorized { .. } => true,
            Self::Api { status, message } => {
                is_credential_status(*status) || contains_marker(message, CREDENTIAL_MARKERS)
            }
            Self::Http(e) => e.status().map(|s| is_credential_status(s.as_u16())).unwrap_or(false),
            Self::Other(message) | Self::AudioDecode(message) => contains_marker(message, CREDENTIAL_MARKERS),
            _ => false,
        }
    }

    /// Ошибка сигнализирует об исчерпании квоты
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Configuration(_) | Self::Unauthorized { .. } => false,
            Self::Api { status, message } => {
                *status == 429 || contains_marker(message, RATE_LIMIT_MARKERS)
            }
            Self::Http(e) => e.status().map(|s| s.as_u16() == 429).unwrap_or(false),
            Self::Other(message) | Self::AudioDecode(message) => contains_marker(message, RATE_LIMIT_MARKERS),
            _ => false,
        }
    }

    /// Преобразовать ошибку авторизации в понятную пользователю ошибку конфигурации
    pub fn into_configuration(self) -> Self {
        match self {
            Self::Configuration(_) => self,
            other => Self::Configuration(format!(
                "the generative AI provider rejected the API key ({}); \
                 check GEMINI_API_KEY and that the key has access to the configured models",
                other
            )),
        }
    }
}

fn is_credential_status(status: u16) -> bool {
    status == 401 || status == 403
}

fn contains_marker(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| message.contains(marker))
}

/// Тип Result для библиотеки content-studio
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_classification() {
        assert!(StudioError::Configuration("missing key".into()).is_credential_error());
        assert!(StudioError::Unauthorized { status: 403, message: "denied".into() }.is_credential_error());
        assert!(StudioError::Other("API key not valid. Please pass a valid API key.".into()).is_credential_error());
        assert!(!StudioError::RateLimited("slow down".into()).is_credential_error());
        assert!(!StudioError::NoImageData.is_credential_error());
    }

    #[test]
    fn test_status_digits_in_message_do_not_classify() {
        let transient = StudioError::Api { status: 503, message: "Service unavailable, trace id 84031".into() };
        assert!(!transient.is_credential_error());
        let transient = StudioError::Api { status: 500, message: "request 4291 failed".into() };
        assert!(!transient.is_rate_limit());
        assert!(!StudioError::Other("upstream returned 403".into()).is_credential_error());

        // Gemini отвечает 400 на неверный ключ
        let bad_key = StudioError::Api { status: 400, message: "INVALID_ARGUMENT: API key not valid".into() };
        assert!(bad_key.is_credential_error());
        assert!(StudioError::Api { status: 401, message: String::new() }.is_credential_error());
    }

    #[test]
    fn test_rate_limit_classification() {
        assert!(StudioError::RateLimited("slow down".into()).is_rate_limit());
        assert!(StudioError::Api { status: 429, message: String::new() }.is_rate_limit());
        assert!(StudioError::Api { status: 400, message: "RESOURCE_EXHAUSTED".into() }.is_rate_limit());
        assert!(StudioError::Other("You exceeded your current quota".into()).is_rate_limit());
        assert!(!StudioError::Api { status: 500, message: "internal".into() }.is_rate_limit());
        assert!(!StudioError::Unauthorized { status: 403, message: "quota".into() }.is_rate_limit());
    }

    #[test]
    fn test_into_configuration_keeps_reason() {
        let error = StudioError::Unauthorized { status: 403, message: "PERMISSION_DENIED".into() }
            .into_configuration();
        match error {
            StudioError::Configuration(message) => {
                assert!(message.contains("PERMISSION_DENIED"));
                assert!(message.contains("GEMINI_API_KEY"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
