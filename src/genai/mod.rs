//! Модуль для работы с генеративным сервисом
//!
//! Трейт удаленного сервиса, его реализация для Gemini и адаптеры текста,
//! изображений и речи.

pub mod backend;
pub mod gemini;
pub mod image;
pub mod speech;
pub mod text;

pub use backend::{GenerativeBackend, ModelResponse, ResponsePart, SpeakerVoice, SpeechConfig, StructuredRequest};
pub use gemini::GeminiBackend;
pub use text::ContentPackage;
