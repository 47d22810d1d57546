//! Модуль для работы с медиа
//!
//! WAV кодирование, аудио артефакты и заглушки изображений.

pub mod artifact;
pub mod audio;
pub mod placeholder;

pub use artifact::AudioArtifact;
