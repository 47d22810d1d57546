//! Модуль для отслеживания прогресса производства
//!
//! Этот модуль предоставляет реализацию паттерна Observer для уведомления о
//! прогрессе конвейера. Прогресс выражается целым процентом и никогда не
//! уменьшается в пределах одного запуска.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Этапы конвейера производства
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Idle,
    /// Генерация сценария и метаданных
    TextGeneration,
    /// Генерация иллюстрации с номером
    ImageGeneration(usize),
    /// Генерация обложки
    ThumbnailGeneration,
    /// Синтез озвучки
    AudioGeneration,
    Complete,
    Failed,
}

impl PipelineStage {
    /// Название этапа для отображения
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "Idle".to_string(),
            Self::TextGeneration => "Writing script".to_string(),
            Self::ImageGeneration(index) => format!("Generating image {}", index + 1),
            Self::ThumbnailGeneration => "Generating thumbnail".to_string(),
            Self::AudioGeneration => "Synthesizing voice-over".to_string(),
            Self::Complete => "Complete".to_string(),
            Self::Failed => "Failed".to_string(),
        }
    }

    /// Этап завершает запуск
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Информация о прогрессе
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    /// Текущий этап
    pub stage: PipelineStage,
    /// Общий процент выполнения (0 - 100)
    pub percent: u8,
    /// Дополнительная информация о текущем этапе
    pub details: Option<String>,
}

impl ProgressInfo {
    pub fn new(stage: PipelineStage, percent: u8, details: Option<String>) -> Self {
        Self {
            stage,
            percent: percent.min(100),
            details,
        }
    }
}

/// Трейт для наблюдателя, получающего уведомления о прогрессе
///
/// Вызывается синхронно на границах этапов и не должен блокировать.
pub trait ProgressObserver: Send + Sync {
    fn on_progress_update(&self, progress: ProgressInfo);
}

/// Трекер прогресса одного запуска конвейера
pub struct ProgressTracker<'a> {
    observer: &'a dyn ProgressObserver,
    stage: PipelineStage,
    percent: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(observer: &'a dyn ProgressObserver) -> Self {
        Self {
            observer,
            stage: PipelineStage::Idle,
            percent: 0,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Перейти к этапу без уведомления
    pub fn set_stage(&mut self, stage: PipelineStage) {
        if self.stage != stage {
            log::debug!("Pipeline stage: {} -> {}", self.stage, stage);
            self.stage = stage;
        }
    }

    /// Сообщить прогресс; значение меньше текущего не уменьшает прогресс
    pub fn report(&mut self, percent: u8, details: Option<String>) {
        self.percent = self.percent.max(percent.min(100));
        self.observer
            .on_progress_update(ProgressInfo::new(self.stage, self.percent, details));
    }

    /// Перейти к этапу и сообщить прогресс
    pub fn advance(&mut self, stage: PipelineStage, percent: u8) {
        self.set_stage(stage);
        self.report(percent, None);
    }

    /// Отметить завершение запуска
    pub fn complete(&mut self, percent: u8) {
        self.set_stage(PipelineStage::Complete);
        self.report(percent, Some("Production complete".to_string()));
    }

    /// Отметить неудачу; прогресс не меняется и наблюдатель не вызывается
    pub fn fail(&mut self) {
        self.set_stage(PipelineStage::Failed);
    }
}
