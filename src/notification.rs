//! Модуль для реализации системы уведомлений
//!
//! Этот модуль предоставляет конкретные реализации наблюдателей для
//! системы прогресса библиотеки content-studio.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::progress::{ProgressInfo, ProgressObserver};

/// Наблюдатель, выводящий информацию о прогрессе в консоль
#[derive(Debug, Default)]
pub struct ConsoleProgressObserver;

impl ConsoleProgressObserver {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, progress: &ProgressInfo) -> String {
        match progress.details.as_deref() {
            Some(details) => format!("[{:>3}%] {} ({})", progress.percent, progress.stage, details),
            None => format!("[{:>3}%] {}", progress.percent, progress.stage),
        }
    }
}

impl ProgressObserver for ConsoleProgressObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        println!("{}", self.render(&progress));
    }
}

/// Наблюдатель, сохраняющий информацию о прогрессе в памяти
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressObserver {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl MemoryProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Получить историю обновлений прогресса
    pub fn history(&self) -> Vec<ProgressInfo> {
        self.history.lock().clone()
    }

    /// Только проценты, в порядке поступления
    pub fn percents(&self) -> Vec<u8> {
        self.history.lock().iter().map(|p| p.percent).collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

impl ProgressObserver for MemoryProgressObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        self.history.lock().push(progress);
    }
}

/// Наблюдатель, вызывающий функцию обратного вызова при обновлении прогресса
pub struct CallbackProgressObserver<F>
where
    F: Fn(ProgressInfo) + Send + Sync + 'static,
{
    callback: F,
}

impl<F> CallbackProgressObserver<F>
where
    F: Fn(ProgressInfo) + Send + Sync + 'static,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressObserver for CallbackProgressObserver<F>
where
    F: Fn(ProgressInfo) + Send + Sync + 'static,
{
    fn on_progress_update(&self, progress: ProgressInfo) {
        (self.callback)(progress);
    }
}

/// Наблюдатель, отображающий прогресс в виде прогресс-бара в консоли
pub struct ProgressBarObserver {
    width: usize,
    last_percent: Mutex<Option<u8>>,
}

impl ProgressBarObserver {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            last_percent: Mutex::new(None),
        }
    }

    fn render(&self, progress: &ProgressInfo) -> String {
        let filled = (usize::from(progress.percent) * self.width) / 100;
        let empty = self.width.saturating_sub(filled);
        format!(
            "[{}{}] {:>3}% - {}",
            "=".repeat(filled),
            " ".repeat(empty),
            progress.percent,
            progress.stage
        )
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new(40)
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        let mut last_percent = self.last_percent.lock();
        if *last_percent == Some(progress.percent) && !progress.stage.is_terminal() {
            return;
        }
        *last_percent = Some(progress.percent);

        // Строка перерисовывается на месте
        print!("\r{:<80}", self.render(&progress));
        let _ = std::io::stdout().flush();

        if progress.percent >= 100 || progress.stage.is_terminal() {
            println!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::PipelineStage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_console_observer() {
        let observer = ConsoleProgressObserver::new();
        let line = observer.render(&ProgressInfo::new(PipelineStage::TextGeneration, 25, Some("Mountain Sunrise".into())));
        assert_eq!(line, "[ 25%] Writing script (Mountain Sunrise)");
        observer.on_progress_update(ProgressInfo::new(PipelineStage::ImageGeneration(0), 39, None));
    }

    #[test]
    fn test_memory_observer() {
        let observer = MemoryProgressObserver::new();
        observer.on_progress_update(ProgressInfo::new(PipelineStage::TextGeneration, 5, None));
        observer.on_progress_update(ProgressInfo::new(PipelineStage::ImageGeneration(0), 36, None));

        assert_eq!(observer.percents(), vec![5, 36]);
        assert_eq!(observer.history()[1].stage, PipelineStage::ImageGeneration(0));

        observer.clear_history();
        assert!(observer.history().is_empty());
    }

    #[test]
    fn test_callback_observer() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let observer = CallbackProgressObserver::new(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        observer.on_progress_update(ProgressInfo::new(PipelineStage::TextGeneration, 5, None));
        observer.on_progress_update(ProgressInfo::new(PipelineStage::Complete, 100, None));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_progress_bar_render() {
        let observer = ProgressBarObserver::new(10);
        let line = observer.render(&ProgressInfo::new(PipelineStage::AudioGeneration, 90, None));
        assert_eq!(line, "[========= ]  90% - Synthesizing voice-over");
        observer.on_progress_update(ProgressInfo::new(PipelineStage::Complete, 100, None));
    }
}
