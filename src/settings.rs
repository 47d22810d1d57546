//! Сохраненные настройки производства

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ProductionConfig;
use crate::error::{Result, StudioError};

const SETTINGS_FILE: &str = "settings.json";

/// Хранилище настроек в JSON файле
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Настройки в каталоге конфигурации пользователя
    pub fn open_default() -> Result<Self> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| StudioError::Configuration("Cannot determine config directory".into()))?;
        path.push("content-studio");
        path.push(SETTINGS_FILE);
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Загрузить настройки; при отсутствии или повреждении файла используются значения по умолчанию
    pub fn load(&self) -> ProductionConfig {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Failed to parse settings {}: {}, using defaults", self.path.display(), e);
                ProductionConfig::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProductionConfig::default(),
            Err(e) => {
                log::warn!("Failed to read settings {}: {}, using defaults", self.path.display(), e);
                ProductionConfig::default()
            }
        }
    }

    pub fn save(&self, config: &ProductionConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(config)?)?;
        log::info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
