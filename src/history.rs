//! История производств
//!
//! Хранит последние [`MAX_HISTORY`] результатов в JSON файле. Файл
//! перезаписывается целиком при каждом изменении; озвучка не сохраняется,
//! записи из файла загружаются с пустым аудио.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StudioError};
use crate::pipeline::ProductionResult;

/// Максимальное количество записей в истории
pub const MAX_HISTORY: usize = 30;

const HISTORY_FILE: &str = "history.json";

/// Запись истории
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub prompt: String,
    #[serde(flatten)]
    pub result: ProductionResult,
}

impl HistoryRecord {
    pub fn new(prompt: impl Into<String>, result: ProductionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            prompt: prompt.into(),
            result,
        }
    }

    /// Краткое описание для списка
    pub fn format_display(&self) -> String {
        format!(
            "{}  {}  {} [{}, {}]",
            self.id,
            self.created_at.format("%Y-%m-%d %H:%M"),
            self.result.content.title,
            self.result.format.label(),
            self.result.aspect_ratio
        )
    }
}

/// Хранилище истории
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<HistoryRecord>,
}

impl HistoryStore {
    /// Открыть историю в указанном файле
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = Self::load(&path);
        Self { path, records }
    }

    /// Открыть историю в каталоге данных пользователя
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let mut path = dirs::data_dir()
            .ok_or_else(|| StudioError::Configuration("Cannot determine data directory".into()))?;
        path.push("content-studio");
        path.push(HISTORY_FILE);
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Vec<HistoryRecord> {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<HistoryRecord>>(&content) {
                Ok(records) => {
                    log::info!("Loaded {} history records from disk", records.len());
                    records
                }
                Err(e) => {
                    log::warn!("Failed to parse history: {}, starting fresh", e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("History file not found, starting fresh");
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to read history: {}, starting fresh", e);
                Vec::new()
            }
        }
    }

    fn write(&self, records: &[HistoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;
        log::debug!("Saved {} history records to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Записать новый снимок; память обновляется только после успешной записи
    fn commit(&mut self, mut records: Vec<HistoryRecord>) -> Result<()> {
        records.truncate(MAX_HISTORY);
        self.write(&records)?;
        self.records = records;
        Ok(())
    }

    /// Записи от новых к старым
    pub fn list(&self) -> Vec<HistoryRecord> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Добавить запись в начало; самые старые записи сверх лимита удаляются
    pub fn add(&mut self, record: HistoryRecord) -> Result<()> {
        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.push(record);
        records.extend(self.records.iter().cloned());
        self.commit(records)
    }

    /// Заменить историю целиком
    pub fn replace_all(&mut self, records: Vec<HistoryRecord>) -> Result<()> {
        self.commit(records)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AspectRatio, ContentFormat};
    use crate::genai::text::ContentPackage;
    use crate::media::AudioArtifact;
    use tempfile::tempdir;

    fn result(title: &str) -> ProductionResult {
        ProductionResult {
            content: ContentPackage {
                title: title.to_string(),
                ..ContentPackage::default()
            },
            images: vec![],
            thumbnail: String::new(),
            format: ContentFormat::ShortForm,
            aspect_ratio: AspectRatio::Portrait,
            audio: AudioArtifact::empty(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(HistoryStore::open(&path).is_empty());
    }

    #[test]
    fn test_history_is_capped() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path().join("history.json"));
        for i in 0..(MAX_HISTORY + 5) {
            store.add(HistoryRecord::new("p", result(&format!("run {}", i)))).unwrap();
        }
        assert_eq!(store.len(), MAX_HISTORY);
        assert_eq!(store.records[0].result.content.title, format!("run {}", MAX_HISTORY + 4));
    }

    #[test]
    fn test_failed_write_keeps_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::open(&path);
        store.add(HistoryRecord::new("p", result("kept"))).unwrap();

        // Каталог на месте файла: запись невозможна
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(store.add(HistoryRecord::new("p", result("lost"))).is_err());
        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.records[0].result.content.title, "kept");
    }
}
