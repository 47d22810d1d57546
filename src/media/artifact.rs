//! Аудио артефакт: WAV данные и ссылка на временный файл
//!
//! Временный файл удаляется, когда последняя копия артефакта выходит из
//! области видимости.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::error::Result;

/// Озвучка, готовая к воспроизведению
#[derive(Debug, Clone, Default)]
pub struct AudioArtifact {
    data: Bytes,
    file: Option<Arc<NamedTempFile>>,
}

impl AudioArtifact {
    /// Пустой артефакт (озвучка не получена)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Сохранить WAV данные во временный файл
    pub fn from_wav(wav: Vec<u8>) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("content-studio-voiceover-")
            .suffix(".wav")
            .tempfile()?;
        file.write_all(&wav)?;
        file.flush()?;

        log::debug!("Voice-over written to {}", file.path().display());

        Ok(Self {
            data: Bytes::from(wav),
            file: Some(Arc::new(file)),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Байты WAV контейнера
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Путь к временному файлу
    pub fn path(&self) -> Option<&Path> {
        self.file.as_deref().map(NamedTempFile::path)
    }

    /// `file://` ссылка на временный файл
    pub fn uri(&self) -> Option<String> {
        self.path().map(|path| format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_artifact() {
        let artifact = AudioArtifact::empty();
        assert!(artifact.is_empty());
        assert!(artifact.uri().is_none());
        assert!(artifact.path().is_none());
    }

    #[test]
    fn test_file_is_released_with_last_clone() {
        let artifact = AudioArtifact::from_wav(vec![1, 2, 3, 4]).unwrap();
        let path = artifact.path().unwrap().to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
        assert!(artifact.uri().unwrap().starts_with("file://"));

        let copy = artifact.clone();
        drop(artifact);
        assert!(path.exists());
        drop(copy);
        assert!(!path.exists());
    }
}
