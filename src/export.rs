//! Экспорт результата в каталог проекта

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Result, StudioError};
use crate::pipeline::ProductionResult;

/// Разобрать `data:` ссылку с base64 содержимым
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| StudioError::Other("not a data URI".into()))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| StudioError::Other("malformed data URI".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| StudioError::Other("data URI is not base64 encoded".into()))?;
    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| StudioError::Other(format!("invalid base64 in data URI: {}", e)))?;
    Ok((mime_type.to_string(), bytes))
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Текстовая часть результата в Markdown
pub fn render_script_markdown(result: &ProductionResult) -> String {
    let content = &result.content;
    let mut md = format!("# {}\n\n", content.title);
    md.push_str(&format!(
        "_{} ({})_\n\n",
        result.format.label(),
        result.aspect_ratio
    ));
    if !content.description.is_empty() {
        md.push_str(&format!("{}\n\n", content.description));
    }
    md.push_str("## Script\n\n");
    md.push_str(content.script.trim());
    md.push_str("\n\n## Caption\n\n");
    md.push_str(content.caption.trim());
    md.push('\n');
    if !content.hashtags.is_empty() {
        md.push_str(&format!("\n{}\n", content.hashtags.join(" ")));
    }
    if !content.best_posting_time.is_empty() {
        md.push_str(&format!("\nBest posting time: {}\n", content.best_posting_time));
    }
    md
}

/// Записать результат в каталог; возвращает список созданных файлов
///
/// Встроенные изображения декодируются в файлы, заглушки остаются
/// ссылками в `result.json`. Пустая озвучка не записывается.
pub fn export_result(result: &ProductionResult, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let json_path = dir.join("result.json");
    fs::write(&json_path, serde_json::to_string_pretty(result)?)?;
    written.push(json_path);

    let script_path = dir.join("script.md");
    fs::write(&script_path, render_script_markdown(result))?;
    written.push(script_path);

    if !result.audio.is_empty() {
        let audio_path = dir.join("voiceover.wav");
        fs::write(&audio_path, result.audio.bytes())?;
        written.push(audio_path);
    }

    let images = result
        .images
        .iter()
        .enumerate()
        .map(|(i, uri)| (format!("image-{}", i + 1), uri))
        .chain(std::iter::once(("thumbnail".to_string(), &result.thumbnail)));

    for (name, uri) in images {
        if !uri.starts_with("data:") {
            continue;
        }
        match decode_data_uri(uri) {
            Ok((mime_type, bytes)) => {
                let path = dir.join(format!("{}.{}", name, extension_for(&mime_type)));
                fs::write(&path, bytes)?;
                written.push(path);
            }
            Err(e) => log::warn!("Skipping {}: {}", name, e),
        }
    }

    log::info!("Exported {} files to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AspectRatio, ContentFormat};
    use crate::genai::text::ContentPackage;
    use crate::media::audio::encode_wav;
    use crate::media::placeholder::thumbnail_placeholder;
    use crate::media::AudioArtifact;
    use tempfile::tempdir;

    #[test]
    fn test_decode_data_uri() {
        let (mime, bytes) = decode_data_uri("data:image/jpeg;base64,AQID").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, vec![1, 2, 3]);
        assert!(decode_data_uri("https://example.com/a.png").is_err());
        assert!(decode_data_uri("data:image/png,plain").is_err());
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempdir().unwrap();
        let result = ProductionResult {
            content: ContentPackage {
                title: "Mountain Sunrise".into(),
                script: "The sun rises.".into(),
                hashtags: vec!["#sunrise".into(), "#mountains".into()],
                ..ContentPackage::default()
            },
            images: vec!["data:image/png;base64,AQID".into()],
            thumbnail: thumbnail_placeholder(AspectRatio::Portrait),
            format: ContentFormat::ShortForm,
            aspect_ratio: AspectRatio::Portrait,
            audio: AudioArtifact::from_wav(encode_wav(&[0, 0], 24_000)).unwrap(),
        };

        let written = export_result(&result, dir.path()).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["result.json", "script.md", "voiceover.wav", "image-1.png"]);
        assert_eq!(fs::read(dir.path().join("image-1.png")).unwrap(), vec![1, 2, 3]);

        let script = fs::read_to_string(dir.path().join("script.md")).unwrap();
        assert!(script.starts_with("# Mountain Sunrise"));
        assert!(script.contains("#sunrise #mountains"));
    }
}
