//! Генерация иллюстраций

use crate::config::{AspectRatio, RetryPolicy};
use crate::error::{Result, StudioError};
use crate::genai::backend::GenerativeBackend;
use crate::retry::retry;

/// Сгенерировать изображение и вернуть его как `data:` ссылку
///
/// Ответ без встроенных данных дает [`StudioError::NoImageData`]; такой ответ
/// повторно не запрашивается.
pub async fn generate_image(
    backend: &dyn GenerativeBackend,
    prompt: &str,
    aspect_ratio: AspectRatio,
    policy: &RetryPolicy,
) -> Result<String> {
    let response = retry(policy, "image generation", move || {
        backend.generate_image(prompt, aspect_ratio)
    })
    .await?;

    let (mime_type, data) = response.first_inline().ok_or(StudioError::NoImageData)?;
    let mime_type = if mime_type.is_empty() { "image/png" } else { mime_type };

    Ok(format!("data:{};base64,{}", mime_type, data))
}
