//! Детерминированные заглушки изображений

use crate::config::AspectRatio;

const PLACEHOLDER_BASE_URL: &str = "https://picsum.photos/seed";

/// Заглушка для иллюстрации с номером `index`
pub fn image_placeholder(index: usize, aspect_ratio: AspectRatio) -> String {
    placeholder_url(&format!("studio-{}", index), aspect_ratio)
}

/// Заглушка для обложки
pub fn thumbnail_placeholder(aspect_ratio: AspectRatio) -> String {
    placeholder_url("studio-thumbnail", aspect_ratio)
}

fn placeholder_url(seed: &str, aspect_ratio: AspectRatio) -> String {
    let (width, height) = aspect_ratio.dimensions();
    format!("{}/{}/{}/{}", PLACEHOLDER_BASE_URL, seed, width, height)
}

/// Ссылка указывает на заглушку
pub fn is_placeholder(uri: &str) -> bool {
    uri.starts_with(PLACEHOLDER_BASE_URL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_dimensions() {
        assert_eq!(
            image_placeholder(2, AspectRatio::Portrait),
            "https://picsum.photos/seed/studio-2/720/1280"
        );
        assert_eq!(
            thumbnail_placeholder(AspectRatio::Landscape),
            "https://picsum.photos/seed/studio-thumbnail/1280/720"
        );
    }

    #[test]
    fn test_placeholders_are_distinct_and_stable() {
        let first = image_placeholder(0, AspectRatio::Portrait);
        assert_eq!(first, image_placeholder(0, AspectRatio::Portrait));
        assert_ne!(first, image_placeholder(1, AspectRatio::Portrait));
        assert!(is_placeholder(&first));
        assert!(!is_placeholder("data:image/png;base64,AAAA"));
    }
}
