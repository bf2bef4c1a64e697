use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

use crate::errors::CoreError;
use crate::models::AnalysisRequest;

/// Extensions accepted as images, with their media type.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
];

/// Media type for an image path, judged by extension only.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

pub fn is_image_path(path: &Path) -> bool {
    mime_type_for(path).is_some()
}

/// Accepted extensions for user-facing hints, e.g. "PNG, JPG, JPEG".
pub fn supported_formats() -> String {
    IMAGE_TYPES
        .iter()
        .map(|(ext, _)| ext.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Base64-encode raw image bytes for the inference request.
pub fn encode_image(bytes: &[u8], mime_type: &str) -> AnalysisRequest {
    AnalysisRequest {
        image_data: STANDARD.encode(bytes),
        mime_type: mime_type.to_string(),
    }
}

/// Drop a `data:<mime>;base64,` header, leaving only the payload.
/// Text that isn't a data URL is returned as-is.
pub fn strip_data_url_prefix(text: &str) -> &str {
    if !text.starts_with("data:") {
        return text;
    }
    match text.split_once(',') {
        Some((_, payload)) => payload,
        None => text,
    }
}

pub fn to_data_url(request: &AnalysisRequest) -> String {
    format!("data:{};base64,{}", request.mime_type, request.image_data)
}

/// Read an image file and encode it.
pub fn read_image(path: &Path) -> Result<AnalysisRequest, CoreError> {
    let mime_type = mime_type_for(path).ok_or_else(|| {
        CoreError::Encode(format!("not an image file: {}", path.display()))
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| CoreError::Io(format!("reading {}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), mime_type, "encoding image");
    Ok(encode_image(&bytes, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_mime_type_for_known_extensions() {
        assert_eq!(mime_type_for(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_type_for(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_type_for(Path::new("dir/a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_type_for(Path::new("a.webp")), Some("image/webp"));
    }

    #[test]
    fn test_mime_type_for_rejects_non_images() {
        assert_eq!(mime_type_for(Path::new("notes.txt")), None);
        assert_eq!(mime_type_for(Path::new("no_extension")), None);
        assert!(!is_image_path(&PathBuf::from("archive.tar.gz")));
    }

    #[test]
    fn test_supported_formats_lists_every_accepted_extension() {
        let formats = supported_formats();
        for (ext, _) in IMAGE_TYPES {
            assert!(formats.contains(&ext.to_ascii_uppercase()), "{ext} missing");
            assert!(is_image_path(&PathBuf::from(format!("obra.{ext}"))));
        }
        assert!(formats.starts_with("PNG, JPG, JPEG, WEBP"));
    }

    #[test]
    fn test_encode_image_standard_alphabet() {
        let req = encode_image(b"hello", "image/png");
        assert_eq!(req.image_data, "aGVsbG8=");
        assert_eq!(req.mime_type, "image/png");
    }

    #[test]
    fn test_strip_data_url_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("data:broken"), "data:broken");
    }

    #[test]
    fn test_data_url_prefix_strips_back_to_payload() {
        let req = encode_image(&[0xff, 0xd8, 0xff, 0xe0], "image/jpeg");
        let url = to_data_url(&req);
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(strip_data_url_prefix(&url), req.image_data);
    }

    #[test]
    fn test_read_image_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boceto.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let req = read_image(&path).unwrap();
        assert_eq!(req.mime_type, "image/png");
        assert_eq!(req.image_data, STANDARD.encode([0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_read_image_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_image(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn test_read_image_non_image_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hola").unwrap();
        assert!(matches!(read_image(&path), Err(CoreError::Encode(_))));
    }
}
