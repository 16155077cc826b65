// Inline image attachments

use crate::error::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read an image file and embed it as a `data:` URI
///
/// The file is not inspected; its type is guessed from the extension and
/// there is no size limit.
pub fn data_uri_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let mime = mime_for_path(path);

    debug!(file = ?path, mime, size = bytes.len(), "Embedding image");
    Ok(data_uri(mime, &bytes))
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// MIME type guessed from the file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Size in bytes of the payload behind a base64 `data:` URI
pub fn payload_len(uri: &str) -> Option<usize> {
    let (_, payload) = uri.strip_prefix("data:")?.split_once(";base64,")?;
    STANDARD.decode(payload).ok().map(|bytes| bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("car.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("car.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("car")), "application/octet-stream");
    }

    #[test]
    fn test_data_uri_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("civic.gif");
        fs::write(&path, b"GIF89a").unwrap();

        let uri = data_uri_from_path(&path).unwrap();
        assert_eq!(uri, "data:image/gif;base64,R0lGODlh");
        assert_eq!(payload_len(&uri), Some(6));
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(data_uri_from_path(temp.path().join("missing.png")).is_err());
    }

    #[test]
    fn test_payload_len_rejects_other_uris() {
        assert_eq!(payload_len("https://example.com/car.png"), None);
        assert_eq!(payload_len("data:text/plain,hello"), None);
    }
}
