//! Content type detection.
//!
//! Detection is staged: first a magic-number sniff over the object's leading
//! bytes, then an extension heuristic over the announced filename. Both
//! stages are best-effort; an undetectable type is reported as `None` rather
//! than a default.

/// How many leading bytes the sniff stage needs at most.
pub const SNIFF_LEN: usize = 16;

/// Sniff a content type from an object's leading bytes.
pub fn sniff(prefix: &[u8]) -> Option<&'static str> {
    const MAGIC: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"OggS", "application/ogg"),
        (b"\x7fELF", "application/octet-stream"),
    ];

    for (magic, mime) in MAGIC {
        if prefix.starts_with(magic) {
            return Some(mime);
        }
    }

    // RIFF containers carry the concrete format at offset 8.
    if prefix.len() >= 12 && prefix.starts_with(b"RIFF") {
        return match &prefix[8..12] {
            b"WEBP" => Some("image/webp"),
            b"WAVE" => Some("audio/wav"),
            _ => None,
        };
    }

    None
}

/// Guess a content type from a filename extension.
pub fn from_name(name: &str) -> Option<String> {
    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

/// Run both detection stages.
pub fn detect(prefix: &[u8], name_hint: Option<&str>) -> Option<String> {
    if let Some(mime) = sniff(prefix) {
        return Some(mime.to_string());
    }
    name_hint.and_then(from_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_png() {
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n....."), Some("image/png"));
    }

    #[test]
    fn test_sniff_pdf() {
        assert_eq!(sniff(b"%PDF-1.7\n"), Some("application/pdf"));
    }

    #[test]
    fn test_sniff_webp() {
        assert_eq!(sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some("image/webp"));
    }

    #[test]
    fn test_sniff_unknown() {
        assert_eq!(sniff(b"just some text"), None);
        assert_eq!(sniff(b""), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(from_name("report.pdf").as_deref(), Some("application/pdf"));
        assert_eq!(from_name("notes.txt").as_deref(), Some("text/plain"));
        assert_eq!(from_name("blob.unknownext"), None);
        assert_eq!(from_name("noextension"), None);
    }

    #[test]
    fn test_detect_prefers_content_over_name() {
        let detected = detect(b"\x89PNG\r\n\x1a\n.....", Some("misleading.pdf"));
        assert_eq!(detected.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_detect_falls_back_to_name_hint() {
        let detected = detect(b"hello world", Some("notes.txt"));
        assert_eq!(detected.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_detect_none_without_hint() {
        assert_eq!(detect(b"hello world", None), None);
    }
}
