pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Guess a media type from leading magic bytes for uploads sent without one.
///
/// A file part with no `Content-Type` header gives the upload no declared
/// type, and Gemini rejects inline data without a `mimeType`. Sniffing keeps
/// common images, PDFs and audio usable; anything else is sent as
/// `application/octet-stream`. A declared type is never passed through here.
pub fn detect_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => "audio/wav",
        [b'%', b'P', b'D', b'F', ..] => "application/pdf",
        [b'I', b'D', b'3', ..] | [0xFF, 0xFB | 0xF3 | 0xF2, ..] => "audio/mpeg",
        [b'O', b'g', b'g', b'S', ..] => "audio/ogg",
        [b'f', b'L', b'a', b'C', ..] => "audio/flac",
        _ => {
            tracing::warn!(
                "Unrecognized upload format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                FALLBACK_MIME
            );
            FALLBACK_MIME
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            "image/png"
        );
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn test_detect_webp_vs_wav() {
        assert_eq!(detect_mime(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(detect_mime(b"RIFF\0\0\0\0WAVEfmt "), "audio/wav");
    }

    #[test]
    fn test_detect_pdf() {
        assert_eq!(detect_mime(b"%PDF-1.7\n"), "application/pdf");
    }

    #[test]
    fn test_detect_mp3() {
        assert_eq!(detect_mime(b"ID3\x04\x00"), "audio/mpeg");
        assert_eq!(detect_mime(&[0xFF, 0xFB, 0x90, 0x64]), "audio/mpeg");
    }

    #[test]
    fn test_unknown_falls_back_to_octet_stream() {
        assert_eq!(detect_mime(&[0x00, 0x01, 0x02, 0x03]), FALLBACK_MIME);
    }

    #[test]
    fn test_empty_falls_back_to_octet_stream() {
        assert_eq!(detect_mime(&[]), FALLBACK_MIME);
    }
}
