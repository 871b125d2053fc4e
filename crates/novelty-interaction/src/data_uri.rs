//! Helpers for `data:<mime>;base64,<payload>` image references.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Wraps an already base64-encoded payload into a data URI.
pub fn encode(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Splits and decodes a base64 data URI. Returns `None` for anything else.
pub fn decode(uri: &str) -> Option<DecodedImage> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let bytes = BASE64_STANDARD.decode(payload.trim()).ok()?;

    Some(DecodedImage {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reads_mime_and_bytes() {
        let uri = encode("image/png", &BASE64_STANDARD.encode(b"clay"));
        let decoded = decode(&uri).unwrap();

        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.bytes, b"clay");
    }

    #[test]
    fn test_decode_rejects_non_base64_uris() {
        assert!(decode("https://example.com/image.png").is_none());
        assert!(decode("data:text/plain,hello").is_none());
        assert!(decode("data:image/png;base64,!!!").is_none());
    }
}
