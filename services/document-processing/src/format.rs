//! Format Sniffing
//!
//! Classifies a fetched document as PDF, image or unknown. Magic bytes are
//! checked first against an ordered signature table and win over whatever the
//! server declared; declared content-type and file suffix decide otherwise.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Image,
    Unknown,
}

/// Byte patterns that must all match at their offsets.
struct MagicSignature {
    parts: &'static [(usize, &'static [u8])],
    format: DocumentFormat,
}

const SIGNATURES: &[MagicSignature] = &[
    MagicSignature {
        parts: &[(0, b"%PDF")],
        format: DocumentFormat::Pdf,
    },
    MagicSignature {
        parts: &[(0, &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])],
        format: DocumentFormat::Image,
    },
    MagicSignature {
        parts: &[(0, &[0xFF, 0xD8, 0xFF])],
        format: DocumentFormat::Image,
    },
    MagicSignature {
        parts: &[(0, b"GIF8")],
        format: DocumentFormat::Image,
    },
    MagicSignature {
        parts: &[(0, b"RIFF"), (8, b"WEBP")],
        format: DocumentFormat::Image,
    },
];

const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".heic", ".tif", ".tiff"];

pub fn sniff(bytes: &[u8]) -> Option<DocumentFormat> {
    SIGNATURES
        .iter()
        .find(|sig| {
            sig.parts.iter().all(|(offset, pattern)| {
                bytes
                    .get(*offset..offset + pattern.len())
                    .map(|window| window == *pattern)
                    .unwrap_or(false)
            })
        })
        .map(|sig| sig.format)
}

fn from_content_type(content_type: &str) -> Option<DocumentFormat> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if essence == "application/pdf" || essence.ends_with("/pdf") {
        Some(DocumentFormat::Pdf)
    } else if essence.starts_with("image/") {
        Some(DocumentFormat::Image)
    } else {
        None
    }
}

fn from_suffix(name: &str) -> Option<DocumentFormat> {
    // Drop query string and fragment from URLs
    let path = name
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    if path.ends_with(".pdf") {
        Some(DocumentFormat::Pdf)
    } else if IMAGE_SUFFIXES.iter().any(|s| path.ends_with(s)) {
        Some(DocumentFormat::Image)
    } else {
        None
    }
}

pub fn classify(content_type: Option<&str>, name: &str, bytes: &[u8]) -> DocumentFormat {
    sniff(bytes)
        .or_else(|| content_type.and_then(from_content_type))
        .or_else(|| from_suffix(name))
        .unwrap_or(DocumentFormat::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

    #[test]
    fn test_pdf_magic_wins_over_declared_type() {
        let bytes = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3";
        assert_eq!(classify(Some("image/png"), "scan.png", bytes), DocumentFormat::Pdf);
        assert_eq!(classify(Some("application/octet-stream"), "blob", bytes), DocumentFormat::Pdf);
    }

    #[test]
    fn test_png_magic_is_image() {
        assert_eq!(classify(Some("application/pdf"), "letter.pdf", PNG), DocumentFormat::Image);
        assert_eq!(sniff(PNG), Some(DocumentFormat::Image));
    }

    #[test]
    fn test_jpeg_gif_and_webp_signatures() {
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(DocumentFormat::Image));
        assert_eq!(sniff(b"GIF89a"), Some(DocumentFormat::Image));
        assert_eq!(sniff(b"RIFF\x24\x00\x00\x00WEBPVP8 "), Some(DocumentFormat::Image));
        assert_eq!(sniff(b"RIFF\x24\x00\x00\x00WAVEfmt "), None);
    }

    #[test]
    fn test_short_buffers_do_not_match() {
        assert_eq!(sniff(b"%PD"), None);
        assert_eq!(sniff(&[]), None);
    }

    #[test]
    fn test_declared_type_and_suffix_are_fallbacks() {
        let unknown = b"plain bytes";
        assert_eq!(
            classify(Some("application/pdf; charset=binary"), "x", unknown),
            DocumentFormat::Pdf
        );
        assert_eq!(classify(Some("image/heic"), "x", unknown), DocumentFormat::Image);
        assert_eq!(
            classify(None, "https://cdn/x/statement.PDF?token=abc", unknown),
            DocumentFormat::Pdf
        );
        assert_eq!(classify(None, "ids/front.jpeg", unknown), DocumentFormat::Image);
        assert_eq!(classify(Some("text/plain"), "notes.txt", unknown), DocumentFormat::Unknown);
    }
}
