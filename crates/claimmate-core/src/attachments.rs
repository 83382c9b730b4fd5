//! Safety checks and text extraction for claim attachments.
//!
//! Uploads pass through three gates before they reach the blob area:
//! 1. Size limit
//! 2. Extension blocklist
//! 3. Magic byte detection for executables
//!
//! Accepted files are then reduced to text for the extraction prompt. Only
//! text-like formats are decoded; everything else becomes a one-line
//! placeholder naming the file and its detected type.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Magic byte signatures for executable files.
pub const MAGIC_SIGNATURES: &[(&str, &[u8])] = &[
    ("Windows PE/MZ", &[0x4D, 0x5A]),
    ("ELF", &[0x7F, 0x45, 0x4C, 0x46]),
    ("Mach-O 32", &[0xFE, 0xED, 0xFA, 0xCE]),
    ("Mach-O 64", &[0xFE, 0xED, 0xFA, 0xCF]),
    ("Mach-O Fat / Java Class", &[0xCA, 0xFE, 0xBA, 0xBE]),
    ("WebAssembly", &[0x00, 0x61, 0x73, 0x6D]),
];

static BLOCKED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "exe", "dll", "scr", "pif", "com", "msi", "bat", "cmd", "ps1", "vbs", "so", "dylib",
        "jar", "class", "deb", "rpm", "apk", "app", "dmg", "pkg", "docm", "xlsm", "pptm", "reg",
        "lnk", "hta",
    ]
    .into_iter()
    .collect()
});

/// Outcome of the safety check for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentCheck {
    pub allowed: bool,
    pub block_reason: Option<String>,
}

impl AttachmentCheck {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            block_reason: None,
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            block_reason: Some(reason.into()),
        }
    }
}

/// Check an uploaded file against the size limit, extension blocklist and
/// executable signatures.
pub fn validate_file(filename: &str, data: &[u8], max_size_bytes: u64) -> AttachmentCheck {
    if data.len() as u64 > max_size_bytes {
        return AttachmentCheck::blocked(format!(
            "File exceeds maximum size of {} bytes",
            max_size_bytes
        ));
    }

    if let Some((_, ext)) = filename.rsplit_once('.') {
        if BLOCKED_EXTENSIONS.contains(ext.to_lowercase().as_str()) {
            return AttachmentCheck::blocked(format!("File extension .{} is not allowed", ext));
        }
    }

    for (name, magic) in MAGIC_SIGNATURES {
        if data.starts_with(magic) {
            return AttachmentCheck::blocked(format!("Executable file detected: {}", name));
        }
    }

    AttachmentCheck::allowed()
}

/// Detect the real content type of an upload.
///
/// Magic bytes win, then the extension for text formats, then the type the
/// client claimed. A claimed binary type whose bytes were not recognized is
/// downgraded to `application/octet-stream`.
pub fn detect_content_type(filename: &str, data: &[u8], claimed: &str) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some((_, ext)) = filename.rsplit_once('.') {
        if let Some(mime) = mime_from_extension(ext) {
            return mime.to_string();
        }
    }

    if claimed.is_empty() {
        return "application/octet-stream".to_string();
    }

    if claimed_is_binary(claimed) {
        return "application/octet-stream".to_string();
    }

    claimed.to_string()
}

fn claimed_is_binary(claimed: &str) -> bool {
    claimed.starts_with("image/")
        || claimed.starts_with("audio/")
        || claimed.starts_with("video/")
        || matches!(
            claimed,
            "application/pdf" | "application/zip" | "application/gzip" | "application/msword"
        )
}

// Text formats only; binary formats must be recognized by magic bytes.
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "txt" | "log" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "md" | "markdown" => Some("text/markdown"),
        "html" | "htm" => Some("text/html"),
        "xml" => Some("application/xml"),
        "json" => Some("application/json"),
        "eml" => Some("message/rfc822"),
        _ => None,
    }
}

/// True for content types that are decoded as text for the extraction prompt.
pub fn is_text_like(content_type: &str) -> bool {
    content_type.starts_with("text/")
        || matches!(
            content_type,
            "application/json" | "application/xml" | "message/rfc822"
        )
}

/// Reduce an attachment to prompt text.
///
/// Text-like files are decoded as UTF-8 (lossy); anything else becomes
/// `File: <name> (<content type>)`.
pub fn extract_text(filename: &str, content_type: &str, data: &[u8]) -> String {
    if is_text_like(content_type) {
        String::from_utf8_lossy(data).into_owned()
    } else {
        format!("File: {} ({})", filename, content_type)
    }
}

/// Sanitize a client-supplied file name for use in a blob path.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' | ' ' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim_matches(|c| c == '.' || c == '_');
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    if sanitized.len() > 200 {
        let mut cut = 200;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        return sanitized[..cut].to_string();
    }

    sanitized.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 25 * 1024 * 1024;

    #[test]
    fn test_allows_plain_text() {
        assert!(validate_file("notes.txt", b"water damage in kitchen", MAX).allowed);
    }

    #[test]
    fn test_blocks_exe_extension() {
        let check = validate_file("invoice.exe", b"harmless", MAX);
        assert!(!check.allowed);
        assert!(check.block_reason.unwrap().contains(".exe"));
    }

    #[test]
    fn test_blocks_pe_magic() {
        let check = validate_file("invoice.pdf", &[0x4D, 0x5A, 0x90, 0x00], MAX);
        assert!(!check.allowed);
        assert!(check.block_reason.unwrap().contains("Windows PE"));
    }

    #[test]
    fn test_blocks_elf() {
        assert!(!validate_file("photo", &[0x7F, 0x45, 0x4C, 0x46, 0x02], MAX).allowed);
    }

    #[test]
    fn test_blocks_oversized() {
        let data = vec![b'a'; 11];
        let check = validate_file("big.txt", &data, 10);
        assert!(!check.allowed);
        assert!(validate_file("ok.txt", &data[..10], 10).allowed);
    }

    #[test]
    fn test_detect_png_over_claimed_text() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_content_type("receipt.txt", &png, "text/plain"), "image/png");
    }

    #[test]
    fn test_detect_pdf() {
        assert_eq!(
            detect_content_type("policy.pdf", b"%PDF-1.7 body", "application/octet-stream"),
            "application/pdf"
        );
    }

    #[test]
    fn test_detect_text_by_extension() {
        assert_eq!(
            detect_content_type("notes.md", b"# Claim", "application/octet-stream"),
            "text/markdown"
        );
    }

    #[test]
    fn test_detect_downgrades_fake_image() {
        assert_eq!(
            detect_content_type("photo.jpg", b"not an image", "image/jpeg"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_detect_empty_claim() {
        assert_eq!(
            detect_content_type("blob", b"???", ""),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_extract_text_decodes_text() {
        assert_eq!(
            extract_text("notes.txt", "text/plain", b"Amount: $500"),
            "Amount: $500"
        );
    }

    #[test]
    fn test_extract_text_lossy_utf8() {
        let text = extract_text("notes.txt", "text/plain", &[b'o', b'k', 0xFF]);
        assert!(text.starts_with("ok"));
    }

    #[test]
    fn test_extract_text_placeholder_for_binary() {
        assert_eq!(
            extract_text("photo.png", "image/png", &[0x89, 0x50]),
            "File: photo.png (image/png)"
        );
    }

    #[test]
    fn test_sanitize_strips_path() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\bill.pdf"), "bill.pdf");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_filename("my bill?.pdf"), "my_bill_.pdf");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_filename(""), "unnamed_file");
        assert_eq!(sanitize_filename("..."), "unnamed_file");
    }
}
