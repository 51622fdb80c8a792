//! Plain-text import
//!
//! Only UTF-8 text files are read; word-processor formats are rejected with
//! [`Error::UnsupportedFormat`] so callers can tell users to paste instead.

use crate::document::normalize_imported_text;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// UTF-8 byte order mark
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Extensions read as plain text
const TEXT_EXTENSIONS: [&str; 3] = ["txt", "text", "md"];

/// Read a text file and normalize it for classification.
///
/// # Example
/// ```no_run
/// use gongwen_preview::import::import_text_file;
///
/// let text = import_text_file("notice.txt").unwrap();
/// println!("{}", text);
/// ```
pub fn import_text_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    check_extension(path)?;
    let data = fs::read(path)?;
    import_text_bytes(&data)
}

/// Decode imported bytes and normalize blank lines and indentation
pub fn import_text_bytes(data: &[u8]) -> Result<String> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::UnsupportedFormat(format!("not UTF-8 text: {}", e)))?;
    Ok(normalize_imported_text(text))
}

fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => Ok(()),
        Some(ext) if TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(Error::UnsupportedFormat(format!(
            ".{} (only plain-text files are supported)",
            ext
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check() {
        assert!(check_extension(Path::new("notice.txt")).is_ok());
        assert!(check_extension(Path::new("notice.TXT")).is_ok());
        assert!(check_extension(Path::new("README")).is_ok());
        assert!(matches!(
            check_extension(Path::new("notice.docx")),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_bom_and_normalization() {
        let data = "\u{FEFF}  通知  \n\n\n  正文。\n".as_bytes();
        assert_eq!(import_text_bytes(data).unwrap(), "通知\n正文。");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = import_text_bytes(&[0xB9, 0xAB, 0xCE, 0xC4]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = import_text_file("/nonexistent/notice.txt").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
