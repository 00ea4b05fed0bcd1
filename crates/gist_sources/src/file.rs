use std::path::Path;

use crate::{web::html_text, ExtractError};

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

const PDF_MAGIC: &[u8] = b"%PDF";

fn is_pdf(path: &Path, bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
        || path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Pulls the text layer out of a PDF. Runs on the blocking pool, which also
/// turns a parser panic into an error.
async fn pdf_text(path: &Path, bytes: Vec<u8>) -> Result<String, ExtractError> {
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let text = extracted
        .map_err(|e| ExtractError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
        .inspect_err(|e| tracing::error!(error = %e, "Failed to extract PDF text"))?;

    // pages are separated by form feeds
    Ok(text.replace('\x0C', "\n"))
}

/// Reads a local file as text. PDFs are reduced to their text layer and HTML
/// files go through the same stripping as web pages. Anything else that is
/// not valid UTF-8 is rejected.
#[tracing::instrument]
pub async fn read_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = tokio::fs::read(path)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to read file"))?;

    if is_pdf(path, &bytes) {
        return pdf_text(path, bytes).await;
    }

    let text = String::from_utf8(bytes)
        .map_err(|_| ExtractError::UnsupportedFile(path.to_path_buf()))?;

    if is_html(path) {
        return Ok(html_text(&text));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_plain_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "First line.\nSecond line.").unwrap();

        let text = read_text(file.path()).await.expect("read failed");
        assert_eq!(text, "First line.\nSecond line.");
    }

    #[tokio::test]
    async fn test_html_file_is_stripped() {
        let mut file = tempfile::Builder::new().suffix(".HTM").tempfile().unwrap();
        write!(file, "<html><script>x()</script><p>Visible</p></html>").unwrap();

        let text = read_text(file.path()).await.expect("read failed");
        assert_eq!(text, "Visible");
    }

    const REPORT_PDF: &[u8] = include_bytes!("../tests/fixtures/report.pdf");

    #[tokio::test]
    async fn test_binary_file_is_unsupported() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&[0x00, 0xff, 0xfe, 0x00]).unwrap();

        let result = read_text(file.path()).await;
        assert!(matches!(result, Err(ExtractError::UnsupportedFile(_))));
    }

    #[tokio::test]
    async fn test_pdf_text_layer_is_extracted() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(REPORT_PDF).unwrap();

        let text = read_text(file.path()).await.expect("read failed");
        assert!(text.contains("Quarterly"), "unexpected text: {text:?}");
        assert!(!text.contains('\x0C'));
    }

    #[tokio::test]
    async fn test_pdf_is_detected_by_magic_bytes() {
        let mut file = tempfile::Builder::new().suffix(".dat").tempfile().unwrap();
        file.write_all(REPORT_PDF).unwrap();

        let text = read_text(file.path()).await.expect("read failed");
        assert!(text.contains("Quarterly"), "unexpected text: {text:?}");
    }

    #[test]
    fn test_pdf_detection() {
        assert!(is_pdf(Path::new("a.PDF"), b""));
        assert!(is_pdf(Path::new("a"), b"%PDF-1.7"));
        assert!(!is_pdf(Path::new("a.txt"), b"plain"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = read_text(Path::new("/definitely/not/here.txt")).await;
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
