//! Multi-format text extractor (plain text, PDF, Word)

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::DocumentKind;

/// UTF-8 byte order mark
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Seconds to wait for whole-document PDF extraction before giving up
#[cfg(feature = "pdf")]
const PDF_FALLBACK_TIMEOUT_SECS: u64 = 60;

/// Text pulled out of an uploaded file
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Detected format
    pub kind: DocumentKind,
    /// Decoded text content
    pub content: String,
    /// SHA-256 of the content, hex encoded
    pub content_hash: String,
    /// Number of pages (PDF only)
    pub page_count: Option<u32>,
}

impl ExtractedText {
    fn new(kind: DocumentKind, content: String, page_count: Option<u32>) -> Self {
        Self {
            kind,
            content_hash: hash_content(&content),
            content,
            page_count,
        }
    }
}

/// Multi-format text extractor
pub struct TextExtractor;

impl TextExtractor {
    /// Extract text from raw bytes according to the declared MIME type
    ///
    /// Fails with `UnsupportedFormat` for anything that is not plain text, PDF
    /// or DOCX, and with `Decoding` for text files that are not text in any
    /// supported encoding. Both only concern this file.
    pub fn extract(data: &[u8], declared_mime: Option<&str>, filename: &str) -> Result<ExtractedText> {
        let kind = DocumentKind::detect(declared_mime, filename);
        tracing::debug!("Extracting '{}' as {} ({} bytes)", filename, kind.display_name(), data.len());

        match kind {
            DocumentKind::Text => {
                let content = decode_text(filename, data)?;
                Ok(ExtractedText::new(kind, content, None))
            }
            #[cfg(feature = "pdf")]
            DocumentKind::Pdf => Self::extract_pdf(filename, data),
            #[cfg(feature = "docx")]
            DocumentKind::Docx => {
                let content = Self::extract_docx(filename, data)?;
                Ok(ExtractedText::new(kind, content, None))
            }
            other => Err(Error::UnsupportedFormat {
                filename: filename.to_string(),
                mime_type: other.mime_type().to_string(),
            }),
        }
    }

    /// Concatenate the text of every page in page order
    ///
    /// Pages without extractable text contribute an empty string. When no page
    /// yields anything, whole-document extraction is tried before settling for
    /// an empty result.
    #[cfg(feature = "pdf")]
    fn extract_pdf(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        let page_count = pages.len() as u32;
        let mut content = String::new();

        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => content.push_str(&text),
                Err(e) => {
                    tracing::debug!("No text on page {} of '{}': {}", page_number, filename, e);
                }
            }
        }

        if content.trim().is_empty() && page_count > 0 {
            tracing::debug!("Per-page extraction of '{}' found no text, trying whole document", filename);
            content = Self::extract_pdf_with_timeout(filename, data);
        }

        let content = cleanup_pdf_text(&content);
        Ok(ExtractedText::new(DocumentKind::Pdf, content, Some(page_count)))
    }

    /// Whole-document extraction with `pdf-extract`, bounded by a timeout thread
    ///
    /// Some fonts make `pdf-extract` spin or panic; either way the file simply
    /// has no text.
    #[cfg(feature = "pdf")]
    fn extract_pdf_with_timeout(filename: &str, data: &[u8]) -> String {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(PDF_FALLBACK_TIMEOUT_SECS)) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                text
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed on '{}': {}", filename, e);
                String::new()
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!(
                    "PDF extraction of '{}' timed out after {}s",
                    filename,
                    PDF_FALLBACK_TIMEOUT_SECS
                );
                String::new()
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread crashed on '{}'", filename);
                String::new()
            }
        }
    }

    /// Visible body text of a Word document
    ///
    /// Streams `word/document.xml` out of the zip container: text runs are
    /// concatenated, tabs and breaks kept, each paragraph ends a line and each
    /// table cell ends with a tab.
    #[cfg(feature = "docx")]
    fn extract_docx(filename: &str, data: &[u8]) -> Result<String> {
        use quick_xml::events::Event;
        use quick_xml::Reader;
        use std::io::Read;

        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor)
            .map_err(|e| Error::file_parse(filename, format!("Not a DOCX container: {}", e)))?;

        let mut xml = String::new();
        {
            let mut body = archive
                .by_name("word/document.xml")
                .map_err(|e| Error::file_parse(filename, format!("Missing document body: {}", e)))?;
            body.read_to_string(&mut xml)
                .map_err(|e| Error::file_parse(filename, format!("Unreadable document body: {}", e)))?;
        }

        let mut reader = Reader::from_str(&xml);
        let mut text = String::new();
        let mut in_text = false;
        let mut in_tab_stops = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"t" => in_text = true,
                    b"tabs" => in_tab_stops = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"tab" if !in_tab_stops => text.push('\t'),
                    b"br" | b"cr" | b"p" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Text(e)) if in_text => {
                    let chunk = e
                        .unescape()
                        .map_err(|err| Error::file_parse(filename, format!("Malformed text run: {}", err)))?;
                    text.push_str(&chunk);
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"tabs" => in_tab_stops = false,
                    b"p" => text.push('\n'),
                    b"tc" => text.push('\t'),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::file_parse(
                        filename,
                        format!("Malformed document XML at byte {}: {}", reader.buffer_position(), e),
                    ));
                }
                _ => {}
            }
        }

        Ok(text)
    }
}

/// Decode plain text: UTF-8 first, Latin-1 second
///
/// Latin-1 assigns a character to every byte, so it only rejects input that
/// is evidently binary (contains NUL bytes).
fn decode_text(filename: &str, data: &[u8]) -> Result<String> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    match std::str::from_utf8(data) {
        Ok(text) => Ok(text.to_string()),
        Err(utf8_err) => {
            if data.contains(&0) {
                return Err(Error::decoding(
                    filename,
                    format!("not valid UTF-8 ({}) and contains binary data", utf8_err),
                ));
            }
            tracing::debug!("'{}' is not UTF-8 ({}), decoding as Latin-1", filename, utf8_err);
            Ok(data.iter().map(|&b| b as char).collect())
        }
    }
}

/// Replace ligatures and non-breaking spaces so words tokenize whole
#[cfg(feature = "pdf")]
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
}

/// Hash content for the upload report
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
