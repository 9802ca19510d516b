//! Byte-to-text extraction for uploaded resumes.
//!
//! PDF via `pdf-extract`, DOCX by flattening `word/document.xml` out of the
//! zip container, plain text as lossy UTF-8. CPU-bound: callers run
//! `extract_text` inside `tokio::task::spawn_blocking`.

use std::io::{Cursor, Read};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_MARKDOWN: &str = "text/markdown";

const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not extract text from resume. Ensure the file is not password-protected or corrupted.")]
    EmptyExtraction,

    #[error("Unreadable document: {0}")]
    Unreadable(String),
}

/// Extracts plain text from a resume document. Fails on unknown MIME types
/// and on documents whose text is blank after trimming.
pub fn extract_text(bytes: &[u8], mime_type: &str) -> Result<String, ExtractError> {
    let mime = normalize_mime(mime_type);
    let text = match mime.as_str() {
        MIME_PDF => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Unreadable(format!("PDF: {e}")))?,
        MIME_DOCX => extract_docx(bytes)?,
        MIME_TEXT | MIME_MARKDOWN => String::from_utf8_lossy(bytes).into_owned(),
        _ => return Err(ExtractError::UnsupportedFormat(mime)),
    };

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyExtraction);
    }
    Ok(text)
}

/// Lowercases and drops parameters such as `; charset=utf-8`.
fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Unreadable(format!("DOCX container: {e}")))?;
    let mut part = archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| ExtractError::Unreadable(format!("DOCX body: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::Unreadable(format!("DOCX body: {e}")))?;

    flatten_document_xml(&xml)
}

/// Walks the body events. Run text (`w:t`) is kept with entity and character
/// references resolved. Paragraph ends and in-run breaks become newlines and
/// in-run tabs become tabs; tab stops in paragraph properties are ignored.
/// Trailing newlines are dropped.
fn flatten_document_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_run_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::Unreadable(format!("DOCX XML: {e}")))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_run_text = true,
                b"w:br" | b"w:cr" if in_run => text.push('\n'),
                b"w:tab" if in_run => text.push('\t'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:br" | b"w:cr" if in_run => text.push('\n'),
                b"w:tab" if in_run => text.push('\t'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_run_text => {
                let decoded = e
                    .decode()
                    .map_err(|e| ExtractError::Unreadable(format!("DOCX text: {e}")))?;
                text.push_str(&decoded);
            }
            Event::GeneralRef(e) if in_run_text => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|e| ExtractError::Unreadable(format!("DOCX reference: {e}")))?
                {
                    text.push(ch);
                } else {
                    let name = e
                        .decode()
                        .map_err(|e| ExtractError::Unreadable(format!("DOCX reference: {e}")))?;
                    match resolve_predefined_entity(&name) {
                        Some(resolved) => text.push_str(resolved),
                        None => {
                            text.push('&');
                            text.push_str(&name);
                            text.push(';');
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let kept = text.trim_end_matches('\n').len();
    text.truncate(kept);
    Ok(text)
}
