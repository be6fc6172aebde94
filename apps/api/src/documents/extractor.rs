//! Text extraction for uploaded documents.
//!
//! PDF and DOCX decoding run on the blocking pool; legacy `.doc` files are
//! handed to an external command (`antiword` by default) whose stdout is the text.

use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";

const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("DOC extraction failed: {0}")]
    Doc(String),

    #[error("Extraction tool unavailable: {0}")]
    ToolUnavailable(String),
}

/// Document formats the extractor can read. Resolved from the declared MIME
/// type by exact match; there is no content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
}

impl DocumentKind {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type {
            MIME_PDF => Some(DocumentKind::Pdf),
            MIME_DOCX => Some(DocumentKind::Docx),
            MIME_DOC => Some(DocumentKind::Doc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    doc_command: String,
}

impl TextExtractor {
    pub fn new(doc_command: impl Into<String>) -> Self {
        Self {
            doc_command: doc_command.into(),
        }
    }

    pub async fn extract(&self, path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
        debug!("Extracting {kind:?} text from {}", path.display());
        match kind {
            DocumentKind::Pdf => extract_pdf(path).await,
            DocumentKind::Docx => extract_docx(path.to_path_buf()).await,
            DocumentKind::Doc => self.extract_doc(path).await,
        }
    }

    async fn extract_doc(&self, path: &Path) -> Result<String, ExtractError> {
        let output = Command::new(&self.doc_command).arg(path).output().await;

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractError::Doc(format!(
                    "{} exited with {}: {}",
                    self.doc_command,
                    output.status,
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                ExtractError::ToolUnavailable(format!("{} not found", self.doc_command)),
            ),
            Err(e) => Err(ExtractError::Io(e)),
        }
    }
}

async fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let bytes = tokio::fs::read(path).await?;
    // pdf-extract can panic on malformed input; the join error contains it.
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractError::Pdf(format!("decoder aborted: {e}")))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))
}

async fn extract_docx(path: PathBuf) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || -> Result<String, ExtractError> {
        let file = std::fs::File::open(&path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| ExtractError::Docx(e.to_string()))?;
        let mut xml = String::new();
        archive
            .by_name(DOCX_BODY_PART)
            .map_err(|e| ExtractError::Docx(format!("{DOCX_BODY_PART}: {e}")))?
            .read_to_string(&mut xml)?;
        docx_xml_to_text(&xml)
    })
    .await
    .map_err(|e| ExtractError::Docx(format!("decoder aborted: {e}")))?
}

/// Pulls the raw text out of a WordprocessingML body, ignoring formatting.
fn docx_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let unescaped = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractError::Docx(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    Ok(text)
}
