//! Upload pipeline: store → extract → analyze → parse → persist.
//!
//! Every stage maps its own error onto a distinct `PipelineStage`, so an
//! extraction failure is never reported as an analysis failure.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::assessments::store::AssessmentStore;
use crate::documents::extractor::{DocumentKind, TextExtractor};
use crate::documents::parser::{parse_analysis, AnalysisResult};
use crate::documents::storage::{StoredFile, UploadDir};
use crate::errors::{AppError, PipelineStage};
use crate::llm_client::DocumentAnalyzer;
use crate::models::assessment::{Assessment, NewAssessment};

pub const DEFAULT_PRODUCT: &str = "Unknown Product";
pub const UNSUPPORTED_TYPE: &str =
    "Only PDF and Word files are supported for AI parsing at this time.";

/// A file part received from the client.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub file: StoredFile,
    pub ai: AnalysisResult,
    pub assessment: Assessment,
}

#[derive(Clone)]
pub struct UploadPipeline {
    uploads: UploadDir,
    extractor: TextExtractor,
    analyzer: Arc<dyn DocumentAnalyzer>,
    assessments: Arc<dyn AssessmentStore>,
}

impl UploadPipeline {
    pub fn new(
        uploads: UploadDir,
        extractor: TextExtractor,
        analyzer: Arc<dyn DocumentAnalyzer>,
        assessments: Arc<dyn AssessmentStore>,
    ) -> Self {
        Self {
            uploads,
            extractor,
            analyzer,
            assessments,
        }
    }

    pub async fn handle_upload(
        &self,
        document: UploadedDocument,
        product: Option<String>,
    ) -> Result<UploadOutcome, AppError> {
        let kind = DocumentKind::from_mime(&document.mime_type)
            .ok_or_else(|| AppError::BadRequest(UNSUPPORTED_TYPE.to_string()))?;
        let product = product
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PRODUCT.to_string());

        let file = self
            .uploads
            .save(&document.original_name, &document.mime_type, &document.bytes)
            .await
            .map_err(|e| AppError::stage(PipelineStage::Storage, e))?;

        let text = self
            .extractor
            .extract(&file.path, kind)
            .await
            .map_err(|e| AppError::stage(PipelineStage::Extraction, e))?;
        info!(
            "Extracted {} characters from {}",
            text.chars().count(),
            file.filename
        );

        let raw = self
            .analyzer
            .analyze(&text, &product)
            .await
            .map_err(|e| AppError::stage(PipelineStage::Analysis, e))?;

        let ai = parse_analysis(&raw);

        let assessment = self
            .assessments
            .create(NewAssessment {
                product,
                filename: file.filename.clone(),
                summary: ai.summary.clone().unwrap_or_default(),
                controls: ai.controls.clone().unwrap_or_default(),
                risks: ai.risks.clone().unwrap_or_default(),
            })
            .await
            .map_err(|e| AppError::stage(PipelineStage::Persistence, e))?;
        info!(
            "Created assessment {} for product '{}'",
            assessment.id, assessment.product
        );

        Ok(UploadOutcome {
            file,
            ai,
            assessment,
        })
    }
}
