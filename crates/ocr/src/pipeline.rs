use std::path::Path;

use thiserror::Error;

use crate::extract::Extractor;
use crate::preprocess::{self, PreprocessError};
use crate::quality::{self, DEFAULT_SHARPNESS_THRESHOLD};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{IdRecord, SharpnessReport};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Everything one submitted photo produced.
#[derive(Debug)]
pub struct ScanReport {
    /// Capture-quality verdict, present even for rejected photos.
    pub quality: SharpnessReport,
    /// Recognized lines in reading order. Empty when the gate rejected.
    pub lines: Vec<String>,
    /// Extracted fields; `None` when the photo never reached recognition.
    pub record: Option<IdRecord>,
}

/// Orchestrates: quality gate → preprocess → OCR → field extraction.
pub struct IdPipeline<R: OcrBackend> {
    recognizer: R,
    sharpness_threshold: f64,
}

impl<R: OcrBackend> IdPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            sharpness_threshold: DEFAULT_SHARPNESS_THRESHOLD,
        }
    }

    pub fn with_sharpness_threshold(mut self, threshold: f64) -> Self {
        self.sharpness_threshold = threshold;
        self
    }

    /// Process a photo already in memory (camera capture or upload body).
    ///
    /// A photo that fails the quality gate stops there: that is a normal
    /// outcome, not an error, and the report carries the score the capture
    /// client needs to prompt a retake.
    pub fn process_bytes(&self, data: &[u8]) -> Result<ScanReport, PipelineError> {
        // 1. Quality gate. Unreadable or blurry photos never reach the engine.
        let quality = quality::assess_sharpness_bytes(data, self.sharpness_threshold);
        if !quality.is_clear {
            return Ok(ScanReport {
                quality,
                lines: Vec::new(),
                record: None,
            });
        }

        // 2. Normalize for the OCR engine.
        let prepared = preprocess::prepare_for_ocr_from_bytes(data)?;

        // 3. Recognize text lines in reading order.
        let lines = self.recognizer.recognize(&prepared)?;

        // 4. Mine the lines for identity fields.
        let record = Extractor::extract(&lines);

        Ok(ScanReport {
            quality,
            lines,
            record: Some(record),
        })
    }

    /// Process a photo on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanReport, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
