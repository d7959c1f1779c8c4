use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over a text-recognition engine.
///
/// Implementations accept raw PNG/JPEG image bytes and return the recognized
/// lines trimmed, blanks dropped, in top-to-bottom reading order. Line order
/// is the only structural signal the extractor gets, so it must be preserved.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError>;
}

impl OcrBackend for Box<dyn OcrBackend> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        (**self).recognize(image_bytes)
    }
}

/// Split raw engine output into the line sequence the extractor consumes.
fn split_into_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns pre-set text — useful for unit testing extraction and the pipeline
/// without requiring Tesseract to be installed.
pub struct MockRecognizer {
    text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        Ok(split_into_lines(&self.text))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use leptess::LepTess;

    use super::{split_into_lines, OcrBackend, OcrError};

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        /// Tesseract language pair, e.g. `eng+amh` for the bilingual card face.
        languages: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, languages: &str) -> Self {
            Self {
                data_path,
                languages: languages.to_string(),
            }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.languages)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(split_into_lines(&text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_lines() {
        let r = MockRecognizer::new("Ethiopian Digital ID Card\nAbebe Bikila");
        assert_eq!(
            r.recognize(b"fake image data").unwrap(),
            vec!["Ethiopian Digital ID Card", "Abebe Bikila"]
        );
    }

    #[test]
    fn mock_ignores_image_content() {
        let r = MockRecognizer::new("hello");
        assert_eq!(r.recognize(b"anything").unwrap(), vec!["hello"]);
        assert_eq!(r.recognize(b"").unwrap(), vec!["hello"]);
    }

    #[test]
    fn line_splitting_trims_and_drops_blanks() {
        let lines = split_into_lines("  Sex  \n\n   \nMale\n");
        assert_eq!(lines, vec!["Sex", "Male"]);
    }

    #[test]
    fn line_splitting_preserves_reading_order() {
        let lines = split_into_lines("first\nsecond\nthird");
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn boxed_backend_delegates() {
        let boxed: Box<dyn OcrBackend> = Box::new(MockRecognizer::new("line"));
        assert_eq!(boxed.recognize(b"x").unwrap(), vec!["line"]);
    }
}
