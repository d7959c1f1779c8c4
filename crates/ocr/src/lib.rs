pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod quality;
pub mod recognizer;
pub mod types;

pub use extract::Extractor;
pub use pipeline::{IdPipeline, PipelineError, ScanReport};
pub use preprocess::{prepare_for_ocr, PreprocessError};
pub use quality::{assess_sharpness, assess_sharpness_bytes, DEFAULT_SHARPNESS_THRESHOLD};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use types::{IdRecord, SharpnessReport};
