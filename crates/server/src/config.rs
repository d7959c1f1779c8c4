use std::path::Path;

use serde::Deserialize;

use fayda_ocr::DEFAULT_SHARPNESS_THRESHOLD;

/// Server configuration, read from a TOML file. Every field has a default,
/// so a missing file just means "run with defaults".
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub port: u16,
    /// Laplacian-variance score an upload must beat to be processed.
    pub sharpness_threshold: f64,
    /// Tesseract language pair: English labels + Amharic names on the card.
    pub ocr_languages: String,
    /// Override for the tessdata directory; `None` uses the system default.
    pub tessdata_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            sharpness_threshold: DEFAULT_SHARPNESS_THRESHOLD,
            ocr_languages: "eng+amh".to_string(),
            tessdata_path: None,
        }
    }
}

/// Load configuration from the file named by `FAYDA_CONFIG` (default
/// `fayda.toml`). A missing file falls back to defaults; a malformed one is
/// a startup error.
pub fn load() -> anyhow::Result<Config> {
    let path = std::env::var("FAYDA_CONFIG").unwrap_or_else(|_| "fayda.toml".to_string());
    load_from(Path::new(&path))
}

fn load_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    parse(&std::fs::read_to_string(path)?)
}

fn parse(raw: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(raw)?)
}
