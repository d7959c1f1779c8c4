use serde::{Deserialize, Serialize};

/// The fixed-schema record recovered from one ID card photo.
///
/// Every field is explicitly optional: extraction is opportunistic, and a
/// missing anchor simply leaves its field `None`. Serialization always emits
/// all nine keys (`null` for absent) so downstream consumers never have to
/// probe for key presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRecord {
    pub full_name_amharic: Option<String>,
    pub full_name_english: Option<String>,
    /// Date of birth in the Gregorian calendar, as printed (`YYYY/Mon/DD`).
    pub dob_gc: Option<String>,
    pub sex: Option<String>,
    /// Expiry date in the Gregorian calendar, as printed (`YYYY/Mon/DD`).
    pub expiry_date_gc: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub region: Option<String>,
    /// Fayda Identification Number, as printed after the `FIN` label.
    pub fin: Option<String>,
}

impl IdRecord {
    /// Number of fields the scan managed to populate.
    pub fn populated_len(&self) -> usize {
        [
            &self.full_name_amharic,
            &self.full_name_english,
            &self.dob_gc,
            &self.sex,
            &self.expiry_date_gc,
            &self.phone,
            &self.nationality,
            &self.region,
            &self.fin,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_len() == 0
    }
}

/// Result of the capture-quality gate for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpnessReport {
    /// Variance of the Laplacian of the luminance channel. Higher = sharper.
    pub score: f64,
    /// Whether the image cleared the threshold (`score > threshold`).
    pub is_clear: bool,
    pub threshold: f64,
    /// Set when the image could not be decoded. Such images are never clear.
    pub error: Option<String>,
}

impl SharpnessReport {
    pub fn scored(score: f64, threshold: f64) -> Self {
        Self {
            score,
            is_clear: score > threshold,
            threshold,
            error: None,
        }
    }

    /// An unreadable image must never be reported as ready.
    pub fn unreadable(threshold: f64, reason: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            is_clear: false,
            threshold,
            error: Some(reason.into()),
        }
    }
}
