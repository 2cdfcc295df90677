//! # Domain Records
//!
//! Plain value records for the ownership tree
//!
//! ```text
//! Producer ─┬─ Farm ─┬─ Harvest ─┬─ Crop
//!           │        │           └─ Crop
//!           │        └─ Harvest
//!           └─ Farm
//! ```
//!
//! Records carry no behaviour beyond their own structural checks; traversal
//! and cascade logic belong to the registry services. Creation payloads
//! (`New*`) and partial updates (`*Patch`) are separate types so a caller
//! can never smuggle in an identifier or timestamp.
//!
//! ## Area invariant
//!
//! For every farm, `agricultural_area + vegetation_area <= total_area`,
//! with `total_area > 0` and both land uses non-negative. [`LandAreas`]
//! is the single place this is checked, on create and on the effective
//! post-update triple.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{DomainError, ValidationError};
use crate::identity::{CropId, FarmId, HarvestId, ProducerId};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A rural producer, identified by a unique CPF or CNPJ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    /// Registry-assigned identifier.
    pub id: ProducerId,
    /// Taxpayer document, unique among producers.
    pub document: Document,
    /// Producer name.
    pub name: String,
    /// When the producer was registered.
    pub created_at: DateTime<Utc>,
    /// When the producer was last modified.
    pub updated_at: DateTime<Utc>,
}

/// A farm owned by a producer. Areas are in hectares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    /// Registry-assigned identifier.
    pub id: FarmId,
    /// Owning producer.
    pub producer_id: ProducerId,
    /// Farm name.
    pub name: String,
    /// Municipality.
    pub city: String,
    /// Federative unit code (e.g. `SP`, `MT`).
    pub state: String,
    /// Total area.
    pub total_area: f64,
    /// Arable area.
    pub agricultural_area: f64,
    /// Preserved vegetation area.
    pub vegetation_area: f64,
    /// When the farm was registered.
    pub created_at: DateTime<Utc>,
    /// When the farm was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Farm {
    /// The farm's current area triple.
    pub fn areas(&self) -> LandAreas {
        LandAreas {
            total: self.total_area,
            agricultural: self.agricultural_area,
            vegetation: self.vegetation_area,
        }
    }
}

/// A harvest season recorded on a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    /// Registry-assigned identifier.
    pub id: HarvestId,
    /// Farm the harvest belongs to.
    pub farm_id: FarmId,
    /// Harvest year.
    pub year: i32,
    /// Free-form label, e.g. "Safra 2024 - Verão".
    pub description: String,
    /// When the harvest was recorded.
    pub created_at: DateTime<Utc>,
}

/// A crop planted within a harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    /// Registry-assigned identifier.
    pub id: CropId,
    /// Harvest the crop belongs to.
    pub harvest_id: HarvestId,
    /// Planted culture.
    pub crop_type: CropType,
    /// Planted area in hectares, strictly positive.
    pub planted_area: f64,
    /// When the crop was recorded.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Crop types
// ---------------------------------------------------------------------------

/// Supported cultures.
///
/// Serialized in SCREAMING_SNAKE_CASE. The Portuguese names used by
/// earlier clients (`SOJA`, `MILHO`, `ALGODAO`, `CAFE`, `CANA_DE_ACUCAR`)
/// are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CropType {
    /// Soybean.
    #[serde(alias = "SOJA")]
    Soy,
    /// Corn.
    #[serde(alias = "MILHO")]
    Corn,
    /// Cotton.
    #[serde(alias = "ALGODAO")]
    Cotton,
    /// Coffee.
    #[serde(alias = "CAFE")]
    Coffee,
    /// Sugarcane.
    #[serde(alias = "CANA_DE_ACUCAR")]
    Sugarcane,
}

impl CropType {
    /// Every supported culture, in declaration order.
    pub const ALL: [CropType; 5] = [
        Self::Soy,
        Self::Corn,
        Self::Cotton,
        Self::Coffee,
        Self::Sugarcane,
    ];

    /// Return the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soy => "SOY",
            Self::Corn => "CORN",
            Self::Cotton => "COTTON",
            Self::Coffee => "COFFEE",
            Self::Sugarcane => "SUGARCANE",
        }
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CropType {
    type Err = ValidationError;

    /// Case-insensitive; accepts canonical and Portuguese names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOY" | "SOJA" => Ok(Self::Soy),
            "CORN" | "MILHO" => Ok(Self::Corn),
            "COTTON" | "ALGODAO" => Ok(Self::Cotton),
            "COFFEE" | "CAFE" => Ok(Self::Coffee),
            "SUGARCANE" | "CANA_DE_ACUCAR" => Ok(Self::Sugarcane),
            _ => Err(ValidationError::UnknownCropType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Area invariant
// ---------------------------------------------------------------------------

/// A farm's area triple, in hectares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandAreas {
    /// Total area.
    pub total: f64,
    /// Arable area.
    pub agricultural: f64,
    /// Preserved vegetation area.
    pub vegetation: f64,
}

impl LandAreas {
    /// Check the range rules and the area invariant.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidArea`] if any value is not finite, the total
    ///   is not strictly positive, or a land use is negative.
    /// - [`DomainError::AreaInvariantViolation`] if agricultural plus
    ///   vegetation exceeds the total.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("total_area", self.total),
            ("agricultural_area", self.agricultural),
            ("vegetation_area", self.vegetation),
        ] {
            if !value.is_finite() {
                return Err(DomainError::InvalidArea(format!(
                    "{field} must be a finite number"
                )));
            }
        }
        if self.total <= 0.0 {
            return Err(DomainError::InvalidArea(format!(
                "total_area must be greater than zero, got {}",
                self.total
            )));
        }
        if self.agricultural < 0.0 {
            return Err(DomainError::InvalidArea(format!(
                "agricultural_area must not be negative, got {}",
                self.agricultural
            )));
        }
        if self.vegetation < 0.0 {
            return Err(DomainError::InvalidArea(format!(
                "vegetation_area must not be negative, got {}",
                self.vegetation
            )));
        }
        if self.agricultural + self.vegetation > self.total {
            return Err(DomainError::AreaInvariantViolation {
                agricultural: self.agricultural,
                vegetation: self.vegetation,
                total: self.total,
            });
        }
        Ok(())
    }

    /// The effective triple after applying `patch`: absent fields keep
    /// their current values.
    pub fn overlay(&self, patch: &FarmPatch) -> Self {
        Self {
            total: patch.total_area.unwrap_or(self.total),
            agricultural: patch.agricultural_area.unwrap_or(self.agricultural),
            vegetation: patch.vegetation_area.unwrap_or(self.vegetation),
        }
    }
}

/// Check that a planted area is a finite, strictly positive number.
pub fn validate_planted_area(area: f64) -> Result<(), DomainError> {
    if !area.is_finite() || area <= 0.0 {
        return Err(DomainError::InvalidArea(format!(
            "planted_area must be greater than zero, got {area}"
        )));
    }
    Ok(())
}

/// Trim `value` and reject it if nothing is left.
pub fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Normalize a federative unit code: trimmed, uppercase, non-empty.
pub fn state_code(value: &str) -> Result<String, ValidationError> {
    required_text("state", value).map(|s| s.to_ascii_uppercase())
}

// ---------------------------------------------------------------------------
// Creation payloads and patches
// ---------------------------------------------------------------------------

/// Payload for registering a producer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProducer {
    /// Producer name.
    pub name: String,
    /// Raw document; punctuation is allowed.
    pub document: String,
}

/// Partial update of a producer. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducerPatch {
    /// New name.
    pub name: Option<String>,
    /// New raw document.
    pub document: Option<String>,
}

impl ProducerPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.document.is_none()
    }
}

/// Payload for registering a farm.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFarm {
    /// Owning producer; must exist.
    pub producer_id: ProducerId,
    /// Farm name.
    pub name: String,
    /// Municipality.
    pub city: String,
    /// Federative unit code.
    pub state: String,
    /// Total area.
    pub total_area: f64,
    /// Arable area.
    pub agricultural_area: f64,
    /// Preserved vegetation area.
    pub vegetation_area: f64,
}

impl NewFarm {
    /// The requested area triple.
    pub fn areas(&self) -> LandAreas {
        LandAreas {
            total: self.total_area,
            agricultural: self.agricultural_area,
            vegetation: self.vegetation_area,
        }
    }
}

/// Partial update of a farm. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FarmPatch {
    /// New name.
    pub name: Option<String>,
    /// New municipality.
    pub city: Option<String>,
    /// New federative unit code.
    pub state: Option<String>,
    /// New total area.
    pub total_area: Option<f64>,
    /// New arable area.
    pub agricultural_area: Option<f64>,
    /// New vegetation area.
    pub vegetation_area: Option<f64>,
}

/// Payload for recording a harvest.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHarvest {
    /// Farm the harvest belongs to; must exist.
    pub farm_id: FarmId,
    /// Harvest year.
    pub year: i32,
    /// Free-form label.
    pub description: String,
}

/// Payload for recording a planted crop.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCrop {
    /// Harvest the crop belongs to; must exist.
    pub harvest_id: HarvestId,
    /// Planted culture.
    pub crop_type: CropType,
    /// Planted area, strictly positive.
    pub planted_area: f64,
}
