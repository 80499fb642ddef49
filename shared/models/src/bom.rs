//! BOM header models.
//!
//! Outer and Inner BOMs share most of their header; the variant-specific part
//! lives in `VariantDetails`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BomVariant {
    Outer,
    Inner,
}

impl fmt::Display for BomVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outer => write!(f, "outer"),
            Self::Inner => write!(f, "inner"),
        }
    }
}

impl FromStr for BomVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outer" => Ok(Self::Outer),
            "inner" => Ok(Self::Inner),
            _ => Err(format!("Unknown BOM variant: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OpenDirection {
    L,
    R,
    LR,
}

impl fmt::Display for OpenDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L => write!(f, "L"),
            Self::R => write!(f, "R"),
            Self::LR => write!(f, "LR"),
        }
    }
}

impl FromStr for OpenDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L" => Ok(Self::L),
            "R" => Ok(Self::R),
            "LR" => Ok(Self::LR),
            other => Err(format!("Open direction must be L, R or LR, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum VariantDetails {
    Outer {
        #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    Inner {
        #[serde(rename = "glassGroove")]
        glass_groove: String,
    },
}

/// Header of a created BOM. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BomHeader {
    pub id: Uuid,
    pub code: String,
    pub series: String,
    pub window_system: String,
    pub frame_depth: String,
    pub open_direction: OpenDirection,
    pub handle_type: String,
    pub drawing_no: String,
    pub approver: String,
    #[serde(flatten)]
    pub details: VariantDetails,
    pub created_at: DateTime<Utc>,
}

impl BomHeader {
    pub fn variant(&self) -> BomVariant {
        match self.details {
            VariantDetails::Outer { .. } => BomVariant::Outer,
            VariantDetails::Inner { .. } => BomVariant::Inner,
        }
    }

    pub fn glass_groove(&self) -> Option<&str> {
        match &self.details {
            VariantDetails::Inner { glass_groove } => Some(glass_groove),
            VariantDetails::Outer { .. } => None,
        }
    }

    /// Document title used by exports.
    pub fn title(&self) -> String {
        match self.variant() {
            BomVariant::Outer => format!("Outer BOM {}", self.code),
            BomVariant::Inner => format!("Inner BOM {}", self.code),
        }
    }
}

/// BOM creation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBom {
    pub variant: BomVariant,
    #[validate(length(min = 1, max = 100, message = "BOM code must be between 1 and 100 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "Series is required"))]
    pub series: String,
    #[validate(length(min = 1, max = 200, message = "Window system is required"))]
    pub window_system: String,
    #[validate(length(min = 1, max = 50, message = "Frame depth is required"))]
    pub frame_depth: String,
    pub open_direction: OpenDirection,
    #[serde(default)]
    pub handle_type: String,
    #[serde(default)]
    pub drawing_no: String,
    #[serde(default)]
    pub approver: String,
    #[serde(default)]
    pub glass_groove: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewBom {
    /// Builds the header. Inner BOMs must carry a glass groove depth.
    pub fn into_header(self) -> Result<BomHeader, String> {
        let details = match self.variant {
            BomVariant::Outer => VariantDetails::Outer {
                image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            },
            BomVariant::Inner => {
                let glass_groove = self
                    .glass_groove
                    .filter(|g| !g.trim().is_empty())
                    .ok_or_else(|| "Glass groove is required for inner BOMs".to_string())?;
                VariantDetails::Inner { glass_groove }
            }
        };

        Ok(BomHeader {
            id: Uuid::new_v4(),
            code: self.code.trim().to_string(),
            series: self.series,
            window_system: self.window_system,
            frame_depth: self.frame_depth,
            open_direction: self.open_direction,
            handle_type: self.handle_type,
            drawing_no: self.drawing_no,
            approver: self.approver,
            details,
            created_at: Utc::now(),
        })
    }
}
