//! Part record models for BOM part lists.
//!
//! A `PartDraft` is the validated input used for manual adds and bulk imports,
//! a `PartRecord` is the stored row with its store-assigned id, and a
//! `PartPatch` carries a partial update.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Literal used for cut formulas, angles and fab numbers that do not apply.
pub const NOT_APPLICABLE: &str = "N/A";

/// Store-local part identifier.
pub type PartId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MaterialType {
    #[default]
    Profile,
    Hardware,
    Accessories,
    Gasket,
    Glass,
    Sealant,
}

impl MaterialType {
    pub const ALL: [MaterialType; 6] = [
        MaterialType::Profile,
        MaterialType::Hardware,
        MaterialType::Accessories,
        MaterialType::Gasket,
        MaterialType::Glass,
        MaterialType::Sealant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Hardware => "Hardware",
            Self::Accessories => "Accessories",
            Self::Gasket => "Gasket",
            Self::Glass => "Glass",
            Self::Sealant => "Sealant",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown material type: {}", s))
    }
}

/// Editable and diffable part fields. The identifier is deliberately absent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum PartField {
    PartCode,
    Description,
    Quantity,
    MaterialType,
    CutFormula,
    Material,
    Note,
    Remarks,
    Angle,
    FabNo,
    Color,
}

impl PartField {
    /// Column order used by exports and diffs.
    pub const ALL: [PartField; 11] = [
        PartField::PartCode,
        PartField::Description,
        PartField::Quantity,
        PartField::MaterialType,
        PartField::CutFormula,
        PartField::Material,
        PartField::Note,
        PartField::Remarks,
        PartField::Angle,
        PartField::FabNo,
        PartField::Color,
    ];

    /// Fields that must be mapped before an import can be previewed.
    pub const REQUIRED: [PartField; 5] = [
        PartField::PartCode,
        PartField::Description,
        PartField::Quantity,
        PartField::MaterialType,
        PartField::Material,
    ];

    /// Machine name, as used in change sets and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PartCode => "partCode",
            Self::Description => "description",
            Self::Quantity => "quantity",
            Self::MaterialType => "materialType",
            Self::CutFormula => "cutFormula",
            Self::Material => "material",
            Self::Note => "note",
            Self::Remarks => "remarks",
            Self::Angle => "angle",
            Self::FabNo => "fabNo",
            Self::Color => "color",
        }
    }

    /// Spreadsheet column label. Import auto-mapping matches these exactly.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PartCode => "Part Code",
            Self::Description => "Description",
            Self::Quantity => "Qty",
            Self::MaterialType => "Material Type",
            Self::CutFormula => "Cut Formula",
            Self::Material => "Material",
            Self::Note => "Note",
            Self::Remarks => "Remarks",
            Self::Angle => "Angle",
            Self::FabNo => "FAB No.",
            Self::Color => "Color",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for PartField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("Unknown part field: {}", s))
    }
}

/// A stored part row, owned by exactly one BOM's part store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    pub id: PartId,
    pub part_code: String,
    pub description: String,
    pub quantity: i64,
    pub material_type: MaterialType,
    pub cut_formula: String,
    pub material: String,
    pub note: String,
    pub remarks: String,
    pub angle: String,
    pub fab_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PartRecord {
    pub fn from_draft(id: PartId, draft: PartDraft) -> Self {
        Self {
            id,
            part_code: draft.part_code.trim().to_string(),
            description: draft.description.trim().to_string(),
            quantity: draft.quantity,
            material_type: draft.material_type,
            cut_formula: draft.cut_formula,
            material: draft.material,
            note: draft.note,
            remarks: draft.remarks,
            angle: draft.angle,
            fab_no: draft.fab_no,
            color: draft.color,
        }
    }

    /// Display value of a field. Missing color renders as an empty string.
    pub fn value_of(&self, field: PartField) -> String {
        match field {
            PartField::PartCode => self.part_code.clone(),
            PartField::Description => self.description.clone(),
            PartField::Quantity => self.quantity.to_string(),
            PartField::MaterialType => self.material_type.to_string(),
            PartField::CutFormula => self.cut_formula.clone(),
            PartField::Material => self.material.clone(),
            PartField::Note => self.note.clone(),
            PartField::Remarks => self.remarks.clone(),
            PartField::Angle => self.angle.clone(),
            PartField::FabNo => self.fab_no.clone(),
            PartField::Color => self.color.clone().unwrap_or_default(),
        }
    }

    /// Sets a single field from its text form.
    pub fn set_field(&mut self, field: PartField, value: &str) -> Result<(), String> {
        match field {
            PartField::PartCode => self.part_code = value.to_string(),
            PartField::Description => self.description = value.to_string(),
            PartField::Quantity => {
                self.quantity = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("Quantity must be a whole number, got '{}'", value))?;
            }
            PartField::MaterialType => self.material_type = value.parse()?,
            PartField::CutFormula => self.cut_formula = value.to_string(),
            PartField::Material => self.material = value.to_string(),
            PartField::Note => self.note = value.to_string(),
            PartField::Remarks => self.remarks = value.to_string(),
            PartField::Angle => self.angle = value.to_string(),
            PartField::FabNo => self.fab_no = value.to_string(),
            PartField::Color => {
                self.color = if value.is_empty() { None } else { Some(value.to_string()) }
            }
        }
        Ok(())
    }

    /// Merges every present patch field into the record.
    pub fn apply(&mut self, patch: PartPatch) {
        if let Some(v) = patch.part_code {
            self.part_code = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.quantity {
            self.quantity = v;
        }
        if let Some(v) = patch.material_type {
            self.material_type = v;
        }
        if let Some(v) = patch.cut_formula {
            self.cut_formula = v;
        }
        if let Some(v) = patch.material {
            self.material = v;
        }
        if let Some(v) = patch.note {
            self.note = v;
        }
        if let Some(v) = patch.remarks {
            self.remarks = v;
        }
        if let Some(v) = patch.angle {
            self.angle = v;
        }
        if let Some(v) = patch.fab_no {
            self.fab_no = v;
        }
        if let Some(v) = patch.color {
            self.color = Some(v);
        }
    }

    /// The draft this record would have been created from.
    pub fn to_draft(&self) -> PartDraft {
        PartDraft {
            part_code: self.part_code.clone(),
            description: self.description.clone(),
            quantity: self.quantity,
            material_type: self.material_type,
            cut_formula: self.cut_formula.clone(),
            material: self.material.clone(),
            note: self.note.clone(),
            remarks: self.remarks.clone(),
            angle: self.angle.clone(),
            fab_no: self.fab_no.clone(),
            color: self.color.clone(),
        }
    }
}

/// Input for a new part, validated before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PartDraft {
    #[validate(custom = "not_blank")]
    pub part_code: String,
    #[validate(custom = "not_blank")]
    pub description: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
    pub material_type: MaterialType,
    pub cut_formula: String,
    pub material: String,
    pub note: String,
    pub remarks: String,
    pub angle: String,
    pub fab_no: String,
    pub color: Option<String>,
}

impl Default for PartDraft {
    fn default() -> Self {
        Self {
            part_code: String::new(),
            description: String::new(),
            quantity: 1,
            material_type: MaterialType::default(),
            cut_formula: NOT_APPLICABLE.to_string(),
            material: String::new(),
            note: String::new(),
            remarks: String::new(),
            angle: NOT_APPLICABLE.to_string(),
            fab_no: NOT_APPLICABLE.to_string(),
            color: None,
        }
    }
}

impl PartDraft {
    pub fn new(part_code: impl Into<String>, description: impl Into<String>, material_type: MaterialType) -> Self {
        Self {
            part_code: part_code.into(),
            description: description.into(),
            material_type,
            ..Self::default()
        }
    }
}

/// Partial update for an existing part. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PartPatch {
    pub part_code: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub material_type: Option<MaterialType>,
    pub cut_formula: Option<String>,
    pub material: Option<String>,
    pub note: Option<String>,
    pub remarks: Option<String>,
    pub angle: Option<String>,
    pub fab_no: Option<String>,
    pub color: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}
