//! # YKK AP Portal Domain Models
//!
//! Core domain models shared by the BOM workbench and the draft store.
//!
//! ## Key Models
//!
//! - **BomHeader**: Outer or Inner BOM header with its variant-specific details
//! - **PartRecord**: a single row of a BOM part list, plus `PartDraft`/`PartPatch` inputs
//! - **QuotationDraft**: a quotation draft and its `QuotationSummary` index entry
//! - **SmtpSettings**: outbound mail settings saved from the admin screen
//!
//! ## Validation
//!
//! Input models derive `validator::Validate`; required text fields reject blank values.

pub mod bom;
pub mod part;
pub mod quotation;
pub mod smtp;


pub use bom::*;
pub use part::*;
pub use quotation::*;
pub use smtp::*;
