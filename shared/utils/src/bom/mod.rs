//! BOM Workbench Core
//!
//! Part storage, cut formula evaluation, revision sessions, spreadsheet
//! import with column mapping, and export/report output.

pub mod export;
pub mod formula;
pub mod import;
pub mod revision;
pub mod store;

pub use export::{export_columns, export_xlsx, render_report, ExportColumn};
pub use formula::{cut_length, evaluate, format_number, Dimensions};
pub use import::{
    coerce_quantity, materialize, parse_workbook, validate_mapping, ColumnMapping, ImportPreview,
    ImportWarning, ParsedSheet, SheetFormat, SheetRow,
};
pub use revision::{compute_change_set, Change, RevisionSession, RevisionState, SaveOutcome};
pub use store::BomPartStore;
