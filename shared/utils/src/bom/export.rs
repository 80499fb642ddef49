//! BOM Export
//!
//! Spreadsheet and printable-report output of a BOM part list. Both carry the
//! computed "Cut Length" column and 1-based row numbering.

use anyhow::Context;
use handlebars::Handlebars;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use tracing::info;
use ykk_models::{BomHeader, BomVariant, PartField, PartRecord};

use super::formula::{cut_length, format_number, Dimensions};
use crate::error::{PortalError, PortalResult};

pub const ROW_NUMBER_HEADER: &str = "#";
pub const CUT_LENGTH_HEADER: &str = "Cut Length";

/// Export columns in order. Field columns reuse the import labels so an
/// exported sheet maps itself automatically when imported again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportColumn {
    RowNumber,
    Field(PartField),
    CutLength,
}

impl ExportColumn {
    pub fn header(&self) -> &'static str {
        match self {
            Self::RowNumber => ROW_NUMBER_HEADER,
            Self::Field(field) => field.label(),
            Self::CutLength => CUT_LENGTH_HEADER,
        }
    }
}

pub fn export_columns(variant: BomVariant) -> Vec<ExportColumn> {
    let mut columns = vec![ExportColumn::RowNumber];
    for field in PartField::ALL {
        match field {
            PartField::Color if variant == BomVariant::Outer => continue,
            PartField::CutFormula => {
                columns.push(ExportColumn::Field(field));
                columns.push(ExportColumn::CutLength);
            }
            _ => columns.push(ExportColumn::Field(field)),
        }
    }
    columns
}

/// Serializes the part list to an `.xlsx` workbook.
pub fn export_xlsx(header: &BomHeader, parts: &[PartRecord], dims: Dimensions) -> PortalResult<Vec<u8>> {
    let buffer = write_workbook(header, parts, dims)
        .map_err(|e| PortalError::internal(format!("Failed to write workbook: {}", e)))?;

    info!(bom = %header.code, parts = parts.len(), bytes = buffer.len(), "Exported BOM workbook");
    Ok(buffer)
}

fn write_workbook(header: &BomHeader, parts: &[PartRecord], dims: Dimensions) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet_name(&header.code).as_str())?;

    let bold = Format::new().set_bold();
    let columns = export_columns(header.variant());

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, column.header(), &bold)?;
        worksheet.set_column_width(col, column_width(*column))?;
    }

    for (idx, part) in parts.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            match column {
                ExportColumn::RowNumber => {
                    worksheet.write_number(row, col, (idx + 1) as f64)?;
                }
                ExportColumn::Field(PartField::Quantity) => {
                    worksheet.write_number(row, col, part.quantity as f64)?;
                }
                ExportColumn::Field(field) => {
                    worksheet.write_string(row, col, part.value_of(*field).as_str())?;
                }
                ExportColumn::CutLength => {
                    worksheet.write_string(row, col, cut_length(part, dims).as_str())?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer()
}

/// Excel sheet names are capped at 31 characters and exclude `[]:*?/\`.
fn sheet_name(code: &str) -> String {
    let cleaned: String = code
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "BOM".to_string()
    } else {
        cleaned
    }
}

fn column_width(column: ExportColumn) -> f64 {
    match column {
        ExportColumn::RowNumber => 5.0,
        ExportColumn::Field(PartField::Description) => 36.0,
        ExportColumn::Field(PartField::Quantity) => 6.0,
        ExportColumn::Field(PartField::Note) | ExportColumn::Field(PartField::Remarks) => 24.0,
        _ => 14.0,
    }
}

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>
body{font-family:Arial,sans-serif;font-size:11px;color:#111;margin:24px;}
h1{font-size:18px;margin:0 0 8px 0;}
.meta{margin-bottom:12px;}
.meta span{display:inline-block;margin-right:24px;}
table{border-collapse:collapse;width:100%;}
th,td{border:1px solid #999;padding:3px 5px;text-align:left;}
th{background:#e5e7eb;}
td.num{text-align:right;}
@media print{body{margin:0;}}
</style>
</head>
<body>
<h1>{{title}}</h1>
<div class="meta">
{{#each meta}}<span><strong>{{label}}:</strong> {{value}}</span>
{{/each}}</div>
<table>
<thead><tr>{{#each headers}}<th>{{this}}</th>{{/each}}</tr></thead>
<tbody>
{{#each rows}}<tr>{{#each cells}}<td{{#if numeric}} class="num"{{/if}}>{{text}}</td>{{/each}}</tr>
{{/each}}</tbody>
</table>
<p>Generated {{generated_at}}</p>
</body>
</html>
"#;

#[derive(Serialize)]
struct ReportMeta {
    label: &'static str,
    value: String,
}

#[derive(Serialize)]
struct ReportCell {
    text: String,
    numeric: bool,
}

#[derive(Serialize)]
struct ReportRow {
    cells: Vec<ReportCell>,
}

#[derive(Serialize)]
struct ReportContext {
    title: String,
    meta: Vec<ReportMeta>,
    headers: Vec<&'static str>,
    rows: Vec<ReportRow>,
    generated_at: String,
}

/// Renders the printable HTML document for a BOM.
pub fn render_report(header: &BomHeader, parts: &[PartRecord], dims: Dimensions) -> PortalResult<String> {
    let columns = export_columns(header.variant());

    let rows = parts
        .iter()
        .enumerate()
        .map(|(idx, part)| ReportRow {
            cells: columns
                .iter()
                .map(|column| match column {
                    ExportColumn::RowNumber => ReportCell {
                        text: (idx + 1).to_string(),
                        numeric: true,
                    },
                    ExportColumn::Field(field) => ReportCell {
                        text: part.value_of(*field),
                        numeric: *field == PartField::Quantity,
                    },
                    ExportColumn::CutLength => ReportCell {
                        text: cut_length(part, dims),
                        numeric: false,
                    },
                })
                .collect(),
        })
        .collect();

    let context = ReportContext {
        title: header.title(),
        meta: report_meta(header, dims),
        headers: columns.iter().map(ExportColumn::header).collect(),
        rows,
        generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
    };

    let html = Handlebars::new()
        .render_template(REPORT_TEMPLATE, &context)
        .context("Failed to render BOM report")
        .map_err(|e| PortalError::internal(format!("{:#}", e)))?;

    Ok(html)
}

fn report_meta(header: &BomHeader, dims: Dimensions) -> Vec<ReportMeta> {
    let mut meta = vec![
        ReportMeta {
            label: "Series",
            value: header.series.clone(),
        },
        ReportMeta {
            label: "Window System",
            value: header.window_system.clone(),
        },
        ReportMeta {
            label: "Frame Depth",
            value: header.frame_depth.clone(),
        },
    ];

    match header.glass_groove() {
        Some(glass_groove) => meta.push(ReportMeta {
            label: "Glass Groove",
            value: glass_groove.to_string(),
        }),
        None => meta.push(ReportMeta {
            label: "Open Direction",
            value: header.open_direction.to_string(),
        }),
    }

    meta.push(ReportMeta {
        label: "Size (W × H)",
        value: format!("{} × {}", format_number(dims.width), format_number(dims.height)),
    });
    meta
}
