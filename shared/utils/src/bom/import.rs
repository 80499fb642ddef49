//! BOM Spreadsheet Import
//!
//! Reads the first sheet of an uploaded workbook, lets the caller map sheet
//! columns onto part fields, and materializes part drafts from the mapped rows.

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_from_rs, DataType, Range, Reader, Xls, Xlsx};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read, Seek};
use std::ops::Index;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;
use ykk_models::{BomVariant, MaterialType, PartDraft, PartField, NOT_APPLICABLE};

use crate::error::{PortalError, PortalResult};

/// Supported spreadsheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SheetFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// One data row keyed by column header. Blank cells are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetRow {
    /// Spreadsheet row number, header row being 1
    pub line: usize,
    pub cells: HashMap<String, String>,
}

impl SheetRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }
}

impl Index<&str> for SheetRow {
    type Output = String;

    fn index(&self, column: &str) -> &String {
        &self.cells[column]
    }
}

/// First sheet of an uploaded workbook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSheet {
    pub id: Uuid,
    pub filename: String,
    pub format: SheetFormat,
    /// Keys of the first data row, in sheet order
    pub columns: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// Parses an uploaded workbook. A sheet without data rows is an error.
pub fn parse_workbook(filename: &str, data: &[u8]) -> PortalResult<ParsedSheet> {
    let format = SheetFormat::from_extension(Path::new(filename)).ok_or_else(|| {
        PortalError::validation("file_type", format!("Unsupported spreadsheet file: {}", filename))
    })?;

    let table = match format {
        SheetFormat::Xlsx => read_excel::<Xlsx<Source>>(data),
        SheetFormat::Xls => read_excel::<Xls<Source>>(data),
        SheetFormat::Csv => read_csv(data),
    }
    .map_err(|e| PortalError::spreadsheet(format!("{:#}", e)))?;

    let sheet = build_sheet(filename, format, table)?;
    info!(
        filename = %sheet.filename,
        rows = sheet.rows.len(),
        columns = sheet.columns.len(),
        "Parsed BOM spreadsheet"
    );
    Ok(sheet)
}

/// Header cells and the raw data rows beneath them, each with its row number.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

type Source = Cursor<Vec<u8>>;

fn read_excel<R>(data: &[u8]) -> Result<RawTable>
where
    R: Reader<Source>,
{
    let cursor = Cursor::new(data.to_vec());
    let mut workbook: R = open_workbook_from_rs(cursor)
        .map_err(|e| anyhow!("{:?}", e))
        .context("Failed to open Excel workbook")?;

    let range = first_sheet::<Source, R>(&mut workbook)?;
    let header_line = range.start().map_or(1, |(row, _)| row as usize + 1);
    let mut rows_iter = range.rows();

    // First row is headers
    let headers: Vec<String> = rows_iter
        .next()
        .context("Empty worksheet")?
        .iter()
        .map(|cell: &DataType| cell.to_string().trim().to_string())
        .collect();

    let rows = rows_iter
        .enumerate()
        .map(|(idx, row)| {
            let cells = row.iter().map(|cell: &DataType| cell.to_string()).collect();
            (header_line + 1 + idx, cells)
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn first_sheet<RS, R>(workbook: &mut R) -> Result<Range<DataType>>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("No sheets found in workbook")?;

    workbook
        .worksheet_range(&sheet_name)
        .context("Failed to read worksheet")?
        .map_err(|e| anyhow!("Failed to read worksheet '{}': {:?}", sheet_name, e))
}

fn read_csv(data: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Row {}: Parse error", idx + 2))?;
        let line = record.position().map_or(idx + 2, |pos| pos.line() as usize);
        rows.push((line, record.iter().map(str::to_string).collect()));
    }

    Ok(RawTable { headers, rows })
}

fn build_sheet(filename: &str, format: SheetFormat, table: RawTable) -> PortalResult<ParsedSheet> {
    let headers = dedupe_headers(&table.headers);

    let rows: Vec<SheetRow> = table
        .rows
        .iter()
        .map(|(line, cells)| SheetRow {
            line: *line,
            cells: headers
                .iter()
                .zip(cells.iter())
                .filter_map(|(header, value)| {
                    let header = header.as_ref()?;
                    let value = value.trim();
                    (!value.is_empty()).then(|| (header.clone(), value.to_string()))
                })
                .collect(),
        })
        .filter(|row| !row.cells.is_empty())
        .collect();

    let first = rows
        .first()
        .ok_or_else(|| PortalError::spreadsheet(format!("{} contains no data rows", filename)))?;

    let columns = headers
        .iter()
        .flatten()
        .filter(|header| first.contains_key(*header))
        .cloned()
        .collect();

    Ok(ParsedSheet {
        id: Uuid::new_v4(),
        filename: filename.to_string(),
        format,
        columns,
        rows,
    })
}

/// Blank headers yield `None`; repeated headers get `_1`, `_2`, ... suffixes.
fn dedupe_headers(headers: &[String]) -> Vec<Option<String>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            if header.is_empty() {
                return None;
            }
            let count = seen.entry(header.as_str()).or_insert(0);
            let name = if *count == 0 {
                header.clone()
            } else {
                format!("{}_{}", header, count)
            };
            *count += 1;
            Some(name)
        })
        .collect()
}

/// Target part field to source column header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<PartField, String>);

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps every field whose canonical label appears verbatim among `columns`.
    pub fn auto(columns: &[String]) -> Self {
        let mapping = PartField::ALL
            .iter()
            .filter_map(|field| {
                columns
                    .iter()
                    .find(|column| column.as_str() == field.label())
                    .map(|column| (*field, column.clone()))
            })
            .collect();
        Self(mapping)
    }

    pub fn set(&mut self, field: PartField, column: impl Into<String>) {
        self.0.insert(field, column.into());
    }

    pub fn unset(&mut self, field: PartField) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: PartField) -> Option<&str> {
        self.0.get(&field).map(String::as_str).filter(|c| !c.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartField, &str)> {
        self.0.iter().map(|(field, column)| (*field, column.as_str()))
    }
}

/// Required fields that have no column yet. Preview is blocked until empty.
pub fn validate_mapping(mapping: &ColumnMapping) -> Vec<PartField> {
    PartField::REQUIRED
        .iter()
        .copied()
        .filter(|field| mapping.get(*field).is_none())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWarning {
    /// Spreadsheet row number of the offending row
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub parts: Vec<PartDraft>,
    pub skipped: usize,
    pub warnings: Vec<ImportWarning>,
}

/// Builds part drafts from mapped rows.
pub fn materialize(
    rows: &[SheetRow],
    mapping: &ColumnMapping,
    variant: BomVariant,
) -> PortalResult<ImportPreview> {
    let missing = validate_mapping(mapping);
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(PartField::as_str).collect();
        return Err(PortalError::validation(
            "mapping",
            format!("Missing required columns: {}", names.join(", ")),
        ));
    }

    let mut parts = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();
    let mut skipped = 0;

    for row in rows {
        let row_number = row.line;
        let cell = |field: PartField| -> Option<String> {
            mapping
                .get(field)
                .and_then(|column| row.get(column))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let (part_code, description) = match (cell(PartField::PartCode), cell(PartField::Description)) {
            (Some(code), Some(description)) => (code, description),
            _ => {
                skipped += 1;
                warnings.push(ImportWarning {
                    row: row_number,
                    message: "Missing part code or description, row skipped".to_string(),
                });
                continue;
            }
        };

        let material_type = match cell(PartField::MaterialType).map(|v| v.parse::<MaterialType>()) {
            Some(Ok(material_type)) => material_type,
            Some(Err(message)) => {
                warnings.push(ImportWarning {
                    row: row_number,
                    message: format!("{}, defaulted to {}", message, MaterialType::default()),
                });
                MaterialType::default()
            }
            None => MaterialType::default(),
        };

        let color = match variant {
            BomVariant::Inner => cell(PartField::Color),
            BomVariant::Outer => None,
        };

        parts.push(PartDraft {
            part_code,
            description,
            quantity: coerce_quantity(cell(PartField::Quantity).as_deref()),
            material_type,
            cut_formula: cell(PartField::CutFormula).unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            material: cell(PartField::Material).unwrap_or_default(),
            note: cell(PartField::Note).unwrap_or_default(),
            remarks: cell(PartField::Remarks).unwrap_or_default(),
            angle: cell(PartField::Angle).unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            fab_no: cell(PartField::FabNo).unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            color,
        });
    }

    if !warnings.is_empty() {
        warn!(count = warnings.len(), "BOM import produced warnings");
    }

    Ok(ImportPreview {
        parts,
        skipped,
        warnings,
    })
}

/// Integer quantity from a cell. Unparseable, zero or negative values become 1.
pub fn coerce_quantity(value: Option<&str>) -> i64 {
    let Some(value) = value.map(str::trim) else {
        return 1;
    };

    let parsed = value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    });

    match parsed {
        Some(quantity) if quantity > 0 => quantity,
        _ => 1,
    }
}
