//! File-backed table sources: spreadsheet exports as CSV, JSON tables, and
//! OCR / clipboard text.

use analysis_core::{Cell, RawTable, SourceError, TableSource};
use metric_resolver::split_text_blob;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Accepted JSON layouts, tried in order
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTables {
    Rows(Vec<Vec<Cell>>),
    Many(Vec<RawTable>),
    One(RawTable),
}

pub struct CsvFileSource {
    path: PathBuf,
    header_marker: String,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>, header_marker: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            header_marker: header_marker.into(),
        }
    }
}

impl TableSource for CsvFileSource {
    fn describe(&self) -> String {
        format!("CSV {}", self.path.display())
    }

    fn load_tables(&self) -> Result<Vec<RawTable>, SourceError> {
        let file = std::fs::File::open(&self.path)?;
        let table = parse_csv(file, &self.header_marker)
            .map_err(|e| SourceError::Parse(format!("{}: {}", self.path.display(), e)))?;
        Ok(vec![name_table(table, &self.path)])
    }
}

/// Read one sheet exported as CSV.
///
/// The row holding `header_marker` (Screener's `Narration` row) becomes the
/// header; otherwise a text-only first row does, the way spreadsheet readers
/// treat the first line.
pub fn parse_csv<R: Read>(reader: R, header_marker: &str) -> Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Cell> = record.iter().map(Cell::parse).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }

    let mut table = RawTable::new(rows);
    if !table.promote_header_row(header_marker) {
        table.promote_leading_text_row();
    }
    Ok(table)
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("JSON {}", self.path.display())
    }

    fn load_tables(&self) -> Result<Vec<RawTable>, SourceError> {
        let contents = std::fs::read_to_string(&self.path)?;
        let tables = parse_json_tables(&contents)?;
        Ok(tables.into_iter().map(|t| name_table(t, &self.path)).collect())
    }
}

pub fn parse_json_tables(json: &str) -> Result<Vec<RawTable>, SourceError> {
    Ok(match serde_json::from_str::<JsonTables>(json)? {
        JsonTables::Rows(rows) => vec![RawTable::new(rows)],
        JsonTables::Many(tables) => tables,
        JsonTables::One(table) => vec![table],
    })
}

pub enum TextOrigin {
    File(PathBuf),
    Stdin,
}

/// OCR output or a pasted clipboard table
pub struct TextSource {
    origin: TextOrigin,
}

impl TextSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: TextOrigin::File(path.into()),
        }
    }

    pub fn stdin() -> Self {
        Self {
            origin: TextOrigin::Stdin,
        }
    }
}

impl TableSource for TextSource {
    fn describe(&self) -> String {
        match &self.origin {
            TextOrigin::File(path) => format!("text {}", path.display()),
            TextOrigin::Stdin => "text <stdin>".to_string(),
        }
    }

    fn load_tables(&self) -> Result<Vec<RawTable>, SourceError> {
        match &self.origin {
            TextOrigin::File(path) => {
                let text = std::fs::read_to_string(path)?;
                Ok(split_text_blob(&text)
                    .into_iter()
                    .map(|t| name_table(t, path))
                    .collect())
            }
            TextOrigin::Stdin => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(split_text_blob(&text))
            }
        }
    }
}

/// Pick a source for an input argument by its extension; `-` reads text from stdin.
pub fn source_for_path(input: &str, header_marker: &str) -> Result<Box<dyn TableSource>, SourceError> {
    if input == "-" {
        return Ok(Box::new(TextSource::stdin()));
    }

    let path = Path::new(input);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(Box::new(CsvFileSource::new(path, header_marker))),
        "json" => Ok(Box::new(JsonFileSource::new(path))),
        "txt" | "text" => Ok(Box::new(TextSource::file(path))),
        _ => Err(SourceError::Unsupported(format!(
            "{} (expected .csv, .json, .txt or -)",
            input
        ))),
    }
}

/// Use the file stem as the table (sheet) name unless the source named it already.
fn name_table(table: RawTable, path: &Path) -> RawTable {
    if table.name.is_some() {
        return table;
    }
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => table.with_name(stem),
        None => table,
    }
}
