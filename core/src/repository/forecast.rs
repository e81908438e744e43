//! Forecast roster hours import.
//!
//! Reads a workbook (xlsx/xls/ods through calamine) or a CSV export and maps
//! each row's free-text process name to a [`ProcessKey`]. Rows that don't
//! resolve are skipped; an import with no usable rows is an error so the
//! caller can keep its previous override.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::forecast::ForecastOverride;
use crate::model::process::ProcessKey;

/// Sheet names tried before falling back to the first sheet.
pub const FORECAST_SHEET_NAMES: [&str; 2] = ["forecast roster hours", "forecast hours alternate"];

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

// Normalised alias → process. Exact matches are tried first, then
// containment for aliases of four letters or more.
const ALIASES: [(&str, ProcessKey); 15] = [
    ("decant", ProcessKey::Decant),
    ("loadfill", ProcessKey::Loadfill),
    ("lf", ProcessKey::Loadfill),
    ("sequence", ProcessKey::Loadfill),
    ("sequencing", ProcessKey::Loadfill),
    ("packaway", ProcessKey::Packaway),
    ("pa", ProcessKey::Packaway),
    ("digitalshopkeeping", ProcessKey::Digital),
    ("shopkeeping", ProcessKey::Digital),
    ("digital", ProcessKey::Digital),
    ("omsonline", ProcessKey::Online),
    ("online", ProcessKey::Online),
    ("backfill", ProcessKey::Backfill),
    ("bf", ProcessKey::Backfill),
    ("replenishment", ProcessKey::Backfill),
];

#[derive(Debug, Error)]
pub enum ForecastImportError {
    #[error("Could not read workbook: {0}")]
    Unreadable(String),

    #[error("Workbook has no worksheets")]
    NoSheet,

    #[error("Worksheet '{0}' is empty")]
    EmptySheet(String),

    #[error("No forecast rows matched a known process in '{0}'")]
    NoUsableRows(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A cell reduced to what the row scan cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Empty => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Lowercases and keeps ASCII letters only: "Load Fill (LF)" → "loadfilllf".
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn match_process(raw: &str) -> Option<ProcessKey> {
    let name = normalize_name(raw);
    if name.is_empty() {
        return None;
    }
    if let Some((_, p)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Some(*p);
    }
    ALIASES
        .iter()
        .filter(|(alias, _)| alias.len() >= 4)
        .find(|(alias, _)| name.contains(alias))
        .map(|(_, p)| *p)
}

/// Parses hours text such as "1,234.5", " 80 " or "42 hrs".
pub fn parse_hours(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();
    let trimmed = lowered
        .trim_end_matches("hrs")
        .trim_end_matches("hours")
        .trim_end_matches('h')
        .trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn cell_hours(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(t) => parse_hours(t),
        _ => None,
    }
}

/// Column B when it holds a number, else the first numeric cell after A.
fn row_hours(row: &[Cell]) -> Option<f64> {
    row.get(1)
        .and_then(cell_hours)
        .or_else(|| row.iter().skip(2).find_map(cell_hours))
}

/// Scans rows of (process name, hours). Later rows for a process win.
pub fn scan_rows(sheet: &str, rows: &[Vec<Cell>]) -> Result<ForecastOverride, ForecastImportError> {
    if rows.iter().all(|r| r.iter().all(|c| *c == Cell::Empty)) {
        return Err(ForecastImportError::EmptySheet(sheet.to_string()));
    }

    let mut hours = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let Some(Cell::Text(name)) = row.first() else {
            continue;
        };
        let Some(process) = match_process(name) else {
            debug!(row = i + 1, name = %name, "Skipping row with unknown process");
            continue;
        };
        match row_hours(row) {
            Some(h) if h >= 0.0 => hours.push((process, h)),
            _ => debug!(row = i + 1, name = %name, "Skipping row without usable hours"),
        }
    }

    if hours.is_empty() {
        return Err(ForecastImportError::NoUsableRows(sheet.to_string()));
    }
    let forecast = ForecastOverride::new(hours);
    info!(sheet, processes = forecast.hours.len(), "Imported forecast hours");
    Ok(forecast)
}

/// Case-insensitive, trimmed match against the known forecast sheet names,
/// falling back to the first sheet.
pub fn pick_sheet(names: &[String]) -> Option<&String> {
    names
        .iter()
        .find(|n| FORECAST_SHEET_NAMES.contains(&n.trim().to_lowercase().as_str()))
        .or_else(|| names.first())
}

fn parse_workbook(bytes: &[u8]) -> Result<ForecastOverride, ForecastImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ForecastImportError::Unreadable(e.to_string()))?;
    let names = workbook.sheet_names();
    let sheet = pick_sheet(&names).ok_or(ForecastImportError::NoSheet)?.clone();
    debug!(%sheet, "Reading forecast worksheet");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ForecastImportError::Unreadable(e.to_string()))?;
    let rows: Vec<Vec<Cell>> = range
        .rows()
        .map(|r| r.iter().map(Cell::from).collect())
        .collect();
    scan_rows(&sheet, &rows)
}

fn parse_csv(text: &str) -> Result<ForecastOverride, ForecastImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|f| if f.is_empty() { Cell::Empty } else { Cell::Text(f.to_string()) })
                .collect(),
        );
    }
    scan_rows("csv", &rows)
}

pub fn parse_forecast(bytes: &[u8]) -> Result<ForecastOverride, ForecastImportError> {
    if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&OLE_MAGIC) {
        return parse_workbook(bytes);
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ForecastImportError::Unreadable("not a workbook or UTF-8 CSV".to_string()))?;
    parse_csv(text.trim_start_matches('\u{feff}'))
}

pub fn load_forecast(path: &Path) -> Result<ForecastOverride> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read forecast file {}", path.display()))?;
    let forecast = parse_forecast(&bytes)
        .with_context(|| format!("Failed to import forecast from {}", path.display()))?;
    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_match_process_aliases() {
        assert_eq!(match_process("Decant"), Some(ProcessKey::Decant));
        assert_eq!(match_process("  LF "), Some(ProcessKey::Loadfill));
        assert_eq!(match_process("Sequence"), Some(ProcessKey::Loadfill));
        assert_eq!(match_process("Load-Fill"), Some(ProcessKey::Loadfill));
        assert_eq!(match_process("Pack Away"), Some(ProcessKey::Packaway));
        assert_eq!(match_process("Digital Shopkeeping"), Some(ProcessKey::Digital));
        assert_eq!(match_process("Shopkeeping (store)"), Some(ProcessKey::Digital));
        assert_eq!(match_process("OMS Online"), Some(ProcessKey::Online));
        assert_eq!(match_process("Back fill"), Some(ProcessKey::Backfill));
        assert_eq!(match_process("Total"), None);
        assert_eq!(match_process("123"), None);
        // short aliases only match exactly
        assert_eq!(match_process("Lunch"), None);
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours("1,234.5"), Some(1234.5));
        assert_eq!(parse_hours(" 80 "), Some(80.0));
        assert_eq!(parse_hours("42 hrs"), Some(42.0));
        assert_eq!(parse_hours("12h"), Some(12.0));
        assert_eq!(parse_hours("n/a"), None);
        assert_eq!(parse_hours(""), None);
        assert_eq!(parse_hours("inf"), None);
    }

    #[test]
    fn test_scan_rows_skips_bad_rows() {
        let rows = vec![
            vec![text("Process"), text("Hours")],
            vec![text("Decant"), Cell::Number(150.0)],
            vec![text("Loadfill"), Cell::Empty, text("note"), text("2,400")],
            vec![text("Mystery"), Cell::Number(10.0)],
            vec![text("Packaway"), text("tbc")],
            vec![text("Online"), Cell::Number(-5.0)],
            vec![Cell::Number(3.0), Cell::Number(3.0)],
        ];
        let forecast = scan_rows("Forecast Roster Hours", &rows).unwrap();
        assert_eq!(forecast.hours.len(), 2);
        assert_eq!(forecast.hours[&ProcessKey::Decant], 150.0);
        assert_eq!(forecast.hours[&ProcessKey::Loadfill], 2400.0);
    }

    #[test]
    fn test_scan_rows_later_row_wins() {
        let rows = vec![
            vec![text("Decant"), Cell::Number(100.0)],
            vec![text("decant"), Cell::Number(120.0)],
        ];
        assert_eq!(scan_rows("s", &rows).unwrap().hours[&ProcessKey::Decant], 120.0);
    }

    #[test]
    fn test_scan_rows_errors() {
        assert!(matches!(
            scan_rows("s", &[vec![Cell::Empty]]),
            Err(ForecastImportError::EmptySheet(_))
        ));
        assert!(matches!(
            scan_rows("s", &[vec![text("Lunch"), Cell::Number(1.0)]]),
            Err(ForecastImportError::NoUsableRows(_))
        ));
    }

    #[test]
    fn test_pick_sheet() {
        let names = vec!["Summary".to_string(), "  FORECAST Roster Hours ".to_string()];
        assert_eq!(pick_sheet(&names).unwrap(), "  FORECAST Roster Hours ");
        let names = vec!["Summary".to_string(), "Forecast Hours Alternate".to_string()];
        assert_eq!(pick_sheet(&names).unwrap(), "Forecast Hours Alternate");
        let names = vec!["Summary".to_string(), "Other".to_string()];
        assert_eq!(pick_sheet(&names).unwrap(), "Summary");
        assert!(pick_sheet(&[]).is_none());
    }

    #[test]
    fn test_parse_forecast_csv() {
        let csv = "\u{feff}Process,Hours\nDecant,150\nDigital Shopkeeping,\"1,020.5\"\nBackfill,,64\n";
        let forecast = parse_forecast(csv.as_bytes()).unwrap();
        assert_eq!(forecast.hours[&ProcessKey::Decant], 150.0);
        assert_eq!(forecast.hours[&ProcessKey::Digital], 1020.5);
        assert_eq!(forecast.hours[&ProcessKey::Backfill], 64.0);
        assert_eq!(forecast.hours.len(), 3);
    }

    #[test]
    fn test_parse_workbook_prefers_forecast_sheet() {
        // Sheet one ("Summary") holds Decant 999; sheet two is
        // "FORECAST roster hours" with a text hours cell "2,400".
        let bytes = include_bytes!("../../testdata/forecast_roster.xlsx");
        let forecast = parse_forecast(bytes).unwrap();
        assert_eq!(forecast.hours.len(), 2);
        assert_eq!(forecast.hours[&ProcessKey::Decant], 150.0);
        assert_eq!(forecast.hours[&ProcessKey::Loadfill], 2400.0);
    }

    #[test]
    fn test_parse_forecast_rejects_garbage() {
        assert!(matches!(
            parse_forecast(&[0xff, 0xfe, 0x00, 0x01]),
            Err(ForecastImportError::Unreadable(_))
        ));
        // zip magic but not a workbook
        assert!(matches!(
            parse_forecast(&[0x50, 0x4B, 0x03, 0x04, 0x00, 0x00]),
            Err(ForecastImportError::Unreadable(_))
        ));
    }

    #[test]
    fn test_load_forecast_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Sequencing,310").unwrap();
        writeln!(file, "Packaway,48").unwrap();
        let forecast = load_forecast(file.path()).unwrap();
        assert_eq!(forecast.hours[&ProcessKey::Loadfill], 310.0);
        assert_eq!(forecast.hours[&ProcessKey::Packaway], 48.0);

        assert!(load_forecast(Path::new("/definitely/not/here.xlsx")).is_err());
    }
}
