//! Reading the scanner export and folding its rows into the roster.
//!
//! The export has one row per scan session with (at least) a team, a name,
//! an id and an hours column. Row 0 is the header row; the four columns are
//! located by their exact header text.

use crate::error::InputError;
use crate::roster::Roster;
use crate::teams::TeamIndex;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;

/// A cell as read from the export, independent of file format.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    fn as_team(&self) -> Option<i64> {
        match self {
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Finite hours only; `parse` would otherwise accept "NaN" and "inf".
    fn as_hours(&self) -> Option<f64> {
        let hours = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Empty => None,
        };
        hours.filter(|h: &f64| h.is_finite())
    }

    fn as_name(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Ids come through as text, or as numbers in workbooks that typed them.
    fn as_id(&self) -> Option<String> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            CellValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            CellValue::Empty => "(empty)".to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Header names of the four columns the report needs.
#[derive(Debug, Clone, PartialEq)]
pub struct InputColumns {
    pub hours: String,
    pub name: String,
    pub id: String,
    pub team: String,
}

impl Default for InputColumns {
    fn default() -> Self {
        Self {
            hours: "workday_w".to_string(),
            name: "Name".to_string(),
            id: "empno".to_string(),
            team: "Department".to_string(),
        }
    }
}

/// Positions of the four columns in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub hours: usize,
    pub id: usize,
    pub team: usize,
}

impl ColumnMap {
    /// Locate every column; the error lists all header names not found.
    pub fn resolve(header: &[CellValue], names: &InputColumns) -> Result<Self, InputError> {
        let find = |wanted: &str| {
            header
                .iter()
                .position(|cell| matches!(cell, CellValue::Text(s) if s == wanted))
        };
        let name = find(&names.name);
        let hours = find(&names.hours);
        let id = find(&names.id);
        let team = find(&names.team);

        match (name, hours, id, team) {
            (Some(name), Some(hours), Some(id), Some(team)) => Ok(Self {
                name,
                hours,
                id,
                team,
            }),
            _ => {
                let missing = [
                    (name, &names.name),
                    (hours, &names.hours),
                    (id, &names.id),
                    (team, &names.team),
                ]
                .into_iter()
                .filter(|(pos, _)| pos.is_none())
                .map(|(_, label)| label.clone())
                .collect();
                Err(InputError::MissingColumns(missing))
            }
        }
    }
}

/// How strictly rows are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub reject_negative_hours: bool,
}

/// Row counts from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub accepted: usize,
    pub skipped: usize,
}

/// Read every row of the export, header included.
///
/// `.csv` goes through the csv reader; anything else is opened as a
/// workbook and its first sheet is used.
pub fn read_rows(path: &Path) -> anyhow::Result<Vec<Vec<CellValue>>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let rows = match ext.as_str() {
        "csv" => read_csv_rows(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook_rows(path)?,
        other => return Err(InputError::UnsupportedFormat(other.to_string()).into()),
    };
    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, InputError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| InputError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(InputError::Empty)?
        .map_err(|e| InputError::Workbook(e.to_string()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect())
}

/// Fold export rows into `roster` and `teams`.
///
/// The first row is the header. Rows with an unusable team number or
/// person data are logged and skipped.
pub fn load_rows(
    rows: &[Vec<CellValue>],
    names: &InputColumns,
    options: LoadOptions,
    roster: &mut Roster,
    teams: &mut TeamIndex,
) -> Result<LoadStats, InputError> {
    let (header, body) = rows.split_first().ok_or(InputError::Empty)?;
    let cols = ColumnMap::resolve(header, names)?;
    let empty = CellValue::Empty;
    let mut stats = LoadStats::default();

    for (offset, row) in body.iter().enumerate() {
        let row_num = offset + 1;
        stats.rows += 1;
        let cell = |idx: usize| row.get(idx).unwrap_or(&empty);

        let team_cell = cell(cols.team);
        let Some(team) = team_cell.as_team() else {
            log::warn!(
                "Parse Error: row {}, invalid Team number: {}",
                row_num,
                team_cell.describe()
            );
            stats.skipped += 1;
            continue;
        };

        let (name, id, hours) = match (
            cell(cols.name).as_name(),
            cell(cols.id).as_id(),
            cell(cols.hours).as_hours(),
        ) {
            (Some(name), Some(id), Some(hours)) => (name, id, hours),
            _ => {
                log::warn!("Cannot parse row {} to get appropriate data", row_num);
                stats.skipped += 1;
                continue;
            }
        };

        if options.reject_negative_hours && hours < 0.0 {
            log::warn!("Row {}: negative hours {} for {} rejected", row_num, hours, id);
            stats.skipped += 1;
            continue;
        }

        let handle = roster.resolve(name, &id, hours);
        teams.add_member(team, handle);
        stats.accepted += 1;
    }

    log::info!(
        "Loaded {} of {} rows ({} skipped)",
        stats.accepted,
        stats.rows,
        stats.skipped
    );
    Ok(stats)
}
