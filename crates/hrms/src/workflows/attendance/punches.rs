use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One raw clock event from a biometric device or export.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Punch {
    pub employee_code: String,
    pub at: NaiveDateTime,
}

/// Parsed punches plus the number of lines that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PunchBatch {
    pub punches: Vec<Punch>,
    pub rejected: usize,
}

/// First and last punch of an employee on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPunches {
    pub employee_code: String,
    pub date: NaiveDate,
    pub login: NaiveDateTime,
    pub logout: NaiveDateTime,
    pub punch_count: usize,
}

#[derive(Debug)]
pub enum PunchImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for PunchImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PunchImportError::Io(err) => write!(f, "failed to read punch export: {}", err),
            PunchImportError::Csv(err) => write!(f, "invalid punch CSV data: {}", err),
        }
    }
}

impl std::error::Error for PunchImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PunchImportError::Io(err) => Some(err),
            PunchImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PunchImportError {
    fn from(value: std::io::Error) -> Self {
        PunchImportError::Io(value)
    }
}

impl From<csv::Error> for PunchImportError {
    fn from(value: csv::Error) -> Self {
        PunchImportError::Csv(value)
    }
}

/// Parse device output of the form `"{emp_code} YYYY-MM-DD HH:MM:SS"`.
///
/// With `include_seconds` unset the trailing seconds are dropped before
/// parsing, so punches collapse to minute precision.
pub fn parse_device_lines(text: &str, include_seconds: bool) -> PunchBatch {
    let mut batch = PunchBatch::default();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_device_line(line, include_seconds) {
            Some(punch) => batch.punches.push(punch),
            None => {
                warn!(line = index + 1, raw = line, "skipping malformed punch line");
                batch.rejected += 1;
            }
        }
    }
    batch
}

fn parse_device_line(line: &str, include_seconds: bool) -> Option<Punch> {
    let mut parts = line.split_whitespace();
    let employee_code = parts.next()?.to_string();
    let timestamp = parts.collect::<Vec<_>>().join(" ");
    let at = parse_timestamp(&timestamp, include_seconds)?;
    Some(Punch { employee_code, at })
}

fn parse_timestamp(raw: &str, include_seconds: bool) -> Option<NaiveDateTime> {
    if include_seconds {
        return NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok();
    }
    let trimmed = match raw.matches(':').count() {
        2 => raw.rsplit_once(':').map(|(head, _)| head).unwrap_or(raw),
        _ => raw,
    };
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M").ok()
}

/// Parse a CSV export with `Employee Code` and `Punch Time` columns.
pub fn parse_csv<R: Read>(reader: R) -> Result<PunchBatch, PunchImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut batch = PunchBatch::default();

    for (index, record) in csv_reader.deserialize::<PunchRow>().enumerate() {
        let row = record?;
        let at = parse_timestamp(&row.punch_time, true)
            .or_else(|| parse_timestamp(&row.punch_time, false));
        match (row.employee_code, at) {
            (Some(employee_code), Some(at)) => batch.punches.push(Punch { employee_code, at }),
            _ => {
                warn!(row = index + 1, "skipping punch row without code or timestamp");
                batch.rejected += 1;
            }
        }
    }

    Ok(batch)
}

pub fn parse_csv_path<P: AsRef<Path>>(path: P) -> Result<PunchBatch, PunchImportError> {
    let file = std::fs::File::open(path)?;
    parse_csv(file)
}

#[derive(Debug, Deserialize)]
struct PunchRow {
    #[serde(
        rename = "Employee Code",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    employee_code: Option<String>,
    #[serde(rename = "Punch Time", default)]
    punch_time: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|inner| !inner.trim().is_empty()))
}

/// Collapse punches to one entry per employee and date, ordered by code then date.
pub fn group_daily(punches: &[Punch]) -> Vec<DailyPunches> {
    let mut grouped: BTreeMap<(String, NaiveDate), Vec<NaiveDateTime>> = BTreeMap::new();
    for punch in punches {
        grouped
            .entry((punch.employee_code.clone(), punch.at.date()))
            .or_default()
            .push(punch.at);
    }

    grouped
        .into_iter()
        .filter_map(|((employee_code, date), mut stamps)| {
            stamps.sort();
            let login = *stamps.first()?;
            let logout = *stamps.last()?;
            Some(DailyPunches {
                employee_code,
                date,
                login,
                logout,
                punch_count: stamps.len(),
            })
        })
        .collect()
}
