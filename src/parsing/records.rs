use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::error::MatchError;
use crate::core::types::RecordId;
use crate::utils::validation::require_field;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { source_name: String, column: String },

    #[error("Invalid date '{value}' on line {line} of {source_name}")]
    InvalidDate {
        source_name: String,
        line: u64,
        value: String,
    },

    #[error("Duplicate candidate id '{0}'")]
    DuplicateId(String),
}

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y%m%d", "%Y-%m-%d"];

/// Header names of the columns to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub id: String,
    pub date: Option<String>,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            id: "id".to_string(),
            date: None,
        }
    }
}

/// One row of the query list.
///
/// `raw_name` is `None` when the row has no usable name; the row is kept so
/// that output stays aligned with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRow {
    pub line: u64,
    pub id: String,
    pub raw_name: Option<String>,
    pub date: Option<NaiveDate>,
}

/// One row of the candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub id: RecordId,
    pub raw_name: String,
    pub date: Option<NaiveDate>,
}

/// Column positions resolved against a header row
struct ColumnIndex {
    name: usize,
    id: Option<usize>,
    date: Option<usize>,
}

/// Load the query list from a CSV file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened, or other parse
/// errors if the content is invalid.
pub fn load_queries(path: &Path, columns: &ColumnSpec) -> Result<Vec<QueryRow>, ParseError> {
    let file = std::fs::File::open(path)?;
    read_queries(file, columns, &path.display().to_string())
}

/// Read the query list from any CSV source.
///
/// The id column is optional for queries; rows without a name are kept as
/// malformed entries.
///
/// # Errors
///
/// Returns `ParseError::MissingColumn` if the name column is absent,
/// `ParseError::InvalidDate` for unparseable dates, or `ParseError::Csv` for
/// malformed CSV.
pub fn read_queries<R: Read>(
    reader: R,
    columns: &ColumnSpec,
    source_name: &str,
) -> Result<Vec<QueryRow>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let index = resolve_columns(&mut reader, columns, false, source_name)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);

        let raw_name = match require_field(record.get(index.name), &columns.name) {
            Ok(name) => Some(name.to_string()),
            Err(err) => {
                debug!(source = source_name, line, "{err}");
                None
            }
        };
        let id = index
            .id
            .and_then(|i| record.get(i))
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let date = parse_date_field(&record, index.date, source_name, line)?;

        rows.push(QueryRow {
            line,
            id,
            raw_name,
            date,
        });
    }

    Ok(rows)
}

/// Load the candidate list from a CSV file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened, or other parse
/// errors if the content is invalid.
pub fn load_candidates(path: &Path, columns: &ColumnSpec) -> Result<Vec<CandidateRow>, ParseError> {
    let file = std::fs::File::open(path)?;
    read_candidates(file, columns, &path.display().to_string())
}

/// Read the candidate list from any CSV source.
///
/// Rows missing a name or id are skipped with a warning.
///
/// # Errors
///
/// Returns `ParseError::MissingColumn` if the name or id column is absent,
/// `ParseError::DuplicateId` if two rows share an id,
/// `ParseError::InvalidDate` for unparseable dates, or `ParseError::Csv` for
/// malformed CSV.
pub fn read_candidates<R: Read>(
    reader: R,
    columns: &ColumnSpec,
    source_name: &str,
) -> Result<Vec<CandidateRow>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let index = resolve_columns(&mut reader, columns, true, source_name)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);

        let fields = require_field(record.get(index.name), &columns.name).and_then(|name| {
            let id = require_field(index.id.and_then(|i| record.get(i)), &columns.id)?;
            Ok::<_, MatchError>((name, id))
        });
        let (name, id) = match fields {
            Ok(fields) => fields,
            Err(err) => {
                warn!(source = source_name, line, "{err}; row skipped");
                continue;
            }
        };

        if !seen.insert(id.to_string()) {
            return Err(ParseError::DuplicateId(id.to_string()));
        }

        let date = parse_date_field(&record, index.date, source_name, line)?;
        rows.push(CandidateRow {
            id: RecordId::new(id),
            raw_name: name.to_string(),
            date,
        });
    }

    Ok(rows)
}

/// Parse a date in any of the accepted layouts
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn resolve_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    columns: &ColumnSpec,
    id_required: bool,
    source_name: &str,
) -> Result<ColumnIndex, ParseError> {
    let headers = reader.headers()?.clone();
    let position = |column: &str| headers.iter().position(|h| h.trim() == column);
    let missing = |column: &str| ParseError::MissingColumn {
        source_name: source_name.to_string(),
        column: column.to_string(),
    };

    let name = position(&columns.name).ok_or_else(|| missing(&columns.name))?;
    let id = position(&columns.id);
    if id_required && id.is_none() {
        return Err(missing(&columns.id));
    }
    let date = match &columns.date {
        Some(column) => Some(position(column).ok_or_else(|| missing(column))?),
        None => None,
    };

    Ok(ColumnIndex { name, id, date })
}

/// Blank dates are `None`; anything else must parse
fn parse_date_field(
    record: &csv::StringRecord,
    index: Option<usize>,
    source_name: &str,
    line: u64,
) -> Result<Option<NaiveDate>, ParseError> {
    let Some(value) = index.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }
    parse_date(value)
        .map(Some)
        .ok_or_else(|| ParseError::InvalidDate {
            source_name: source_name.to_string(),
            line,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated() -> ColumnSpec {
        ColumnSpec {
            date: Some("date".to_string()),
            ..ColumnSpec::default()
        }
    }

    #[test]
    fn test_read_queries() {
        let csv = "id,name,date\n\
                   q1,Acme Trust : Growth,20040331\n\
                   q2,,2004-06-30\n\
                   q3,Beta : Value,\n";

        let rows = read_queries(csv.as_bytes(), &dated(), "queries").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, "q1");
        assert_eq!(rows[0].raw_name.as_deref(), Some("Acme Trust : Growth"));
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2004, 3, 31));
        assert!(rows[1].raw_name.is_none());
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2004, 6, 30));
        assert!(rows[2].date.is_none());
    }

    #[test]
    fn test_query_id_column_is_optional() {
        let rows = read_queries("name\nAcme : Growth\n".as_bytes(), &ColumnSpec::default(), "q")
            .unwrap();
        assert_eq!(rows[0].id, "");
    }

    #[test]
    fn test_read_candidates_skips_malformed_rows() {
        let csv = "id,name\n\
                   1,Acme : Growth\n\
                   ,Missing Id : Fund\n\
                   3,\n\
                   4,Beta : Value\n";

        let rows = read_candidates(csv.as_bytes(), &ColumnSpec::default(), "candidates").unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_duplicate_candidate_id() {
        let csv = "id,name\n1,Acme : Growth\n1,Beta : Value\n";
        assert!(matches!(
            read_candidates(csv.as_bytes(), &ColumnSpec::default(), "candidates"),
            Err(ParseError::DuplicateId(id)) if id == "1"
        ));
    }

    #[test]
    fn test_missing_column() {
        let csv = "fund_name\nAcme\n";
        let err = read_candidates(csv.as_bytes(), &ColumnSpec::default(), "candidates").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { ref column, .. } if column == "name"));

        let csv = "name\nAcme\n";
        let err = read_candidates(csv.as_bytes(), &ColumnSpec::default(), "candidates").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { ref column, .. } if column == "id"));
    }

    #[test]
    fn test_invalid_date() {
        let csv = "id,name,date\n1,Acme,31/03/2004\n";
        let err = read_candidates(csv.as_bytes(), &dated(), "candidates").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { line: 2, .. }));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("20201231"), NaiveDate::from_ymd_opt(2020, 12, 31));
        assert_eq!(parse_date("2020-12-31"), NaiveDate::from_ymd_opt(2020, 12, 31));
        assert!(parse_date("Dec 31 2020").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "id,name\n7,Acme : Growth\n").unwrap();
        let rows = load_candidates(file.path(), &ColumnSpec::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, RecordId::new("7"));
    }
}
