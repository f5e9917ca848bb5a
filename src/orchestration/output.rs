use std::io::Write;

use thiserror::Error;

use crate::orchestration::window::{LinkedMatch, LinkedQuery};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Wide layout needs at least one match slot")]
    NoSlots,
}

/// Shape of the CSV written for linked queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// One row per (query, match) pair
    Long,
    /// One row per matched query with a fixed number of match column groups
    Wide { slots: usize },
}

const QUERY_COLUMNS: [&str; 3] = ["query_id", "query_name", "query_name_preproc"];
const PERIOD_COLUMN: &str = "query_period";
const MATCH_COLUMNS: [&str; 5] = [
    "match_name",
    "match_name_preproc",
    "match_score",
    "match_flag",
    "match_id",
];

/// Header row for `layout`; wide groups are numbered from 1. `dated` adds a
/// `query_period` column after the query columns.
#[must_use]
pub fn header(layout: OutputLayout, dated: bool) -> Vec<String> {
    let mut columns: Vec<String> = QUERY_COLUMNS.iter().map(ToString::to_string).collect();
    if dated {
        columns.push(PERIOD_COLUMN.to_string());
    }
    match layout {
        OutputLayout::Long => columns.extend(MATCH_COLUMNS.iter().map(ToString::to_string)),
        OutputLayout::Wide { slots } => {
            for slot in 1..=slots {
                columns.extend(MATCH_COLUMNS.iter().map(|c| format!("{c}{slot}")));
            }
        }
    }
    columns
}

/// Write matched queries as delimited text (`b','` for CSV, `b'\t'` for
/// TSV). Queries without any match produce no rows; in the wide layout
/// matches beyond the slot count are dropped. When queries were matched
/// month by month, each row carries the query's period.
///
/// # Errors
///
/// Returns `OutputError::NoSlots` for a wide layout with zero slots, or an
/// I/O or CSV error if writing fails.
pub fn write_table<W: Write>(
    writer: W,
    linked: &[LinkedQuery],
    layout: OutputLayout,
    delimiter: u8,
) -> Result<(), OutputError> {
    if layout == (OutputLayout::Wide { slots: 0 }) {
        return Err(OutputError::NoSlots);
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    let dated = linked.iter().any(|q| q.period.is_some());
    csv_writer.write_record(header(layout, dated))?;

    for query in linked.iter().filter(|q| q.is_matched()) {
        match layout {
            OutputLayout::Long => {
                for m in &query.matches {
                    let mut record = query_cells(query, dated);
                    record.extend(match_cells(m));
                    csv_writer.write_record(&record)?;
                }
            }
            OutputLayout::Wide { slots } => {
                let mut record = query_cells(query, dated);
                for slot in 0..slots {
                    match query.matches.get(slot) {
                        Some(m) => record.extend(match_cells(m)),
                        None => record.extend(MATCH_COLUMNS.iter().map(|_| String::new())),
                    }
                }
                csv_writer.write_record(&record)?;
            }
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write every query, matched or not, as a pretty-printed JSON array
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(mut writer: W, linked: &[LinkedQuery]) -> Result<(), OutputError> {
    serde_json::to_writer_pretty(&mut writer, linked)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn query_cells(query: &LinkedQuery, dated: bool) -> Vec<String> {
    let mut cells = vec![
        query.id.clone(),
        query.name.clone(),
        query.name_preproc.clone(),
    ];
    if dated {
        cells.push(query.period.map(|p| p.to_string()).unwrap_or_default());
    }
    cells
}

fn match_cells(m: &LinkedMatch) -> [String; 5] {
    [
        m.name.clone(),
        m.name_preproc.clone(),
        m.score.to_string(),
        m.flag.to_string(),
        m.id.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MatchFlag, RecordId};
    use crate::orchestration::window::YearMonth;

    fn linked() -> Vec<LinkedQuery> {
        let matched = |id: &str, score: u8, flag: MatchFlag| LinkedMatch {
            name: format!("Raw {id}"),
            name_preproc: format!("raw : {id}"),
            score,
            flag,
            id: RecordId::new(id),
        };
        vec![
            LinkedQuery {
                id: "q1".to_string(),
                name: "Acme : Growth".to_string(),
                name_preproc: "acme : growth".to_string(),
                period: None,
                matches: vec![
                    matched("7", 100, MatchFlag::None),
                    matched("9", 96, MatchFlag::OrderIrrelevant),
                ],
            },
            LinkedQuery {
                id: "q2".to_string(),
                name: "Nobody".to_string(),
                name_preproc: "nobody : ".to_string(),
                period: None,
                matches: Vec::new(),
            },
        ]
    }

    fn render(layout: OutputLayout) -> String {
        let mut buf = Vec::new();
        write_table(&mut buf, &linked(), layout, b',').unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_long_layout() {
        let out = render(OutputLayout::Long);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "query_id,query_name,query_name_preproc,match_name,match_name_preproc,match_score,match_flag,match_id"
        );
        assert_eq!(lines[1], "q1,Acme : Growth,acme : growth,Raw 7,raw : 7,100,,7");
        assert_eq!(lines[2], "q1,Acme : Growth,acme : growth,Raw 9,raw : 9,96,OR,9");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_wide_layout_pads_and_truncates() {
        let out = render(OutputLayout::Wide { slots: 3 });
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].ends_with("match_flag3,match_id3"));
        assert_eq!(
            lines[1],
            "q1,Acme : Growth,acme : growth,Raw 7,raw : 7,100,,7,Raw 9,raw : 9,96,OR,9,,,,,"
        );
        assert_eq!(lines.len(), 2);

        let out = render(OutputLayout::Wide { slots: 1 });
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "q1,Acme : Growth,acme : growth,Raw 7,raw : 7,100,,7"
        );
    }

    #[test]
    fn test_tab_delimiter() {
        let mut buf = Vec::new();
        write_table(&mut buf, &linked(), OutputLayout::Long, b'\t').unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("query_id\tquery_name\t"));
        assert!(out.contains("\t96\tOR\t9\n"));
    }

    #[test]
    fn test_period_column_when_matched_by_month() {
        let mut dated = linked();
        for query in &mut dated {
            query.period = Some(YearMonth { year: 2004, month: 6 });
        }

        let mut buf = Vec::new();
        write_table(&mut buf, &dated, OutputLayout::Long, b',').unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("query_id,query_name,query_name_preproc,query_period,match_name,"));
        assert_eq!(lines[1], "q1,Acme : Growth,acme : growth,2004/06,Raw 7,raw : 7,100,,7");

        let mut buf = Vec::new();
        write_table(&mut buf, &dated, OutputLayout::Wide { slots: 1 }, b',').unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "q1,Acme : Growth,acme : growth,2004/06,Raw 7,raw : 7,100,,7"
        );
    }

    #[test]
    fn test_wide_layout_requires_slots() {
        let mut buf = Vec::new();
        assert!(matches!(
            write_table(&mut buf, &linked(), OutputLayout::Wide { slots: 0 }, b','),
            Err(OutputError::NoSlots)
        ));
    }

    #[test]
    fn test_json_includes_unmatched_queries() {
        let mut buf = Vec::new();
        write_json(&mut buf, &linked()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["matches"][1]["flag"], "OR");
        assert_eq!(rows[1]["matches"].as_array().unwrap().len(), 0);
    }
}
