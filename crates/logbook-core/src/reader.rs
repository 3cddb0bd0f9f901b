//! Activity log ingestion.
//!
//! Logs are CSV files with a header row naming the columns `FullName`,
//! `Email`, `Action`, `ActionDate` (`mm/dd/yyyy`) and `Detail`. Extra
//! columns are ignored.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{StringRecord, StringRecordsIntoIter};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LogbookError, Result};
use crate::models::{Action, Detail, Entity, Triple};

pub const DATE_FORMAT: &str = "%m/%d/%Y";

const COLUMNS: [&str; 5] = ["FullName", "Email", "Action", "ActionDate", "Detail"];

/// A raw, unvalidated log row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    #[serde(rename = "FullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Action", default)]
    pub action: Option<String>,
    #[serde(rename = "ActionDate", default)]
    pub action_date: Option<String>,
    #[serde(rename = "Detail", default)]
    pub detail: Option<String>,
}

/// Turn a raw row into a [`Triple`], failing on any missing column.
pub fn parse_row(row: &LogRow) -> Result<Triple> {
    let full_name = required(&row.full_name, "FullName")?;
    let email = required(&row.email, "Email")?;
    let action = required(&row.action, "Action")?;
    let raw_date = required(&row.action_date, "ActionDate")?;
    let detail = required(&row.detail, "Detail")?;

    let date = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT).map_err(|_| {
        LogbookError::InvalidDate {
            value: raw_date.to_string(),
            format: DATE_FORMAT,
        }
    })?;

    Ok(Triple::new(
        Entity::new(full_name, email),
        Action::new(action, date),
        Detail::new(detail),
    ))
}

fn required<'a>(value: &'a Option<String>, column: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LogbookError::malformed(format!("missing column {column}"))),
    }
}

/// Reads an activity log file and yields triples.
///
/// Every call to [`LogReader::triples`] reopens the file, so a reader can
/// be iterated any number of times.
#[derive(Debug, Clone)]
pub struct LogReader {
    path: PathBuf,
    exclude: HashSet<String>,
}

impl LogReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exclude: HashSet::new(),
        }
    }

    /// Skip rows whose action is one of `actions`.
    pub fn with_exclude<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn triples(&self) -> Result<Triples<'_, File>> {
        let file = File::open(&self.path)?;
        Triples::new(file, &self.exclude)
    }

    /// Number of triples the log yields after exclusion.
    ///
    /// Stops at the first bad row.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for triple in self.triples()? {
            triple?;
            count += 1;
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Lazy iterator over the triples of a CSV source.
pub struct Triples<'a, R> {
    records: StringRecordsIntoIter<R>,
    headers: StringRecord,
    exclude: &'a HashSet<String>,
}

impl<'a, R: Read> Triples<'a, R> {
    /// Reads the header row up front; the data rows are read on demand.
    pub fn new(source: R, exclude: &'a HashSet<String>) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(source);
        let headers = reader.headers()?.clone();

        let missing: Vec<&str> = COLUMNS
            .into_iter()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !headers.is_empty() && !missing.is_empty() {
            warn!(?missing, "log header lacks columns, rows will be rejected");
        }

        Ok(Self {
            records: reader.into_records(),
            headers,
            exclude,
        })
    }

    fn parse_record(&self, record: &StringRecord, line: usize) -> Result<Triple> {
        let row: LogRow = record
            .deserialize(Some(&self.headers))
            .map_err(|source| LogbookError::InvalidRow { line, source })?;
        parse_row(&row).map_err(|e| match e {
            LogbookError::MalformedRecord(msg) => {
                LogbookError::MalformedRecord(format!("line {line}: {msg}"))
            }
            other => other,
        })
    }
}

fn line_of(position: Option<&csv::Position>) -> usize {
    position.map_or(0, |p| p.line() as usize)
}

impl<R: Read> Iterator for Triples<'_, R> {
    type Item = Result<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(source) => {
                    let line = line_of(source.position());
                    return Some(Err(LogbookError::InvalidRow { line, source }));
                }
            };
            let line = line_of(record.position());

            let triple = match self.parse_record(&record, line) {
                Ok(triple) => triple,
                Err(e) => return Some(Err(e)),
            };

            if self.exclude.contains(&triple.action.action) {
                debug!(line, action = %triple.action.action, "excluded log row");
                continue;
            }

            return Some(Ok(triple));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const LOG: &str = "\
FullName,Email,Action,ActionDate,Detail
Ben Bengfort,bb@x.com,View,01/01/2016,ML101
Benjamin Bengfort,bb@x.com,Enroll,01/02/2016,ML101
Tony Ojeda,to@x.com,View,12/31/2015,\"Data Wrangling, Part 1\"
";

    fn write_log(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_row_builds_triple() {
        let row = LogRow {
            full_name: Some("Ben Bengfort".to_string()),
            email: Some("bb@x.com".to_string()),
            action: Some("View".to_string()),
            action_date: Some("01/15/2016".to_string()),
            detail: Some("ML101".to_string()),
        };
        let triple = parse_row(&row).unwrap();
        assert_eq!(triple.entity, Entity::new("Ben Bengfort", "bb@x.com"));
        assert_eq!(triple.action.date, NaiveDate::from_ymd_opt(2016, 1, 15).unwrap());
        assert_eq!(triple.detail, Detail::new("ML101"));
    }

    #[test]
    fn test_parse_row_missing_column_is_malformed() {
        let row = LogRow {
            full_name: Some("Ben Bengfort".to_string()),
            action: Some("View".to_string()),
            action_date: Some("01/15/2016".to_string()),
            detail: Some("ML101".to_string()),
            ..Default::default()
        };
        match parse_row(&row) {
            Err(LogbookError::MalformedRecord(msg)) => assert!(msg.contains("Email")),
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_row_bad_date() {
        let row = LogRow {
            full_name: Some("Ben".to_string()),
            email: Some("b@x.com".to_string()),
            action: Some("View".to_string()),
            action_date: Some("2016-01-15".to_string()),
            detail: Some("ML101".to_string()),
        };
        assert!(matches!(parse_row(&row), Err(LogbookError::InvalidDate { .. })));
    }

    #[test]
    fn test_reader_yields_triples_and_restarts() {
        let file = write_log(LOG);
        let reader = LogReader::new(file.path());

        let first: Vec<Triple> = reader.triples().unwrap().map(|t| t.unwrap()).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first[1].entity.name, "Benjamin Bengfort");
        assert_eq!(first[2].detail, Detail::new("Data Wrangling, Part 1"));

        let second: Vec<Triple> = reader.triples().unwrap().map(|t| t.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(reader.len().unwrap(), 3);
    }

    #[test]
    fn test_reader_matches_columns_by_header_name() {
        let exclude = HashSet::new();
        let source = Cursor::new(
            "Detail,ActionDate,Action,Email,FullName,Course Id\n\
             ML101,01/01/2016,View,bb@x.com,Ben Bengfort,17\n",
        );
        let triples: Vec<Triple> = Triples::new(source, &exclude)
            .unwrap()
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].entity, Entity::new("Ben Bengfort", "bb@x.com"));
        assert_eq!(triples[0].detail, Detail::new("ML101"));
    }

    #[test]
    fn test_reader_excludes_actions() {
        let file = write_log(LOG);
        let reader = LogReader::new(file.path()).with_exclude(["View"]);
        let triples: Vec<Triple> = reader.triples().unwrap().map(|t| t.unwrap()).collect();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].action.action, "Enroll");
    }

    #[test]
    fn test_reader_reports_line_of_bad_row() {
        let exclude = HashSet::new();
        let source = Cursor::new(
            "FullName,Email,Action,ActionDate,Detail\n\
             Ben,,View,01/01/2016,ML101\n\
             Tony,to@x.com,View\n",
        );
        let results: Vec<Result<Triple>> = Triples::new(source, &exclude).unwrap().collect();
        assert_eq!(results.len(), 2);
        match &results[0] {
            Err(LogbookError::MalformedRecord(msg)) => {
                assert!(msg.starts_with("line 2"), "got {msg}");
                assert!(msg.contains("Email"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(results[1], Err(LogbookError::InvalidRow { line: 3, .. })));
    }

    #[test]
    fn test_header_only_log_is_empty() {
        let file = write_log("FullName,Email,Action,ActionDate,Detail\n");
        assert!(LogReader::new(file.path()).is_empty().unwrap());
    }

    #[test]
    fn test_reader_missing_file_is_io_error() {
        let reader = LogReader::new("/nonexistent/logbook/activity.csv");
        assert!(matches!(reader.triples(), Err(LogbookError::Io(_))));
    }
}
