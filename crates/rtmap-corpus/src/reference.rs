//! Master reference table: which tests each app/physics-suite build runs.
//!
//! Rows are `app, physics_suite, test_type, test_names` where the trailing
//! column is itself a comma-separated list. Unquoted lists spill into extra
//! CSV columns; every column from the fourth on is treated as names.

use crate::error::CorpusError;
use crate::findings::{Finding, FindingKind};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const MIN_COLUMNS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRow {
    pub app: String,
    pub physics_suite: String,
    pub test_type: String,
    pub test_names: Vec<String>,
}

impl ReferenceRow {
    /// The flat `(app, physics_suite, test_type, name_1, name_2, ...)` tuple.
    pub fn flat(&self) -> Vec<&str> {
        let mut out = vec![
            self.app.as_str(),
            self.physics_suite.as_str(),
            self.test_type.as_str(),
        ];
        out.extend(self.test_names.iter().map(String::as_str));
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTable {
    pub rows: Vec<ReferenceRow>,
    pub findings: Vec<Finding>,
}

pub fn read_reference_table(path: impl AsRef<Path>) -> Result<ReferenceTable, CorpusError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CorpusError::ReferenceTableUnreadable {
        path: path.display().to_string(),
        source,
    })?;
    read_reference_rows(file, &path.display().to_string())
}

/// Parse reference rows from any reader. The header row is skipped.
pub fn read_reference_rows(reader: impl Read, origin: &str) -> Result<ReferenceTable, CorpusError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut table = ReferenceTable::default();
    for record in csv_reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(error) if error.is_io_error() => {
                return Err(CorpusError::ReferenceTableParse {
                    path: origin.to_string(),
                    message: error.to_string(),
                });
            }
            Err(error) => {
                let line = error
                    .position()
                    .map(|position| position.line())
                    .unwrap_or_default();
                table.findings.push(Finding::new(
                    FindingKind::MalformedReferenceRow,
                    format!("{origin}:{line}"),
                    error.to_string(),
                ));
                continue;
            }
        };
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();
        if record.len() < MIN_COLUMNS {
            table.findings.push(Finding::new(
                FindingKind::MalformedReferenceRow,
                format!("{origin}:{line}"),
                format!(
                    "expected at least {MIN_COLUMNS} columns, found {}",
                    record.len()
                ),
            ));
            continue;
        }

        let test_names = record
            .iter()
            .skip(MIN_COLUMNS - 1)
            .flat_map(|column| column.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        table.rows.push(ReferenceRow {
            app: record[0].trim().to_string(),
            physics_suite: record[1].trim().to_string(),
            test_type: record[2].trim().to_string(),
            test_names,
        });
    }

    tracing::info!(
        origin,
        rows = table.rows.len(),
        malformed = table.findings.len(),
        "reference table read"
    );
    Ok(table)
}
