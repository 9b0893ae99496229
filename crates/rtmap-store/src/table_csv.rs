//! CSV export of the flattened table.

use crate::error::StoreError;
use crate::snapshot::write_atomically;
use rtmap_corpus::{TABLE_COLUMNS, TableRow};
use std::io::Write;
use std::path::Path;

const INVOCATION_SEPARATOR: &str = ";";

fn csv_fields(row: &TableRow) -> Result<[String; TABLE_COLUMNS.len()], StoreError> {
    let variables =
        serde_json::to_string(&row.variables).map_err(|e| StoreError::Serialize(e.to_string()))?;
    Ok([
        row.app.clone(),
        row.physics_suite.clone(),
        row.test_type.clone(),
        row.test_name.clone(),
        variables,
        row.invocations.join(INVOCATION_SEPARATOR),
        row.baseline_dir.clone(),
        row.model_conf.clone().unwrap_or_default(),
        row.namelist_file.clone().unwrap_or_default(),
    ])
}

/// Write a header plus one line per row. The variable map is rendered as
/// a JSON object and invocations are `;`-joined.
pub fn write_table(writer: impl Write, rows: &[TableRow]) -> Result<(), StoreError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(TABLE_COLUMNS)
        .map_err(|e| StoreError::Csv(e.to_string()))?;
    for row in rows {
        csv.write_record(csv_fields(row)?)
            .map_err(|e| StoreError::Csv(e.to_string()))?;
    }
    csv.flush().map_err(|e| StoreError::Csv(e.to_string()))
}

pub fn write_table_csv(path: impl AsRef<Path>, rows: &[TableRow]) -> Result<(), StoreError> {
    let path = path.as_ref();
    write_atomically(path, |writer| write_table(writer, rows))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn row(test_name: &str, namelist: Option<&str>) -> TableRow {
        let mut variables = BTreeMap::new();
        variables.insert("FV3_RUN".to_string(), "control_run.IN".to_string());
        variables.insert("CNTL_DIR".to_string(), "control".to_string());
        TableRow {
            app: "ATM".to_string(),
            physics_suite: "FV3_GFS_v16".to_string(),
            test_type: "regression".to_string(),
            test_name: test_name.to_string(),
            variables,
            invocations: vec!["export_fv3".to_string(), "export_cpl".to_string()],
            baseline_dir: "control".to_string(),
            model_conf: Some("control_run.IN".to_string()),
            namelist_file: namelist.map(str::to_string),
        }
    }

    fn render(rows: &[TableRow]) -> String {
        let mut out = Vec::new();
        write_table(&mut out, rows).expect("table should render");
        String::from_utf8(out).expect("csv is utf-8")
    }

    #[test]
    fn header_uses_fixed_column_order() {
        let text = render(&[]);
        assert_eq!(
            text.trim_end(),
            "UFS_App,Physics_Suite,Test_Type,Test_Name,Test_Info,Default_Setup,CNTL_Folder,FV3_File,Parm_File"
        );
    }

    #[test]
    fn variables_are_sorted_json_and_missing_namelist_is_empty() {
        let text = render(&[row("control", None)]);
        let line = text.lines().nth(1).expect("data line");
        assert_eq!(
            line,
            "ATM,FV3_GFS_v16,regression,control,\
             \"{\"\"CNTL_DIR\"\":\"\"control\"\",\"\"FV3_RUN\"\":\"\"control_run.IN\"\"}\",\
             export_fv3;export_cpl,control,control_run.IN,"
        );
    }

    #[test]
    fn every_line_has_every_column() {
        let text = render(&[row("control", Some("control.nml.IN")), row("decomp", None)]);
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let widths: Vec<usize> = reader
            .records()
            .map(|record| record.expect("record parses").len())
            .collect();
        assert_eq!(widths, vec![TABLE_COLUMNS.len(), TABLE_COLUMNS.len()]);
    }

    #[test]
    fn file_export_writes_through_to_disk() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "rtmap-store-csv-{}-{unique}",
            std::process::id()
        ));
        let path = dir.join("out/table.csv");
        write_table_csv(&path, &[row("control", None)]).expect("csv should write");
        let text = fs::read_to_string(&path).expect("csv readable");
        assert_eq!(text.lines().count(), 2);
        let _ = fs::remove_dir_all(&dir);
    }
}
