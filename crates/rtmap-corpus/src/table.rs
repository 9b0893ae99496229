//! Flattened, analysis-ready table over joined records.

use crate::hierarchy::AppPhysicsCombo;
use crate::join::JoinedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column order of [`TableRow`], stable for downstream consumers.
pub const TABLE_COLUMNS: [&str; 9] = [
    "UFS_App",
    "Physics_Suite",
    "Test_Type",
    "Test_Name",
    "Test_Info",
    "Default_Setup",
    "CNTL_Folder",
    "FV3_File",
    "Parm_File",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub app: String,
    pub physics_suite: String,
    pub test_type: String,
    pub test_name: String,
    pub variables: BTreeMap<String, String>,
    pub invocations: Vec<String>,
    pub baseline_dir: String,
    pub model_conf: Option<String>,
    pub namelist_file: Option<String>,
}

impl From<&JoinedRecord> for TableRow {
    fn from(record: &JoinedRecord) -> Self {
        Self {
            app: record.combo.app.clone(),
            physics_suite: record.combo.physics_suite.clone(),
            test_type: record.test_type.clone(),
            test_name: record.test_name.clone(),
            variables: record.variables.clone(),
            invocations: record.invocations.clone(),
            baseline_dir: record.baseline_dir.clone(),
            model_conf: record.model_conf.clone(),
            namelist_file: record.namelist_file.clone(),
        }
    }
}

/// One row per joined record, in input order.
pub fn flatten(records: &[JoinedRecord]) -> Vec<TableRow> {
    records.iter().map(TableRow::from).collect()
}

/// Rebuild joined records from table rows, grouped by
/// (app, physics suite, test type, test name). A key repeated in the table
/// keeps its last row.
pub fn regroup(rows: &[TableRow]) -> Vec<JoinedRecord> {
    let mut grouped: BTreeMap<(String, String, String, String), JoinedRecord> = BTreeMap::new();
    for row in rows {
        let key = (
            row.app.clone(),
            row.physics_suite.clone(),
            row.test_type.clone(),
            row.test_name.clone(),
        );
        grouped.insert(
            key,
            JoinedRecord {
                combo: AppPhysicsCombo::new(row.app.as_str(), row.physics_suite.as_str()),
                test_type: row.test_type.clone(),
                test_name: row.test_name.clone(),
                variables: row.variables.clone(),
                invocations: row.invocations.clone(),
                baseline_dir: row.baseline_dir.clone(),
                model_conf: row.model_conf.clone(),
                namelist_file: row.namelist_file.clone(),
            },
        );
    }
    grouped.into_values().collect()
}
