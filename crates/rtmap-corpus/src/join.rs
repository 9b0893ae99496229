//! Per-test join of the reference hierarchy with parsed test scripts.

use crate::config::MarkerTokens;
use crate::findings::{Finding, FindingKind};
use crate::hierarchy::{AppPhysicsCombo, TestHierarchy};
use crate::test_script::TestRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRecord {
    pub combo: AppPhysicsCombo,
    pub test_type: String,
    pub test_name: String,
    pub variables: BTreeMap<String, String>,
    pub invocations: Vec<String>,
    pub baseline_dir: String,
    pub model_conf: Option<String>,
    pub namelist_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    pub records: Vec<JoinedRecord>,
    pub findings: Vec<Finding>,
}

/// Attach parsed test-script data to every hierarchy leaf.
///
/// Leaves are matched by file name equality with the test name. A leaf
/// without a script is reported as a `MissingTestRecord` finding and left
/// out; every other leaf is still joined.
pub fn join(
    hierarchy: &TestHierarchy,
    test_records: &BTreeMap<String, TestRecord>,
    markers: &MarkerTokens,
) -> JoinReport {
    let mut report = JoinReport::default();
    for leaf in hierarchy.leaves() {
        let Some(record) = test_records.get(leaf.test_name) else {
            report.findings.push(Finding::new(
                FindingKind::MissingTestRecord,
                leaf.test_name,
                format!(
                    "listed under {}/{}/{} but no test-definition script exists",
                    leaf.app, leaf.physics_suite, leaf.test_type
                ),
            ));
            continue;
        };
        report.records.push(JoinedRecord {
            combo: leaf.combo(),
            test_type: leaf.test_type.to_string(),
            test_name: leaf.test_name.to_string(),
            variables: record.variables.clone(),
            invocations: record.invocations.clone(),
            baseline_dir: record.baseline_dir.clone(),
            model_conf: record
                .variable(&markers.model_conf_variable)
                .map(str::to_string),
            namelist_file: record.namelist_file.clone(),
        });
    }
    tracing::info!(
        joined = report.records.len(),
        missing = report.findings.len(),
        "records joined"
    );
    report
}
