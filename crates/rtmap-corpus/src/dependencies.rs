//! Optional enrichment: the data files each joined test stages or reads.
//!
//! The join only records which model-conf and namelist files a test names.
//! This step follows those names into the parsed model-conf and namelist
//! corpora. Resolution is per test name, since the same test can appear
//! under several builds.

use crate::config::JoinOptions;
use crate::findings::{Finding, FindingKind};
use crate::join::JoinedRecord;
use crate::namelist::NamelistRefs;
use crate::transfer::{ModelConfTransfers, TransferRule};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDependencies {
    pub model_conf: Option<String>,
    pub transfers: Vec<TransferRule>,
    pub namelist_file: Option<String>,
    pub namelist_datasets: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    /// Test name → resolved data files.
    pub tests: BTreeMap<String, TestDependencies>,
    pub findings: Vec<Finding>,
}

/// Look a declared file name up by exact name, then by its last path
/// component.
fn lookup<'a, V>(files: &'a BTreeMap<String, V>, declared: &str) -> Option<&'a V> {
    files.get(declared).or_else(|| {
        declared
            .rsplit('/')
            .next()
            .filter(|base| *base != declared)
            .and_then(|base| files.get(base))
    })
}

pub fn resolve_dependencies(
    records: &[JoinedRecord],
    model_confs: &BTreeMap<String, ModelConfTransfers>,
    namelists: &NamelistRefs,
    options: &JoinOptions,
) -> DependencyReport {
    let mut report = DependencyReport::default();
    for record in records {
        if report.tests.contains_key(&record.test_name) {
            continue;
        }
        let mut deps = TestDependencies {
            model_conf: record.model_conf.clone(),
            namelist_file: record.namelist_file.clone(),
            ..TestDependencies::default()
        };

        if let Some(model_conf) = &record.model_conf {
            match lookup(model_confs, model_conf) {
                Some(transfers) => deps.transfers = transfers.rules.clone(),
                None => report.findings.push(Finding::new(
                    FindingKind::UnresolvedModelConf,
                    record.test_name.as_str(),
                    format!("model-conf file `{model_conf}` not found in corpus"),
                )),
            }
        }

        if options.namelist_enrichment
            && let Some(namelist) = &record.namelist_file
        {
            match lookup(namelists, namelist) {
                Some(datasets) => deps.namelist_datasets = datasets.clone(),
                None => report.findings.push(Finding::new(
                    FindingKind::UnresolvedNamelist,
                    record.test_name.as_str(),
                    format!("namelist file `{namelist}` not found in corpus"),
                )),
            }
        }

        report.tests.insert(record.test_name.clone(), deps);
    }
    tracing::info!(
        tests = report.tests.len(),
        unresolved = report.findings.len(),
        "dependencies resolved"
    );
    report
}
