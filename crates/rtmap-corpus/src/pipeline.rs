//! End-to-end sequencing: reference table → hierarchy, corpus → parsed
//! attributes, then join, flatten and enrichment.

use crate::config::{MapperConfig, MarkerTokens};
use crate::dependencies::{DependencyReport, resolve_dependencies};
use crate::error::CorpusError;
use crate::findings::Finding;
use crate::hierarchy::{HierarchySummary, TestHierarchy};
use crate::join::{JoinedRecord, join};
use crate::namelist::{NamelistRefs, parse_namelists};
use crate::reference::read_reference_table;
use crate::scanner::{ScannedDirectory, scan_directory};
use crate::table::{TableRow, flatten};
use crate::test_script::{TestRecord, parse_test_scripts};
use crate::transfer::{TransferScan, parse_model_confs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::thread;

/// Per-file parse results of the three config directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCorpus {
    pub test_records: BTreeMap<String, TestRecord>,
    pub transfers: TransferScan,
    pub namelists: NamelistRefs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub summary: HierarchySummary,
    pub hierarchy: TestHierarchy,
    pub corpus: ParsedCorpus,
    pub joined: Vec<JoinedRecord>,
    pub table: Vec<TableRow>,
    pub dependencies: DependencyReport,
    /// Every finding of the run, in stage order.
    pub findings: Vec<Finding>,
}

fn scan_and_parse<T>(
    dir: &Path,
    parse: impl FnOnce(&ScannedDirectory) -> T,
) -> Result<(T, Vec<Finding>), CorpusError> {
    let scanned = scan_directory(dir)?;
    let parsed = parse(&scanned);
    Ok((parsed, scanned.findings))
}

/// Scan and parse the three config directories. Each directory is handled
/// on its own thread; results are merged once all three finish.
pub fn parse_corpus(config: &MapperConfig) -> Result<(ParsedCorpus, Vec<Finding>), CorpusError> {
    let layout = &config.corpus;
    let tests_dir = layout.tests_path();
    let model_conf_dir = layout.model_conf_path();
    let namelist_dir = layout.namelist_path();
    let markers: &MarkerTokens = &config.markers;
    let prefixes = config.transfer.source_prefixes.as_slice();
    let extensions = config.namelist.dataset_extensions.as_slice();

    let (tests, model_confs, namelists) = thread::scope(|scope| {
        let tests = scope.spawn(|| {
            scan_and_parse(&tests_dir, |scanned| parse_test_scripts(scanned, markers))
        });
        let model_confs = scope.spawn(|| {
            scan_and_parse(&model_conf_dir, |scanned| parse_model_confs(scanned, prefixes))
        });
        let namelists = scope.spawn(|| {
            scan_and_parse(&namelist_dir, |scanned| parse_namelists(scanned, extensions))
        });
        (
            join_worker(tests, &tests_dir),
            join_worker(model_confs, &model_conf_dir),
            join_worker(namelists, &namelist_dir),
        )
    });

    let (test_records, mut findings) = tests?;
    let (mut transfers, model_conf_findings) = model_confs?;
    let (namelists, namelist_findings) = namelists?;
    findings.extend(model_conf_findings);
    findings.extend(std::mem::take(&mut transfers.findings));
    findings.extend(namelist_findings);

    Ok((
        ParsedCorpus {
            test_records,
            transfers,
            namelists,
        },
        findings,
    ))
}

fn join_worker<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, CorpusError>>,
    dir: &Path,
) -> Result<T, CorpusError> {
    handle.join().unwrap_or_else(|_| {
        Err(CorpusError::DirectoryUnreadable {
            path: dir.display().to_string(),
            source: std::io::Error::other("scan worker panicked"),
        })
    })
}

/// Run every stage. Fails only when the reference table or one of the
/// three config directories cannot be read at all.
pub fn run_pipeline(config: &MapperConfig) -> Result<PipelineOutput, CorpusError> {
    let reference = read_reference_table(&config.corpus.reference_table)?;
    let mut findings = reference.findings;
    let hierarchy = TestHierarchy::build(&reference.rows);
    let summary = hierarchy.summary();

    let (corpus, corpus_findings) = parse_corpus(config)?;
    findings.extend(corpus_findings);

    let mut joined = join(&hierarchy, &corpus.test_records, &config.markers);
    findings.append(&mut joined.findings);
    let table = flatten(&joined.records);

    let mut dependencies = resolve_dependencies(
        &joined.records,
        &corpus.transfers.files,
        &corpus.namelists,
        &config.join,
    );
    findings.append(&mut dependencies.findings);

    tracing::info!(
        combos = summary.combo_count,
        rows = table.len(),
        findings = findings.len(),
        "pipeline complete"
    );
    Ok(PipelineOutput {
        summary,
        hierarchy,
        corpus,
        joined: joined.records,
        table,
        dependencies,
        findings,
    })
}
