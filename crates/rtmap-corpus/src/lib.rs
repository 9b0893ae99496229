//! # rtmap-corpus
//!
//! Static dependency extraction over a regression-test configuration corpus.
//!
//! Three kinds of loosely structured text files define each test:
//! test-definition scripts, model-conf scripts staging input files, and
//! namelist parameter files naming datasets. This crate parses all three,
//! reconciles them against the master reference table of app/physics-suite
//! builds, and produces one joined record per test.
//!
//! ## Data flow
//!
//! ```text
//! reference CSV ──► ReferenceTable ──► TestHierarchy ─┐
//!                                                      ├─► join ──► table
//! tests/   ──► scan ──► TestRecord per script ────────┘      │
//! fv3_conf/──► scan ──► TransferRule per statement ──────────┼─► dependencies
//! parm/    ──► scan ──► dataset filenames per namelist ──────┘
//! ```
//!
//! Nothing is executed and nothing referenced is checked for existence.
//! Anomalies become [`Finding`]s; only unreadable inputs are errors.

pub mod config;
pub mod dependencies;
pub mod error;
pub mod findings;
pub mod hierarchy;
pub mod join;
pub mod namelist;
pub mod pipeline;
pub mod reference;
pub mod scanner;
pub mod table;
pub mod test_script;
pub mod tokenize;
pub mod transfer;
pub mod variables;

pub use config::{
    ConfigError, CorpusLayout, DEFAULT_CONFIG_PATH, JoinOptions, MapperConfig, MarkerTokens,
    NamelistConventions, TransferConventions,
};
pub use dependencies::{DependencyReport, TestDependencies, resolve_dependencies};
pub use error::CorpusError;
pub use findings::{
    FINDING_CLASS_AMBIGUOUS_TRANSFER, FINDING_CLASS_FILE_UNREADABLE,
    FINDING_CLASS_MALFORMED_REFERENCE_ROW, FINDING_CLASS_MISSING_TEST_RECORD,
    FINDING_CLASS_UNRESOLVED_MODEL_CONF, FINDING_CLASS_UNRESOLVED_NAMELIST, Finding, FindingKind,
    Severity, finding_classes, has_errors,
};
pub use hierarchy::{AppPhysicsCombo, HierarchyLeaf, HierarchySummary, TestHierarchy, TestNames};
pub use join::{JoinReport, JoinedRecord, join};
pub use namelist::{NamelistRefs, parse_namelist, parse_namelists};
pub use pipeline::{ParsedCorpus, PipelineOutput, parse_corpus, run_pipeline};
pub use reference::{ReferenceRow, ReferenceTable, read_reference_rows, read_reference_table};
pub use scanner::{ScannedDirectory, scan_directory};
pub use table::{TABLE_COLUMNS, TableRow, flatten, regroup};
pub use test_script::{TestRecord, parse_test_script, parse_test_scripts};
pub use tokenize::{LogicalLine, logical_lines, numbered_logical_lines};
pub use transfer::{
    ModelConfTransfers, RootFolderReport, TransferOp, TransferRule, TransferScan,
    parse_model_conf, parse_model_confs, transfer_statements,
};
pub use variables::{model_conf_globals, namelist_globals, unique_global_variables};
