//! Recoverable anomalies surfaced by the extraction pipeline.
//!
//! The corpus is known to be inconsistent, so most problems are recorded as
//! findings and the affected row, file, line or leaf is skipped. Only the
//! loss of a whole input (see [`crate::CorpusError`]) aborts a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const FINDING_CLASS_MALFORMED_REFERENCE_ROW: &str = "reference.malformed_row";
pub const FINDING_CLASS_FILE_UNREADABLE: &str = "corpus.file_unreadable";
pub const FINDING_CLASS_AMBIGUOUS_TRANSFER: &str = "transfer.ambiguous_statement";
pub const FINDING_CLASS_MISSING_TEST_RECORD: &str = "join.missing_test_record";
pub const FINDING_CLASS_UNRESOLVED_MODEL_CONF: &str = "dependencies.unresolved_model_conf";
pub const FINDING_CLASS_UNRESOLVED_NAMELIST: &str = "dependencies.unresolved_namelist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MalformedReferenceRow,
    FileUnreadable,
    AmbiguousTransferStatement,
    MissingTestRecord,
    UnresolvedModelConf,
    UnresolvedNamelist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl FindingKind {
    /// Stable dotted class string used in reports.
    pub fn class(self) -> &'static str {
        match self {
            Self::MalformedReferenceRow => FINDING_CLASS_MALFORMED_REFERENCE_ROW,
            Self::FileUnreadable => FINDING_CLASS_FILE_UNREADABLE,
            Self::AmbiguousTransferStatement => FINDING_CLASS_AMBIGUOUS_TRANSFER,
            Self::MissingTestRecord => FINDING_CLASS_MISSING_TEST_RECORD,
            Self::UnresolvedModelConf => FINDING_CLASS_UNRESOLVED_MODEL_CONF,
            Self::UnresolvedNamelist => FINDING_CLASS_UNRESOLVED_NAMELIST,
        }
    }

    /// Findings that exclude data from the joined output are errors.
    pub fn severity(self) -> Severity {
        match self {
            Self::MalformedReferenceRow | Self::MissingTestRecord => Severity::Error,
            Self::FileUnreadable
            | Self::AmbiguousTransferStatement
            | Self::UnresolvedModelConf
            | Self::UnresolvedNamelist => Severity::Warning,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub kind: FindingKind,
    /// File name, test name or row locator the finding is about.
    pub subject: String,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        let finding = Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        tracing::warn!(
            class = finding.kind.class(),
            subject = %finding.subject,
            "{}",
            finding.message
        );
        finding
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Sorted, de-duplicated class strings of the given findings.
pub fn finding_classes(findings: &[Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.kind.class().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn has_errors(findings: &[Finding]) -> bool {
    findings
        .iter()
        .any(|finding| finding.severity() == Severity::Error)
}
