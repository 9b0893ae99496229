//! Model-conf scripts: file-transfer statements staging a test's inputs.
//!
//! Each qualifying line is dispatched on its verb to one extraction rule.
//! Token positions are fixed per verb; flags are only skipped where the
//! rule says so.

use crate::findings::{Finding, FindingKind};
use crate::scanner::ScannedDirectory;
use crate::tokenize::{LogicalLine, numbered_logical_lines, words};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferOp {
    Copy,
    Move,
    Sync,
    Link,
}

/// Verb dispatch table.
const TRANSFER_VERBS: [(&str, TransferOp); 4] = [
    ("cp", TransferOp::Copy),
    ("mv", TransferOp::Move),
    ("rsync", TransferOp::Sync),
    ("ln", TransferOp::Link),
];

const FLAG_MARKER: char = '-';

impl TransferOp {
    pub fn from_verb(verb: &str) -> Option<Self> {
        TRANSFER_VERBS
            .iter()
            .find(|(name, _)| *name == verb)
            .map(|(_, op)| *op)
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Copy => "cp",
            Self::Move => "mv",
            Self::Sync => "rsync",
            Self::Link => "ln",
        }
    }

    fn extract<'a>(self, tokens: &[&'a str], prefixes: &[String]) -> Extraction<'a> {
        match self {
            Self::Link | Self::Sync => extract_fixed_position(tokens),
            Self::Move => extract_move(tokens),
            Self::Copy => extract_copy(tokens, prefixes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRule {
    pub source: String,
    pub destination: String,
    pub operation: TransferOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extraction<'a> {
    Rule { source: &'a str, destination: &'a str },
    /// The statement is well-formed but its source is not a tracked path.
    Untracked,
    /// Not enough tokens to locate a source and a destination.
    Ambiguous,
}

/// Minimum tokens for verb + source + destination.
const MIN_TRANSFER_TOKENS: usize = 3;

/// `ln -s SRC DST`, `rsync -a SRC DST`: source is the third token.
fn extract_fixed_position<'a>(tokens: &[&'a str]) -> Extraction<'a> {
    if tokens.len() < MIN_TRANSFER_TOKENS {
        return Extraction::Ambiguous;
    }
    Extraction::Rule {
        source: tokens[2],
        destination: tokens[tokens.len() - 1],
    }
}

/// `mv SRC DST` or `mv -f SRC DST`.
fn extract_move<'a>(tokens: &[&'a str]) -> Extraction<'a> {
    if tokens.len() < MIN_TRANSFER_TOKENS {
        return Extraction::Ambiguous;
    }
    let source = if tokens[1].starts_with(FLAG_MARKER) {
        if tokens.len() < MIN_TRANSFER_TOKENS + 1 {
            return Extraction::Ambiguous;
        }
        tokens[2]
    } else {
        tokens[1]
    };
    Extraction::Rule {
        source,
        destination: tokens[tokens.len() - 1],
    }
}

/// `cp [flags] ... SRC ... DST`: source is the first argument carrying a
/// recognised root prefix.
fn extract_copy<'a>(tokens: &[&'a str], prefixes: &[String]) -> Extraction<'a> {
    if tokens.len() < MIN_TRANSFER_TOKENS {
        return Extraction::Ambiguous;
    }
    tokens[1..]
        .iter()
        .find(|token| has_tracked_prefix(token, prefixes))
        .map(|source| Extraction::Rule {
            source: *source,
            destination: tokens[tokens.len() - 1],
        })
        .unwrap_or(Extraction::Untracked)
}

fn has_tracked_prefix(token: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && token.starts_with(prefix.as_str()))
}

/// Distinct root markers seen in transfer statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootFolderReport {
    /// `@[INPUTDATA_ROOT]/...` → `INPUTDATA_ROOT`
    pub bracket_roots: BTreeSet<String>,
    /// `${FILEDIR}/...` → `FILEDIR`
    pub brace_roots: BTreeSet<String>,
    /// `$RFILE/...` → `RFILE`
    pub bare_roots: BTreeSet<String>,
    pub uses_parent_dir: bool,
}

impl RootFolderReport {
    fn observe(&mut self, tokens: &[&str]) {
        let first_with = |prefix: &str| tokens.iter().find(|token| token.starts_with(prefix));
        if let Some(token) = first_with("@[")
            && let Some(name) = enclosed(&token[2..], ']')
        {
            self.bracket_roots.insert(name.to_string());
        }
        if let Some(token) = first_with("${")
            && let Some(name) = enclosed(&token[2..], '}')
        {
            self.brace_roots.insert(name.to_string());
        }
        if let Some(token) = tokens
            .iter()
            .find(|token| token.starts_with('$') && !token.starts_with("${"))
        {
            let name: String = token[1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() {
                self.bare_roots.insert(name);
            }
        }
        if tokens.iter().any(|token| token.starts_with("../")) {
            self.uses_parent_dir = true;
        }
    }

    pub fn merge(&mut self, other: &RootFolderReport) {
        self.bracket_roots.extend(other.bracket_roots.iter().cloned());
        self.brace_roots.extend(other.brace_roots.iter().cloned());
        self.bare_roots.extend(other.bare_roots.iter().cloned());
        self.uses_parent_dir |= other.uses_parent_dir;
    }
}

fn enclosed(text: &str, close: char) -> Option<&str> {
    let end = text.find(close)?;
    let name = &text[..end];
    (!name.is_empty()).then_some(name)
}

/// Transfer rules of one model-conf file, in statement order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfTransfers {
    pub rules: Vec<TransferRule>,
    pub root_folders: RootFolderReport,
}

impl ModelConfTransfers {
    /// Source path expression → destinations in statement order.
    pub fn destinations_by_source(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut out: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for rule in &self.rules {
            out.entry(rule.source.as_str())
                .or_default()
                .push(rule.destination.as_str());
        }
        out
    }

    /// Number of extracted source/destination rules.
    pub fn statement_count(&self) -> usize {
        self.rules.len()
    }
}

/// Parse one model-conf file. Lines without a transfer verb are ignored.
fn verb_statements<S: AsRef<str>>(lines: &[S]) -> Vec<(LogicalLine, TransferOp)> {
    numbered_logical_lines(lines)
        .into_iter()
        .filter_map(|line| {
            let op = words(&line.text)
                .first()
                .and_then(|verb| TransferOp::from_verb(verb))?;
            Some((line, op))
        })
        .collect()
}

/// Logical lines whose first word is a transfer verb, trimmed. Conditionals,
/// comments and other shell around the transfers are left out.
pub fn transfer_statements<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    verb_statements(lines)
        .into_iter()
        .map(|(line, _)| line.text.trim().to_string())
        .collect()
}

pub fn parse_model_conf<S: AsRef<str>>(
    file_name: &str,
    lines: &[S],
    prefixes: &[String],
) -> (ModelConfTransfers, Vec<Finding>) {
    let mut transfers = ModelConfTransfers::default();
    let mut findings = Vec::new();
    for (line, op) in verb_statements(lines) {
        let tokens = words(&line.text);
        transfers.root_folders.observe(&tokens);
        match op.extract(&tokens, prefixes) {
            Extraction::Rule {
                source,
                destination,
            } => transfers.rules.push(TransferRule {
                source: source.to_string(),
                destination: destination.to_string(),
                operation: op,
            }),
            Extraction::Untracked => {}
            Extraction::Ambiguous => findings.push(Finding::new(
                FindingKind::AmbiguousTransferStatement,
                format!("{file_name}:{}", line.line_no),
                format!(
                    "`{}` statement has too few tokens: {}",
                    op.verb(),
                    line.text.trim()
                ),
            )),
        }
    }
    tracing::debug!(
        file = file_name,
        rules = transfers.rules.len(),
        ambiguous = findings.len(),
        "model-conf parsed"
    );
    (transfers, findings)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferScan {
    pub files: BTreeMap<String, ModelConfTransfers>,
    /// Union of every file's root-folder report.
    pub root_folders: RootFolderReport,
    pub findings: Vec<Finding>,
}

pub fn parse_model_confs(scanned: &ScannedDirectory, prefixes: &[String]) -> TransferScan {
    let mut scan = TransferScan::default();
    for (name, lines) in &scanned.files {
        let (transfers, findings) = parse_model_conf(name, lines, prefixes);
        scan.root_folders.merge(&transfers.root_folders);
        scan.findings.extend(findings);
        scan.files.insert(name.clone(), transfers);
    }
    scan
}
