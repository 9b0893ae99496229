//! Test-definition scripts: declared variables, baseline folder and the
//! default-setup calls each test makes.
//!
//! A script typically reads
//!
//! ```text
//! export TEST_DESCR="Compare global control results with previous trunk version"
//! export CNTL_DIR=control_p8
//! export LIST_FILES="sfcf000.nc ..."
//! export_fv3
//! export NPZ=127
//! export FV3_RUN=control_run.IN
//! ```
//!
//! Everything from the first default-setup call to end of file is relevant,
//! because the setup call may consume variables assigned after it. The most
//! recent baseline assignment before the call is folded into the same block.

use crate::config::MarkerTokens;
use crate::scanner::ScannedDirectory;
use crate::tokenize::{logical_lines, split_assignment, strip_quotes, words};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const COMMENT_MARKER: char = '#';

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub variables: BTreeMap<String, String>,
    /// Empty when the script never names a baseline folder.
    pub baseline_dir: String,
    /// Distinct default-setup calls in order of first appearance.
    pub invocations: Vec<String>,
    pub namelist_file: Option<String>,
}

impl TestRecord {
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// How one script line is treated while looking for the relevant block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptLine {
    Comment,
    Baseline,
    Invocation,
    Other,
}

fn classify(line: &str, markers: &MarkerTokens) -> ScriptLine {
    if line.starts_with(COMMENT_MARKER) {
        return ScriptLine::Comment;
    }
    if line.contains(markers.invocation.as_str()) && invocation_words(line, markers).next().is_some()
    {
        return ScriptLine::Invocation;
    }
    match split_assignment(line) {
        Some((key, _)) if key == markers.baseline => ScriptLine::Baseline,
        _ => ScriptLine::Other,
    }
}

fn invocation_words<'a>(
    line: &'a str,
    markers: &'a MarkerTokens,
) -> impl Iterator<Item = &'a str> + 'a {
    words(line)
        .into_iter()
        .map(|word| word.trim_end_matches(';'))
        .filter(move |word| word.starts_with(markers.invocation.as_str()) && !word.contains('='))
}

/// Shell value text: quoted values keep their inner text, unquoted values
/// drop a trailing ` # comment`.
fn shell_value(raw: &str) -> String {
    let raw = raw.trim();
    let Some(quote) = raw.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        let without_comment = raw
            .find(" #")
            .map(|index| &raw[..index])
            .unwrap_or(raw);
        return strip_quotes(without_comment).to_string();
    };
    let inner = &raw[quote.len_utf8()..];
    match inner.find(quote) {
        Some(end) => inner[..end].to_string(),
        None => strip_quotes(raw).to_string(),
    }
}

pub fn parse_test_script<S: AsRef<str>>(
    test_name: &str,
    lines: &[S],
    markers: &MarkerTokens,
) -> TestRecord {
    let statements = logical_lines(lines);
    let mut baseline_line: Option<&str> = None;
    let mut block: Vec<&str> = Vec::new();
    for (index, statement) in statements.iter().enumerate() {
        let line = statement.trim_start();
        match classify(line, markers) {
            ScriptLine::Baseline => baseline_line = Some(line),
            ScriptLine::Invocation => {
                block.extend(baseline_line);
                block.push(line);
                block.extend(statements[index + 1..].iter().map(String::as_str));
                break;
            }
            ScriptLine::Comment | ScriptLine::Other => {}
        }
    }

    let mut record = TestRecord::default();
    for raw in &block {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        if let Some((key, value)) = split_assignment(line) {
            let value = shell_value(value);
            if !value.is_empty() {
                record.variables.insert(key.to_string(), value);
            }
            continue;
        }
        for word in invocation_words(line, markers) {
            if !record.invocations.iter().any(|seen| seen == word) {
                record.invocations.push(word.to_string());
            }
        }
    }

    record.baseline_dir = match record.variables.get(&markers.baseline) {
        Some(value) => value.clone(),
        None => baseline_line
            .and_then(split_assignment)
            .map(|(_, value)| shell_value(value))
            .unwrap_or_default(),
    };
    record.namelist_file = record
        .variables
        .get(&markers.namelist_variable)
        .cloned();

    tracing::debug!(
        test = test_name,
        variables = record.variables.len(),
        invocations = record.invocations.len(),
        baseline = %record.baseline_dir,
        "test script parsed"
    );
    record
}

/// Parse every script of a scanned test-definition directory, keyed by file
/// name (which is the test name).
pub fn parse_test_scripts(
    scanned: &ScannedDirectory,
    markers: &MarkerTokens,
) -> BTreeMap<String, TestRecord> {
    scanned
        .files
        .iter()
        .map(|(name, lines)| (name.clone(), parse_test_script(name, lines, markers)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> TestRecord {
        parse_test_script("control", lines, &MarkerTokens::default())
    }

    #[test]
    fn baseline_variables_and_invocation_are_extracted() {
        let record = parse(&[
            "export CNTL_DIR=baseline_v1",
            "export_fv3 foo",
            "export TEST_NAME=\"abc\"",
        ]);
        assert_eq!(record.baseline_dir, "baseline_v1");
        assert_eq!(record.variable("TEST_NAME"), Some("abc"));
        assert_eq!(record.invocations, vec!["export_fv3".to_string()]);
    }

    #[test]
    fn lines_before_the_invocation_are_not_variables() {
        let record = parse(&[
            "export TEST_DESCR=\"Compare results\"",
            "export CNTL_DIR=control_p8",
            "export_fv3",
            "export NPZ=127",
        ]);
        assert_eq!(record.variable("TEST_DESCR"), None);
        assert_eq!(record.variable("CNTL_DIR"), Some("control_p8"));
        assert_eq!(record.variable("NPZ"), Some("127"));
    }

    #[test]
    fn most_recent_baseline_before_invocation_wins() {
        let record = parse(&[
            "export CNTL_DIR=old",
            "export CNTL_DIR=new",
            "export_cpl",
        ]);
        assert_eq!(record.baseline_dir, "new");
    }

    #[test]
    fn later_duplicate_assignment_overrides_earlier() {
        let record = parse(&["export_fv3", "export DT_ATMOS=600", "export DT_ATMOS=720"]);
        assert_eq!(record.variable("DT_ATMOS"), Some("720"));
    }

    #[test]
    fn missing_baseline_is_empty_not_an_error() {
        let record = parse(&["export_fv3", "export FV3_RUN=control_run.IN"]);
        assert_eq!(record.baseline_dir, "");
        assert_eq!(record.variable("FV3_RUN"), Some("control_run.IN"));
    }

    #[test]
    fn baseline_without_invocation_still_recorded() {
        let record = parse(&["export CNTL_DIR=datm_cdeps_control_cfsr"]);
        assert_eq!(record.baseline_dir, "datm_cdeps_control_cfsr");
        assert!(record.variables.is_empty());
        assert!(record.invocations.is_empty());
    }

    #[test]
    fn invocations_are_distinct_in_first_seen_order() {
        let record = parse(&[
            "export_fv3",
            "export_cpl",
            "  export_fv3",
            "if [[ $ATMRES = C96 ]]; then export_ugwpv1_c96; fi",
        ]);
        assert_eq!(
            record.invocations,
            vec![
                "export_fv3".to_string(),
                "export_cpl".to_string(),
                "export_ugwpv1_c96".to_string(),
            ]
        );
    }

    #[test]
    fn comments_and_empty_values_are_ignored() {
        let record = parse(&[
            "# export CNTL_DIR=commented_out",
            "export_fv3",
            "# export HIDDEN=1",
            "export EMPTY=",
            "export WLCLK=30 # minutes",
            "export LIST_FILES='sfcf000.nc sfcf021.nc'",
        ]);
        assert_eq!(record.baseline_dir, "");
        assert_eq!(record.variable("HIDDEN"), None);
        assert_eq!(record.variable("EMPTY"), None);
        assert_eq!(record.variable("WLCLK"), Some("30"));
        assert_eq!(record.variable("LIST_FILES"), Some("sfcf000.nc sfcf021.nc"));
    }

    #[test]
    fn continued_values_are_joined_into_one_variable() {
        let record = parse(&[
            "export CNTL_DIR=control \\",
            "",
            "export_fv3",
            "export LIST_FILES=\"sfcf000.nc \\",
            "   sfcf024.nc \\",
            "   atmf000.nc\"",
            "export FV3_RUN=control_run.IN",
        ]);
        assert_eq!(
            record.variable("LIST_FILES"),
            Some("sfcf000.nc sfcf024.nc atmf000.nc")
        );
        assert_eq!(record.variable("FV3_RUN"), Some("control_run.IN"));
        assert_eq!(record.baseline_dir, "control");
        assert_eq!(record.invocations, vec!["export_fv3".to_string()]);
    }

    #[test]
    fn namelist_override_is_taken_from_its_variable() {
        let record = parse(&["export_fv3", "export INPUT_NML=cpld_control.nml.IN"]);
        assert_eq!(record.namelist_file.as_deref(), Some("cpld_control.nml.IN"));

        let without = parse(&["export_fv3"]);
        assert_eq!(without.namelist_file, None);
    }
}
