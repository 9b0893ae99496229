//! Global variables referenced across a config corpus, i.e. the names a
//! user must define (`@[INPUTDATA_ROOT]`, `${FILEDIR}`, ...).

use crate::namelist::NamelistRefs;
use crate::scanner::ScannedDirectory;
use crate::transfer::transfer_statements;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("bracket regex must compile"))
}

fn brace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("brace regex must compile"))
}

/// Distinct names enclosed in `[...]` or `{...}` across `lines`.
pub fn unique_global_variables<'a, I, S>(lines: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let mut names = BTreeSet::new();
    for line in lines {
        let line = line.as_ref();
        for re in [bracket_re(), brace_re()] {
            for captures in re.captures_iter(line) {
                if let Some(name) = captures.get(1) {
                    names.insert(name.as_str().trim().to_string());
                }
            }
        }
    }
    names.retain(|name| !name.is_empty());
    names
}

/// Globals referenced by the transfer statements of a model-conf directory.
pub fn model_conf_globals(scanned: &ScannedDirectory) -> BTreeSet<String> {
    let statements: Vec<String> = scanned
        .files
        .values()
        .flat_map(|lines| transfer_statements(lines))
        .collect();
    unique_global_variables(&statements)
}

/// Globals embedded in the dataset filenames of parsed namelists.
pub fn namelist_globals(refs: &NamelistRefs) -> BTreeSet<String> {
    unique_global_variables(refs.values().flatten())
}
