//! Namelist parameter files: dataset filenames set on uncommented
//! `KEY = VALUE` lines.

use crate::scanner::ScannedDirectory;
use std::collections::{BTreeMap, BTreeSet};

const COMMENT_MARKER: char = '!';
const ASSIGNMENT_MARKER: char = '=';
const STRAY_CHARS: [char; 3] = ['\'', '"', ','];

/// Referenced dataset filenames, one set per namelist file.
pub type NamelistRefs = BTreeMap<String, BTreeSet<String>>;

/// The part of a namelist line that can carry references, or `None` for
/// comments and lines without an assignment.
fn assignment_text(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with(COMMENT_MARKER) || !line.contains(ASSIGNMENT_MARKER) {
        return None;
    }
    Some(match line.find(COMMENT_MARKER) {
        Some(index) => &line[..index],
        None => line,
    })
}

fn is_dataset(token: &str, extensions: &[String]) -> bool {
    extensions
        .iter()
        .any(|ext| !ext.is_empty() && token.contains(ext.as_str()))
}

/// Dataset filenames referenced by one namelist line. Lists may be
/// comma-separated without spaces, and `key='value'` may be glued together.
pub fn line_references(line: &str, extensions: &[String]) -> Vec<String> {
    let Some(text) = assignment_text(line) else {
        return Vec::new();
    };
    text.split_whitespace()
        .flat_map(|word| word.split(','))
        .map(|token| token.rsplit(ASSIGNMENT_MARKER).next().unwrap_or(token))
        .filter(|token| is_dataset(token, extensions))
        .map(|token| token.replace(STRAY_CHARS, ""))
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn parse_namelist<S: AsRef<str>>(
    file_name: &str,
    lines: &[S],
    extensions: &[String],
) -> BTreeSet<String> {
    let refs: BTreeSet<String> = lines
        .iter()
        .flat_map(|line| line_references(line.as_ref(), extensions))
        .collect();
    tracing::debug!(file = file_name, datasets = refs.len(), "namelist parsed");
    refs
}

pub fn parse_namelists(scanned: &ScannedDirectory, extensions: &[String]) -> NamelistRefs {
    scanned
        .files
        .iter()
        .map(|(name, lines)| (name.clone(), parse_namelist(name, lines, extensions)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamelistConventions;

    fn extensions() -> Vec<String> {
        NamelistConventions::default().dataset_extensions
    }

    fn refs(line: &str) -> Vec<String> {
        line_references(line, &extensions())
    }

    #[test]
    fn inline_comment_is_discarded() {
        assert_eq!(refs("DATA_FILE = 'input.nc' ! comment"), vec!["input.nc"]);
        assert!(refs("FOO = 1 ! see old.nc").is_empty());
    }

    #[test]
    fn full_line_comment_yields_nothing() {
        assert!(refs("! DATA_FILE = input.nc").is_empty());
        assert!(refs("   ! DATA_FILE = input.nc").is_empty());
    }

    #[test]
    fn line_without_assignment_yields_nothing() {
        assert!(refs("&fms_nml").is_empty());
        assert!(refs("'orphan.nc'").is_empty());
    }

    #[test]
    fn comma_lists_without_spaces_are_split() {
        assert_eq!(
            refs("#override TOPO_FILE = \"ocean_topog.nc\",\"ocean_mask.nc\","),
            vec!["ocean_topog.nc", "ocean_mask.nc"]
        );
        assert_eq!(
            refs("fnglac = 'global_glacier.2x2.grb', fnmxic='global_maxice.2x2.grb'"),
            vec!["global_glacier.2x2.grb", "global_maxice.2x2.grb"]
        );
    }

    #[test]
    fn file_references_collapse_to_a_set() {
        let lines = [
            "&namsfc",
            "  fnglac = 'global_glacier.2x2.grb'",
            "  fnalbc = 'global_snowfree_albedo.bosu.t126.384.190.rg.grb'",
            "  fnglac = 'global_glacier.2x2.grb' ! repeated",
            "! fnsmcc = 'global_soilmgldas.t126.384.190.grb'",
            "/",
        ];
        let set = parse_namelist("input.nml", &lines, &extensions());
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec![
                "global_glacier.2x2.grb".to_string(),
                "global_snowfree_albedo.bosu.t126.384.190.rg.grb".to_string(),
            ]
        );
    }

    #[test]
    fn directory_parse_keys_by_file_name() {
        let mut scanned = ScannedDirectory::default();
        scanned.files.insert(
            "MOM_input".to_string(),
            vec!["TOPO_FILE = \"ocean_topog.nc\"".to_string()],
        );
        scanned
            .files
            .insert("diag_table".to_string(), vec!["\"fv3_history\", 0".to_string()]);
        let all = parse_namelists(&scanned, &extensions());
        assert!(all["MOM_input"].contains("ocean_topog.nc"));
        assert!(all["diag_table"].is_empty());
    }
}
