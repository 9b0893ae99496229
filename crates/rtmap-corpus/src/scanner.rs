//! Flat directory scanning: one line vector per regular file.

use crate::error::CorpusError;
use crate::findings::{Finding, FindingKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedDirectory {
    pub path: String,
    /// File name → raw lines with end-of-line markers removed.
    pub files: BTreeMap<String, Vec<String>>,
    pub findings: Vec<Finding>,
}

impl ScannedDirectory {
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Read every regular file directly under `dir`. Subdirectories are not
/// entered; files that cannot be read are skipped with a finding.
pub fn scan_directory(dir: impl AsRef<Path>) -> Result<ScannedDirectory, CorpusError> {
    scan_directory_with(dir.as_ref(), |path| fs::read(path))
}

fn scan_directory_with(
    dir: &Path,
    read_file: impl Fn(&Path) -> io::Result<Vec<u8>>,
) -> Result<ScannedDirectory, CorpusError> {
    let dir_label = dir.display().to_string();
    let entries = fs::read_dir(dir).map_err(|source| CorpusError::DirectoryUnreadable {
        path: dir_label.clone(),
        source,
    })?;

    let mut scanned = ScannedDirectory {
        path: dir_label.clone(),
        ..ScannedDirectory::default()
    };
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                scanned.findings.push(Finding::new(
                    FindingKind::FileUnreadable,
                    dir_label.as_str(),
                    format!("directory entry unreadable: {error}"),
                ));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match read_file(&path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let lines = text.lines().map(str::to_string).collect::<Vec<_>>();
                tracing::debug!(file = %name, lines = lines.len(), "scanned");
                scanned.files.insert(name, lines);
            }
            Err(error) => {
                scanned.findings.push(Finding::new(
                    FindingKind::FileUnreadable,
                    name,
                    format!("{}: {error}", path.display()),
                ));
            }
        }
    }

    tracing::info!(
        dir = %dir_label,
        files = scanned.files.len(),
        skipped = scanned.findings.len(),
        "directory scanned"
    );
    Ok(scanned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "rtmap-scanner-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        path
    }

    #[test]
    fn reads_regular_files_and_skips_subdirectories() {
        let dir = temp_dir("flat");
        fs::write(dir.join("control"), "export CNTL_DIR=c\r\nexport_fv3\n").expect("write");
        fs::write(dir.join("empty"), "").expect("write");
        fs::create_dir_all(dir.join("nested")).expect("mkdir");
        fs::write(dir.join("nested").join("hidden"), "x\n").expect("write");

        let scanned = scan_directory(&dir).expect("scan should succeed");
        assert_eq!(scanned.file_names().collect::<Vec<_>>(), vec!["control", "empty"]);
        assert_eq!(
            scanned.files["control"],
            vec!["export CNTL_DIR=c".to_string(), "export_fv3".to_string()]
        );
        assert!(scanned.files["empty"].is_empty());
        assert!(scanned.findings.is_empty());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let dir = temp_dir("lossy");
        fs::write(dir.join("blob"), [b'a', 0xff, b'\n', b'b']).expect("write");

        let scanned = scan_directory(&dir).expect("scan should succeed");
        assert_eq!(scanned.files["blob"].len(), 2);
        assert_eq!(scanned.files["blob"][1], "b");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unreadable_file_is_reported_and_the_rest_are_kept() {
        let dir = temp_dir("unreadable");
        fs::write(dir.join("control"), "export_fv3\n").expect("write");
        fs::write(dir.join("locked"), "export_cpl\n").expect("write");
        fs::write(dir.join("decomp"), "export_fv3\n").expect("write");

        let scanned = scan_directory_with(&dir, |path| {
            if path.file_name().is_some_and(|name| name == "locked") {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            fs::read(path)
        })
        .expect("scan should succeed");

        assert_eq!(
            scanned.file_names().collect::<Vec<_>>(),
            vec!["control", "decomp"]
        );
        assert_eq!(scanned.findings.len(), 1);
        assert_eq!(scanned.findings[0].kind, FindingKind::FileUnreadable);
        assert_eq!(scanned.findings[0].subject, "locked");
        assert!(scanned.findings[0].message.contains("denied"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_directory_is_unreadable() {
        let err = scan_directory("/nonexistent/rtmap/tests").expect_err("must fail");
        assert!(matches!(err, CorpusError::DirectoryUnreadable { .. }));
    }
}
