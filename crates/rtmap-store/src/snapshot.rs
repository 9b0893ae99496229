//! JSON snapshots of a pipeline run.
//!
//! A snapshot is the whole `PipelineOutput` written as one pretty-printed
//! JSON document. Writes go to a sibling temp file which is synced and then
//! renamed over the target, so readers never observe a partial snapshot.

use crate::error::StoreError;
use rtmap_corpus::{JoinedRecord, PipelineOutput};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SNAPSHOT_DIGEST_PREFIX: &str = "rtm1_";

/// Write `output` to `path`, replacing any previous snapshot atomically.
pub fn write_snapshot(path: impl AsRef<Path>, output: &PipelineOutput) -> Result<(), StoreError> {
    let path = path.as_ref();
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, output)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        writeln!(writer).map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))
    })?;
    tracing::info!(path = %path.display(), rows = output.table.len(), "snapshot written");
    Ok(())
}

pub fn read_snapshot(path: impl AsRef<Path>) -> Result<PipelineOutput, StoreError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))?;
    validate_snapshot_bytes(path, &bytes)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::Parse(format!("{}: {e}", path.display())))
}

/// SHA-256 over the compact JSON of the joined records.
///
/// Record fields serialize in declaration order and variable maps are
/// sorted, so equal records always hash equal.
pub fn snapshot_digest(records: &[JoinedRecord]) -> Result<String, StoreError> {
    let mut hasher = Sha256::new();
    for record in records {
        let bytes =
            serde_json::to_vec(record).map_err(|e| StoreError::Serialize(e.to_string()))?;
        hasher.update(&bytes);
        hasher.update([b'\n']);
    }
    Ok(format!("{SNAPSHOT_DIGEST_PREFIX}{:x}", hasher.finalize()))
}

/// Run `fill` against a buffered temp file next to `path`, then sync and
/// rename it into place. The temp file is removed on any failure.
pub(crate) fn write_atomically(
    path: &Path,
    fill: impl FnOnce(&mut BufWriter<File>) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| StoreError::Io(format!("{}: {e}", parent.display())))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), StoreError> {
        let file = File::create(&tmp_path)
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp_path.display())))?;
        let mut writer = BufWriter::new(file);
        fill(&mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp_path.display())))?;
        file.sync_all()
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp_path.display())))
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::Io(format!(
            "{} -> {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir =
            File::open(parent).map_err(|e| StoreError::Io(format!("{}: {e}", parent.display())))?;
        dir.sync_all()
            .map_err(|e| StoreError::Io(format!("{}: {e}", parent.display())))?;
    }
    Ok(())
}

const TMP_MARKER: &str = ".rtmap-tmp";

/// Sibling of `path` unique to this process and instant.
fn tmp_write_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(format!("{TMP_MARKER}-{}-{nanos}", std::process::id()));
    PathBuf::from(name)
}

/// Snapshots are UTF-8 JSON text; NUL or undecodable bytes mean the file
/// was truncated or overwritten by something else.
fn validate_snapshot_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let problem = if let Some(offset) = bytes.iter().position(|byte| *byte == 0) {
        format!("NUL byte at offset {offset}")
    } else if let Err(e) = std::str::from_utf8(bytes) {
        format!("non-UTF-8 text after byte {}", e.valid_up_to())
    } else {
        return Ok(());
    };
    Err(StoreError::Corrupt(format!("{}: {problem}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtmap_corpus::{AppPhysicsCombo, flatten};
    use std::collections::BTreeMap;

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir()
            .join(format!(
                "rtmap-store-{prefix}-{}-{unique}",
                std::process::id()
            ))
            .join("snapshot.json")
    }

    fn cleanup(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    fn record(test_name: &str, baseline: &str) -> JoinedRecord {
        let mut variables = BTreeMap::new();
        variables.insert("CNTL_DIR".to_string(), baseline.to_string());
        JoinedRecord {
            combo: AppPhysicsCombo::new("ATM", "FV3_GFS_v16"),
            test_type: "regression".to_string(),
            test_name: test_name.to_string(),
            variables,
            invocations: vec!["export_fv3".to_string()],
            baseline_dir: baseline.to_string(),
            model_conf: Some("control_run.IN".to_string()),
            namelist_file: None,
        }
    }

    fn output() -> PipelineOutput {
        let joined = vec![record("control", "control"), record("decomp", "control")];
        PipelineOutput {
            table: flatten(&joined),
            joined,
            ..PipelineOutput::default()
        }
    }

    #[test]
    fn snapshot_survives_write_and_read() {
        let path = temp_path("roundtrip");
        let output = output();
        write_snapshot(&path, &output).expect("snapshot should write");
        let loaded = read_snapshot(&path).expect("snapshot should read");
        assert_eq!(loaded, output);

        let parent = path.parent().expect("snapshot has a parent");
        let leftovers: Vec<_> = fs::read_dir(parent)
            .expect("parent readable")
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().contains(TMP_MARKER))
            .collect();
        assert!(leftovers.is_empty());
        cleanup(&path);
    }

    #[test]
    fn rewrite_replaces_previous_snapshot() {
        let path = temp_path("replace");
        write_snapshot(&path, &output()).expect("first write");
        let empty = PipelineOutput::default();
        write_snapshot(&path, &empty).expect("second write");
        assert_eq!(read_snapshot(&path).expect("read"), empty);
        cleanup(&path);
    }

    #[test]
    fn nul_bytes_are_rejected_as_corrupt() {
        let path = temp_path("nul");
        fs::create_dir_all(path.parent().expect("parent")).expect("parent dir");
        fs::write(&path, b"{\"summary\":\0}").expect("fixture");
        let err = read_snapshot(&path).expect_err("NUL must be rejected");
        assert!(matches!(err, StoreError::Corrupt(message) if message.contains("NUL")));
        cleanup(&path);
    }

    #[test]
    fn non_utf8_is_rejected_as_corrupt() {
        let path = temp_path("utf8");
        fs::create_dir_all(path.parent().expect("parent")).expect("parent dir");
        fs::write(&path, [b'{', 0xff, 0xfe, b'}']).expect("fixture");
        let err = read_snapshot(&path).expect_err("invalid UTF-8 must be rejected");
        assert!(matches!(err, StoreError::Corrupt(message) if message.contains("non-UTF-8")));
        cleanup(&path);
    }

    #[test]
    fn digest_is_stable_and_content_sensitive() {
        let first = snapshot_digest(&output().joined).expect("digest");
        let second = snapshot_digest(&output().joined).expect("digest");
        assert_eq!(first, second);
        assert!(first.starts_with(SNAPSHOT_DIGEST_PREFIX));
        assert_eq!(first.len(), SNAPSHOT_DIGEST_PREFIX.len() + 64);

        let changed = snapshot_digest(&[record("control", "control_v2")]).expect("digest");
        assert_ne!(first, changed);
    }

    #[test]
    fn digest_depends_on_record_order() {
        let forward = vec![record("a", "x"), record("b", "x")];
        let reverse = vec![record("b", "x"), record("a", "x")];
        assert_ne!(
            snapshot_digest(&forward).expect("digest"),
            snapshot_digest(&reverse).expect("digest")
        );
    }
}
