//! Change-detecting JSON snapshot writer

use super::diff::diff;
use super::sanitize::sanitize;
use crate::model::Record;
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Changelog file kept next to the snapshots it describes
pub const CHANGELOG_FILE: &str = "changes.txt";

const JSON_INDENT: &[u8] = b"    ";
const CHANGELOG_INDENT: &str = "    ";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of a single [`SnapshotStore::store`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The file on disk already held an equal record; nothing was touched
    Unchanged,

    /// The file was (re)written and a changelog entry appended
    Written {
        /// Sanitized path that was written
        path: PathBuf,
        /// Lines recorded in the changelog entry
        changes: Vec<String>,
    },
}

impl StoreOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, StoreOutcome::Written { .. })
    }
}

/// Persists records as JSON files and logs every change
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    clock: fn() -> NaiveDateTime,
}

impl SnapshotStore {
    /// Create a store stamping changelog entries with local time
    pub fn new() -> Self {
        Self {
            clock: local_now,
        }
    }

    /// Use a different clock for changelog timestamps
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Store `record` at `path` if it differs from the stored copy.
    ///
    /// The file name component of `path` is sanitized; the directory part is
    /// used as given. A missing or corrupt existing file counts as an empty
    /// record, so the changelog then lists every key as added. Any other read
    /// error is returned.
    pub fn store(&self, record: &Record, path: &Path) -> Result<StoreOutcome> {
        let path = sanitized_path(path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let existing = load_existing(&path)?;
        if existing == *record {
            log::debug!("Unchanged: {:?}", path);
            return Ok(StoreOutcome::Unchanged);
        }

        let changes = diff(&existing, record);

        fs::write(&path, to_pretty_json(record)?)
            .with_context(|| format!("Failed to write snapshot {:?}", path))?;

        self.append_changelog(&path, &changes)?;

        log::info!(
            "Changes logged and JSON file updated: {:?} ({} change(s))",
            path,
            changes.len()
        );

        Ok(StoreOutcome::Written { path, changes })
    }

    fn append_changelog(&self, snapshot_path: &Path, changes: &[String]) -> Result<()> {
        let dir = snapshot_path.parent().unwrap_or_else(|| Path::new(""));
        let log_path = dir.join(CHANGELOG_FILE);

        let file_name = snapshot_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut entry = format!(
            "{} - Updated '{}':\n",
            (self.clock)().format(TIMESTAMP_FORMAT),
            file_name
        );
        for change in changes {
            entry.push_str(CHANGELOG_INDENT);
            entry.push_str(change);
            entry.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open changelog {:?}", log_path))?;
        file.write_all(entry.as_bytes())
            .with_context(|| format!("Failed to append to changelog {:?}", log_path))?;

        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `path` with its file name sanitized
fn sanitized_path(path: &Path) -> Result<PathBuf> {
    let Some(file_name) = path.file_name() else {
        bail!("Snapshot path has no file name: {:?}", path);
    };
    let file_name = sanitize(&file_name.to_string_lossy());

    Ok(match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    })
}

/// Read the stored record, treating a missing or corrupt file as empty
fn load_existing(path: &Path) -> Result<Record> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Record::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read snapshot {:?}", path));
        }
    };

    Ok(match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!("Snapshot {:?} is not a JSON object, treating as empty", path);
            Record::new()
        }
        Err(e) => {
            log::warn!("Snapshot {:?} is not valid JSON ({}), treating as empty", path, e);
            Record::new()
        }
    })
}

/// Serialize with 4-space indentation, non-ASCII kept literal
fn to_pretty_json(record: &Record) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    record
        .serialize(&mut serializer)
        .context("Failed to serialize record")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap()
    }

    fn store() -> SnapshotStore {
        SnapshotStore::new().with_clock(fixed_clock)
    }

    #[test]
    fn test_first_store_writes_and_logs_added_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("account_info");

        let outcome = store().store(&record(json!({"id": "u1", "followers": 3})), &path).unwrap();

        assert!(outcome.is_written());
        assert_eq!(
            fs::read_to_string(temp.path().join(CHANGELOG_FILE)).unwrap(),
            "2024-05-06 07:08:09 - Updated 'account_info':\n    Added key: id, value is u1\n    Added key: followers, value is 3\n"
        );
    }

    #[test]
    fn test_store_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("account_info");
        let r = record(json!({"x": 1}));

        store().store(&r, &path).unwrap();
        let content = fs::read(&path).unwrap();
        let log = fs::read(temp.path().join(CHANGELOG_FILE)).unwrap();

        let outcome = store().store(&r, &path).unwrap();

        assert_eq!(outcome, StoreOutcome::Unchanged);
        assert_eq!(fs::read(&path).unwrap(), content);
        assert_eq!(fs::read(temp.path().join(CHANGELOG_FILE)).unwrap(), log);
    }

    #[test]
    fn test_change_is_written_and_logged_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snap");

        store().store(&record(json!({"x": 1})), &path).unwrap();
        let outcome = store().store(&record(json!({"x": 2})), &path).unwrap();

        assert_eq!(
            outcome,
            StoreOutcome::Written {
                path: path.clone(),
                changes: vec!["Changed key: x, from 1 to 2".to_string()],
            }
        );
        let stored: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored, json!({"x": 2}));

        let log = fs::read_to_string(temp.path().join(CHANGELOG_FILE)).unwrap();
        assert_eq!(log.matches(" - Updated 'snap':").count(), 2);
        assert_eq!(log.matches("Changed key: x, from 1 to 2").count(), 1);
    }

    #[test]
    fn test_json_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snap");

        store()
            .store(&record(json!({"name": "Café", "songs": [1]})), &path)
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n    \"name\": \"Café\",\n    \"songs\": [\n        1\n    ]\n}"
        );
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Hits: 2024?_pl1");

        let outcome = store().store(&record(json!({"a": 1})), &path).unwrap();

        let expected = temp.path().join("Hits# 2024#_pl1");
        assert_eq!(
            outcome,
            StoreOutcome::Written {
                path: expected.clone(),
                changes: vec!["Added key: a, value is 1".to_string()],
            }
        );
        assert!(expected.is_file());
        let log = fs::read_to_string(temp.path().join(CHANGELOG_FILE)).unwrap();
        assert!(log.contains("Updated 'Hits# 2024#_pl1':"));
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snap");
        fs::write(&path, "{ not json").unwrap();

        let outcome = store().store(&record(json!({"x": 1})), &path).unwrap();

        assert_eq!(
            outcome,
            StoreOutcome::Written {
                path: path.clone(),
                changes: vec!["Added key: x, value is 1".to_string()],
            }
        );
    }

    #[test]
    fn test_float_values_are_stable_across_stores() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snap");
        let r = record(json!({"score": 1.0715660391465826e-75_f64, "energy": 0.1 + 0.2}));

        store().store(&r, &path).unwrap();
        let outcome = store().store(&r, &path).unwrap();

        assert_eq!(outcome, StoreOutcome::Unchanged);
    }

    #[test]
    fn test_unreadable_snapshot_is_an_error() {
        let temp = TempDir::new().unwrap();
        // a directory where the snapshot file should be cannot be read
        let path = temp.path().join("snap");
        fs::create_dir(&path).unwrap();

        assert!(load_existing(&path).is_err());
        assert!(store().store(&record(json!({"x": 1})), &path).is_err());
        assert!(!temp.path().join(CHANGELOG_FILE).exists());
    }

    #[test]
    fn test_missing_snapshot_loads_empty() {
        let temp = TempDir::new().unwrap();
        assert!(load_existing(&temp.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/snap");

        store().store(&record(json!({"x": 1})), &path).unwrap();

        assert!(path.is_file());
        assert!(temp.path().join("nested/dir").join(CHANGELOG_FILE).is_file());
    }

    #[test]
    fn test_key_order_change_alone_is_not_a_change() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snap");

        store().store(&record(json!({"a": 1, "b": 2})), &path).unwrap();
        let outcome = store().store(&record(json!({"b": 2, "a": 1})), &path).unwrap();

        assert_eq!(outcome, StoreOutcome::Unchanged);
    }
}
