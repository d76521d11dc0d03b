//! Per-entity storage directories
//!
//! Each entity gets exactly one directory under a parent, named
//! `<sanitized display name>_<entity id>`. The id never changes but the
//! display name can, so an existing directory is found by its id suffix and
//! renamed instead of creating a second one.

use super::sanitize::sanitize;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Rule for choosing among several directories that end with the same id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Take the match that sorts first by file name; the others are left alone
    #[default]
    FirstByName,
}

impl TieBreak {
    /// Pick one directory from `matches`, which are in file-name order
    pub fn pick<'a>(&self, matches: &'a [PathBuf]) -> Option<&'a PathBuf> {
        match self {
            TieBreak::FirstByName => matches.first(),
        }
    }
}

/// Directory name for an entity
pub fn dir_name(entity_id: &str, display_name: &str) -> String {
    format!("{}_{}", sanitize(display_name), entity_id)
}

/// Find or create the directory for `entity_id` under `parent`.
///
/// Renames an existing directory whose name ends with `entity_id` when the
/// display name has changed. Filesystem errors are returned as-is.
pub fn resolve_dir(parent: &Path, entity_id: &str, display_name: &str) -> Result<PathBuf> {
    resolve_dir_with(parent, entity_id, display_name, TieBreak::default())
}

/// [`resolve_dir`] with an explicit tie-break rule
pub fn resolve_dir_with(
    parent: &Path,
    entity_id: &str,
    display_name: &str,
    tie_break: TieBreak,
) -> Result<PathBuf> {
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create data directory {:?}", parent))?;

    let candidate = parent.join(dir_name(entity_id, display_name));
    if candidate.is_dir() {
        return Ok(candidate);
    }

    let matches = matching_dirs(parent, entity_id)?;
    if matches.len() > 1 {
        log::warn!(
            "{} directories end with id {} in {:?}, using {:?}",
            matches.len(),
            entity_id,
            parent,
            tie_break
        );
    }

    match tie_break.pick(&matches) {
        None => {
            fs::create_dir(&candidate)
                .with_context(|| format!("Failed to create directory {:?}", candidate))?;
            log::debug!("Created directory {:?}", candidate);
        }
        Some(existing) => {
            fs::rename(existing, &candidate).with_context(|| {
                format!("Failed to rename {:?} to {:?}", existing, candidate)
            })?;
            log::info!(
                "Directory renamed from {} to {}",
                file_name_lossy(existing),
                file_name_lossy(&candidate)
            );
        }
    }

    Ok(candidate)
}

/// Immediate child directories of `parent` whose name ends with `entity_id`,
/// sorted by file name
fn matching_dirs(parent: &Path, entity_id: &str) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();

    for entry in WalkDir::new(parent)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to list {:?}", parent))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let ends_with_id = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(entity_id))
            .unwrap_or(false);
        if ends_with_id {
            matches.push(entry.into_path());
        }
    }

    Ok(matches)
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_parent_and_dir() {
        let temp = TempDir::new().unwrap();
        let parent = temp.path().join("data");

        let dir = resolve_dir(&parent, "XYZ", "Foo").unwrap();

        assert_eq!(dir, parent.join("Foo_XYZ"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_existing_dir_is_returned() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Foo_XYZ")).unwrap();
        fs::write(temp.path().join("Foo_XYZ/account_info"), "{}").unwrap();

        let dir = resolve_dir(temp.path(), "XYZ", "Foo").unwrap();

        assert_eq!(dir, temp.path().join("Foo_XYZ"));
        assert!(dir.join("account_info").exists());
    }

    #[test]
    fn test_renames_on_display_name_change() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("OldName_ABC123")).unwrap();
        fs::write(temp.path().join("OldName_ABC123/changes.txt"), "log").unwrap();

        let dir = resolve_dir(temp.path(), "ABC123", "NewName").unwrap();

        assert_eq!(dir, temp.path().join("NewName_ABC123"));
        assert!(!temp.path().join("OldName_ABC123").exists());
        assert_eq!(fs::read_to_string(dir.join("changes.txt")).unwrap(), "log");

        let again = resolve_dir(temp.path(), "ABC123", "NewName").unwrap();
        assert_eq!(again, dir);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_display_name_is_sanitized() {
        let temp = TempDir::new().unwrap();
        let dir = resolve_dir(temp.path(), "id1", "a/b:c").unwrap();
        assert_eq!(dir, temp.path().join("a#b#c_id1"));
    }

    #[test]
    fn test_files_are_not_matched() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("stray_ABC"), "not a dir").unwrap();

        let dir = resolve_dir(temp.path(), "ABC", "Name").unwrap();

        assert!(dir.is_dir());
        assert!(temp.path().join("stray_ABC").is_file());
    }

    #[test]
    fn test_first_match_by_name_wins() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Beta_ID9")).unwrap();
        fs::create_dir(temp.path().join("Alpha_ID9")).unwrap();

        let dir = resolve_dir(temp.path(), "ID9", "Gamma").unwrap();

        assert_eq!(dir, temp.path().join("Gamma_ID9"));
        assert!(!temp.path().join("Alpha_ID9").exists());
        assert!(temp.path().join("Beta_ID9").exists());
    }
}
