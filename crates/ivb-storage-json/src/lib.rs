use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use ivb_core::{CoreError, KeyValueStore};
use serde_json::Value;

const FILE_EXTENSION: &str = "json";
const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed key/value store: one JSON document per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// A rolling copy of a previously stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub key: String,
    pub file_name: String,
    pub created_at: Option<NaiveDateTime>,
    pub path: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: PathBuf, retention: usize) -> Result<Self, CoreError> {
        let backups_dir = root.join(BACKUP_DIR);
        fs::create_dir_all(&backups_dir).map_err(|err| unavailable(&backups_dir, err))?;
        Ok(Self {
            root,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_name(key), FILE_EXTENSION))
    }

    /// Lists backups of `key`, newest first.
    pub fn list_backups(&self, key: &str) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(key);
        let prefix = format!("{}_", slug);
        let mut entries = Vec::new();
        let dir = fs::read_dir(&self.backups_dir).map_err(|err| unavailable(&self.backups_dir, err))?;
        for entry in dir {
            let path = entry.map_err(|err| unavailable(&self.backups_dir, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let Some(stamp) = stem.strip_prefix(&prefix) else {
                continue;
            };
            let Some(created_at) = parse_backup_timestamp(stamp) else {
                continue;
            };
            entries.push(BackupInfo {
                key: slug.clone(),
                file_name: format!("{}.{}", stem, FILE_EXTENSION),
                created_at: Some(created_at),
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| Reverse(info.created_at));
        Ok(entries)
    }

    /// Reads a backup back as the stored text.
    pub fn read_backup(&self, backup: &BackupInfo) -> Result<String, CoreError> {
        fs::read_to_string(&backup.path).map_err(|err| unavailable(&backup.path, err))
    }

    fn backup_existing_file(&self, key: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{}_{}.{}", canonical_name(key), timestamp, FILE_EXTENSION);
        let backup_path = self.backups_dir.join(file_name);
        fs::copy(path, &backup_path).map_err(|err| unavailable(&backup_path, err))?;
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: &str) -> Result<(), CoreError> {
        let entries = self.list_backups(key)?;
        for entry in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(path = %entry.path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(unavailable(&path, err)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        self.backup_existing_file(key, &path)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &pretty(value))?;
        fs::rename(&tmp, &path).map_err(|err| unavailable(&path, err))?;
        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(unavailable(&path, err)),
        }
    }
}

/// Pretty-prints JSON values so stored files stay readable. Anything that is
/// not JSON is written unchanged.
fn pretty(value: &str) -> String {
    serde_json::from_str::<Value>(value)
        .and_then(|parsed| serde_json::to_string_pretty(&parsed))
        .unwrap_or_else(|_| value.to_string())
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "value".into()
    } else {
        sanitized
    }
}

fn parse_backup_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    let (date, time) = stamp.split_once('_')?;
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
        Ok(())
    };
    write().map_err(|err| unavailable(path, err))
}

fn unavailable(path: &Path, err: io::Error) -> CoreError {
    CoreError::StorageUnavailable(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_sanitizes_keys() {
        assert_eq!(canonical_name("invest_tracker_state_v2"), "invest_tracker_state_v2");
        assert_eq!(canonical_name(" My Key! "), "my_key_");
        assert_eq!(canonical_name("///"), "value");
    }

    #[test]
    fn backup_timestamp_requires_full_stamp() {
        assert!(parse_backup_timestamp("20240301_101500").is_some());
        assert!(parse_backup_timestamp("20240301_1015").is_none());
        assert!(parse_backup_timestamp("v2_20240301_101500").is_none());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let path = Path::new("/data/state.json");
        assert_eq!(tmp_path(path), PathBuf::from("/data/state.json.tmp"));
    }

    #[test]
    fn pretty_leaves_non_json_untouched() {
        assert_eq!(pretty("plain"), "plain");
        assert_eq!(pretty(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }
}
