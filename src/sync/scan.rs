// ABOUTME: Walks the build directory into an ordered list of upload descriptors.
// ABOUTME: Only regular files are included; symlinks are not followed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::types::RemoteKey;

use super::descriptor::FileDescriptor;
use super::error::SyncError;

/// Every regular file under `root`, sorted by object key.
///
/// Two paths normalizing to the same key is an error rather than a silent
/// overwrite.
pub fn scan(root: &Path) -> Result<Vec<FileDescriptor>, SyncError> {
    let mut seen: HashMap<RemoteKey, PathBuf> = HashMap::new();
    let mut descriptors = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let key = RemoteKey::from_relative_path(relative).map_err(|source| {
            SyncError::InvalidKey {
                path: path.clone(),
                source,
            }
        })?;

        if let Some(first) = seen.insert(key.clone(), path.clone()) {
            return Err(SyncError::DuplicateKey {
                key,
                first,
                second: path,
            });
        }

        descriptors.push(FileDescriptor::new(path, key));
    }

    descriptors.sort_by(|a, b| a.remote_key.cmp(&b.remote_key));
    tracing::debug!(count = descriptors.len(), "scanned {}", root.display());
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_nested_files_with_posix_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets/img")).unwrap();
        fs::write(dir.path().join("index.html"), "<title>x</title>").unwrap();
        fs::write(dir.path().join("assets/app.js"), "1").unwrap();
        fs::write(dir.path().join("assets/img/logo.png"), [0u8; 4]).unwrap();

        let files = scan(dir.path()).unwrap();
        let keys: Vec<&str> = files.iter().map(|f| f.remote_key.as_str()).collect();
        assert_eq!(keys, vec!["assets/app.js", "assets/img/logo.png", "index.html"]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        assert!(scan(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_walk_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SyncError::Walk(_)));
    }

    #[cfg(unix)]
    #[test]
    fn backslash_names_collide_with_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/b.txt"), "nested").unwrap();
        fs::write(dir.path().join("a\\b.txt"), "flat").unwrap();

        let err = scan(dir.path()).unwrap_err();
        match err {
            SyncError::DuplicateKey { key, .. } => assert_eq!(key.as_str(), "a/b.txt"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
