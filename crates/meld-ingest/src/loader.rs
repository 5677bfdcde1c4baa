//! Reading documents from disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{IngestError, IngestResult};
use crate::set::DocumentSet;

/// Read and parse `paths` into a new document set, in the order given.
///
/// Documents are named by file name, so two files with the same name in
/// different directories count as duplicates and only the first is kept.
/// A single unreadable or malformed file fails the whole load.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> IngestResult<DocumentSet> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        files.push((display_name(path), bytes));
    }

    let mut set = DocumentSet::new();
    set.add_batch(files)?;
    debug!(documents = set.len(), size = %set.total_size(), "loaded files");
    Ok(set)
}

/// All `*.json` files under `dir`, sorted by path so the merge order is
/// stable across platforms.
pub fn collect_json_files(dir: &Path) -> IngestResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() && has_json_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let b = write(dir.path(), "b.json", r#"{"b": 1}"#);
        let a = write(dir.path(), "a.json", r#"{"a": 1}"#);

        let set = load_files(&[b, a]).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["b.json", "a.json"]);
        assert_eq!(set.values()[1], json!({"a": 1}));
    }

    #[test]
    fn same_file_name_in_other_directory_is_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let first = write(dir.path(), "one/config.json", r#"{"v": 1}"#);
        let second = write(dir.path(), "two/config.json", r#"{"v": 2}"#);

        let set = load_files(&[first, second]).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.values()[0], json!({"v": 1}));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_files(&[dir.path().join("nope.json")]).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn malformed_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.json", "{}");
        let bad = write(dir.path(), "bad.json", "{");
        let err = load_files(&[good, bad]).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn collects_json_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "z.json", "{}");
        write(dir.path(), "nested/a.JSON", "{}");
        write(dir.path(), "notes.txt", "hello");
        write(dir.path(), "m.json", "{}");

        let files = collect_json_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("m.json"),
                PathBuf::from("nested/a.JSON"),
                PathBuf::from("z.json"),
            ]
        );
    }
}
