use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{LoadError, LoadResult};

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Recursively find every `.json` file under `root`.
///
/// Paths are absolute and come back in traversal order (directory entries
/// sorted by file name). Hidden files are skipped; hidden directories are
/// still descended into. Nothing is opened or parsed.
///
/// # Errors
/// Returns [`LoadError::MissingRoot`] if `root` does not exist,
/// [`LoadError::Io`] if it cannot be resolved for another reason, and
/// [`LoadError::Walk`] if a directory cannot be read.
pub fn find_json_files(root: &Path) -> LoadResult<Vec<PathBuf>> {
    let root = std::fs::canonicalize(root).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::MissingRoot(root.to_path_buf())
        } else {
            LoadError::Io {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| LoadError::Walk {
            root: root.clone(),
            source,
        })?;

        if !entry.file_type().is_file() || is_hidden(&entry) || !is_json_file(entry.path()) {
            continue;
        }

        log::trace!("Found {}", entry.path().display());
        files.push(entry.into_path());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_json_file() {
        assert!(is_json_file(Path::new("/data/song_data/A/A/A/TRAAAAW128F429D538.json")));
        assert!(is_json_file(Path::new("/data/log_data/2018-11-01-events.JSON")));
        assert!(!is_json_file(Path::new("/data/readme.md")));
        assert!(!is_json_file(Path::new("/data/json")));
    }

    #[test]
    fn test_find_json_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = find_json_files(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_find_json_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("A/B")).unwrap();
        fs::create_dir_all(root.join(".ipynb_checkpoints")).unwrap();

        fs::write(root.join("b.json"), "{}").unwrap();
        fs::write(root.join("a.json"), "{}").unwrap();
        fs::write(root.join("A/B/c.json"), "{}").unwrap();
        fs::write(root.join("A/notes.txt"), "not data").unwrap();
        fs::write(root.join(".hidden.json"), "{}").unwrap();
        fs::write(root.join(".ipynb_checkpoints/d-checkpoint.json"), "{}").unwrap();

        let files = find_json_files(root).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(files.iter().all(|p| p.is_absolute()));
        assert_eq!(names, ["d-checkpoint.json", "c.json", "a.json", "b.json"]);
    }

    #[test]
    fn test_find_json_files_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_json_files(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(LoadError::MissingRoot(_))));
    }

    #[test]
    fn test_find_json_files_unresolvable_root_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("events.json");
        fs::write(&file, "{}").unwrap();

        // A path below a regular file fails with ENOTDIR, not NotFound.
        let result = find_json_files(&file.join("nested"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
