use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_warn;
use walkdir::WalkDir;

const CANDIDATE_SUFFIX: &[u8] = b".eml";

/// `*.eml`, case-sensitive.
pub fn is_candidate(file_name: &OsStr) -> bool {
    file_name.as_encoded_bytes().ends_with(CANDIDATE_SUFFIX)
}

/// Lists candidate message files under `root`.
///
/// Single-level mode returns the non-directory entries of `root`; recursive
/// mode walks the whole tree, sorted by file name within each directory. A
/// root that cannot be read is an error. Entries below it that cannot be
/// read are logged and skipped.
pub fn collect_candidates(root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    if recursive {
        walk_tree(root)
    } else {
        list_directory(root)
    }
}

fn list_directory(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                engine_warn!("[{}] skipping unreadable entry: {}", root.display(), err);
                continue;
            }
        };
        let is_dir = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(err) => {
                engine_warn!("[{}] skipping entry: {}", entry.path().display(), err);
                continue;
            }
        };
        if !is_dir && is_candidate(&entry.file_name()) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn walk_tree(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                engine_warn!("[{}] skipping unreadable entry: {}", path.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_dir() && is_candidate(entry.file_name()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
