//! Directory walker (spec §4.C): a single-threaded depth-first traversal
//! that hands off one eligible file path at a time.
//!
//! Deliberately not built on the teacher's `ignore::WalkBuilder` — that
//! walker is gitignore-aware and parallel, and this one needs neither: it
//! applies its own extension/specific-name/excluded-directory filters, has
//! no notion of `.gitignore`, and feeds a single downstream slot one path
//! at a time (spec §5's `slot_free` handoff), so a second walker thread
//! would have nothing to do.

use crate::config::FilterSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories that are always skipped, regardless of `FilterSet`.
const ALWAYS_SKIP_DIRS: [&str; 2] = [".git", ".svn"];

/// Walks `root` depth-first, calling `on_file` once for every eligible
/// regular file, in the order a recursive descent would visit them.
///
/// Symlinked directories and files are skipped entirely unless
/// `filters.follow_symlinks` is set. Excluded directories (by resolved
/// node identity) are pruned before descending into them, so nothing
/// beneath an excluded directory is ever visited.
pub fn walk(root: &Path, filters: &FilterSet, mut on_file: impl FnMut(PathBuf)) -> std::io::Result<()> {
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let read_dir = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            // A directory that vanished or became unreadable mid-walk is
            // silently skipped (spec §7: scan errors never abort the walk).
            Err(_) => continue,
        };

        for entry in read_dir.filter_map(Result::ok) {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if ALWAYS_SKIP_DIRS.contains(&name_str.as_ref()) {
                continue;
            }

            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_symlink() {
                if !filters.follow_symlinks {
                    continue;
                }
                let Ok(resolved) = fs::metadata(&path) else {
                    continue;
                };
                if resolved.is_dir() {
                    if !is_excluded(&path, filters) {
                        stack.push(path);
                    }
                } else if resolved.is_file() {
                    maybe_emit(&path, &name_str, filters, &mut on_file);
                }
                continue;
            }

            if file_type.is_dir() {
                if !is_excluded(&path, filters) {
                    stack.push(path);
                }
            } else if file_type.is_file() {
                maybe_emit(&path, &name_str, filters, &mut on_file);
            }
        }
    }

    Ok(())
}

fn is_excluded(path: &Path, filters: &FilterSet) -> bool {
    crate::config::resolve_excluded_dirs(std::slice::from_ref(&path.to_path_buf()))
        .ok()
        .and_then(|ids| ids.into_iter().next())
        .is_some_and(|id| filters.is_excluded(&id))
}

fn maybe_emit(path: &Path, name: &str, filters: &FilterSet, on_file: &mut impl FnMut(PathBuf)) {
    if filters.is_eligible(name) {
        on_file(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn filters(extensions: &[&str]) -> FilterSet {
        FilterSet {
            extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
            specifics: HashSet::new(),
            excluded: HashSet::new(),
            raw: false,
            follow_symlinks: false,
        }
    }

    fn collect(root: &Path, filters: &FilterSet) -> Vec<PathBuf> {
        let mut found = Vec::new();
        walk(root, filters, |p| found.push(p)).unwrap();
        found.sort();
        found
    }

    #[test]
    fn visits_matching_extensions_recursively() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.c"), "").unwrap();

        let found = collect(dir.path(), &filters(&[".c"]));
        assert_eq!(found, vec![dir.path().join("a.c"), dir.path().join("sub/c.c")]);
    }

    #[test]
    fn skips_vcs_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config.c"), "").unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();

        let found = collect(dir.path(), &filters(&[".c"]));
        assert_eq!(found, vec![dir.path().join("a.c")]);
    }

    #[test]
    fn raw_mode_visits_every_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.bin"), "").unwrap();
        let mut f = filters(&[]);
        f.raw = true;

        let found = collect(dir.path(), &f);
        assert_eq!(found, vec![dir.path().join("a.bin")]);
    }

    #[test]
    fn excluded_directory_is_pruned() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/out.c"), "").unwrap();
        fs::write(dir.path().join("a.c"), "").unwrap();

        let mut f = filters(&[".c"]);
        f.excluded = crate::config::resolve_excluded_dirs(&[dir.path().join("build")]).unwrap();

        let found = collect(dir.path(), &f);
        assert_eq!(found, vec![dir.path().join("a.c")]);
    }
}
