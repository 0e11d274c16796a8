use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of a copy: files written and files left alone because they existed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOutcome {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Find files recursively in a directory that match a predicate
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();

    if !path.as_ref().exists() {
        return Ok(result);
    }

    if path.as_ref().is_file() {
        if predicate(path.as_ref()) {
            result.push(path.as_ref().to_path_buf());
        }
        return Ok(result);
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for entry_path in entries {
        if entry_path.is_file() {
            if predicate(&entry_path) {
                result.push(entry_path);
            }
        } else if entry_path.is_dir() {
            result.append(&mut find_files(&entry_path, predicate)?);
        }
    }

    Ok(result)
}

fn copy_file(from: &Path, to: &Path, overwrite: bool, outcome: &mut CopyOutcome) -> io::Result<()> {
    if to.exists() && !overwrite {
        outcome.skipped.push(to.to_path_buf());
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    outcome.copied.push(to.to_path_buf());
    Ok(())
}

/// Copy every file below `src` to the same relative location below `dst`.
///
/// Existing files are skipped unless `overwrite` is set. `exclude` is given
/// each path relative to `src`; returning true leaves that file or directory out.
pub fn copy_tree<F>(src: &Path, dst: &Path, overwrite: bool, exclude: &F) -> io::Result<CopyOutcome>
where
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut outcome = CopyOutcome::default();
    let files = find_files(src, &|p: &Path| {
        p.strip_prefix(src)
            .map(|relative| !relative.ancestors().any(|a| !a.as_os_str().is_empty() && exclude(a)))
            .unwrap_or(false)
    })?;

    for file in files {
        let relative = file
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        copy_file(&file, &dst.join(relative), overwrite, &mut outcome)?;
    }
    Ok(outcome)
}

/// Copy the files directly inside `src` (no recursion) into `dst`.
pub fn copy_dir_shallow(src: &Path, dst: &Path, overwrite: bool) -> io::Result<CopyOutcome> {
    let mut outcome = CopyOutcome::default();
    if !src.is_dir() {
        return Ok(outcome);
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(src)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for path in entries.into_iter().filter(|p| p.is_file()) {
        if let Some(file_name) = path.file_name() {
            copy_file(&path, &dst.join(file_name), overwrite, &mut outcome)?;
        }
    }
    Ok(outcome)
}

/// Remove the given files, then any directories left empty up to (not including) `root`.
/// Returns the paths that could not be removed.
pub fn remove_files(files: &[PathBuf], root: &Path) -> Vec<(PathBuf, io::Error)> {
    let mut failures = Vec::new();
    for file in files {
        match fs::remove_file(file) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                failures.push((file.clone(), e));
                continue;
            }
        }

        let mut dir = file.parent();
        while let Some(current) = dir {
            if current == root || !current.starts_with(root) {
                break;
            }
            // Stops at the first non-empty directory.
            if fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }
    failures
}
