//! Discovery and loading of call-site dumps.
//!
//! A host adapter writes one `*.callsites.json` file per compilation unit
//! (see [`CallSiteDump`]). Discovery prunes excluded directories early via
//! `WalkDir::filter_entry` and checks entries in parallel with Rayon.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{IoResultExt, TmplintError, TmplintResult};
use crate::model::CallSiteDump;

/// File name suffix of call-site dumps.
pub const DUMP_SUFFIX: &str = ".callsites.json";

/// Directories to exclude by default.
const EXCLUDED_DIRS: &[&str] = &[".git", ".tmplint", "node_modules", "target"];

/// Checks if a directory entry should be pruned (excluded from traversal).
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// True for file names ending in [`DUMP_SUFFIX`].
pub fn is_dump_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(DUMP_SUFFIX))
}

/// Gathers all call-site dumps recursively starting from `root`.
///
/// Automatically excludes `.git/`, `.tmplint/`, `node_modules/` and `target/`.
pub fn gather_dump_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_dump_files_with_excludes(root, &[])
}

/// Gathers call-site dumps with extra excluded directory names.
///
/// The result is sorted so reports are stable across runs.
pub fn gather_dump_files_with_excludes(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if path.is_file() && is_dump_file(path) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather call-site dumps from {}", root.display()))?;

    files.sort();
    Ok(files)
}

/// Checks if a dump path should be skipped based on ignore patterns.
pub fn is_ignored(path: &Path, ignore: &[String]) -> bool {
    let path = path.to_string_lossy().replace('\\', "/");
    ignore.iter().any(|p| !p.is_empty() && path.contains(p.as_str()))
}

/// Parse dump content already read into memory.
pub fn parse_dump(path: &Path, content: &str) -> TmplintResult<CallSiteDump> {
    serde_json::from_str(content).map_err(|e| {
        if e.line() > 0 {
            TmplintError::parse_at(path, e.to_string(), e.line(), e.column())
        } else {
            TmplintError::parse(path, e.to_string())
        }
    })
}

/// Read and parse one dump file.
pub fn load_dump(path: &Path) -> TmplintResult<CallSiteDump> {
    let content = fs::read_to_string(path).with_path(path)?;
    parse_dump(path, &content)
}
