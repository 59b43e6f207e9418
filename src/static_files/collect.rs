//! Gather static assets from source directories into the static root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::StaticAssetPolicy;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of a collection run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CollectReport {
    /// Files written to the static root.
    pub copied: usize,
    /// Files skipped because the collected copy is already current.
    pub unmodified: usize,
    /// Source directories that did not exist.
    pub missing_sources: Vec<PathBuf>,
}

/// Copy every file under each source directory into the static root,
/// preserving relative paths. Later sources do not overwrite files an
/// earlier source already provided in the same run.
pub fn collect_static(policy: &StaticAssetPolicy) -> Result<CollectReport, CollectError> {
    let mut report = CollectReport::default();
    let mut seen = std::collections::HashSet::new();

    create_dir(&policy.root_path)?;

    for source in &policy.source_dirs {
        if !source.is_dir() {
            tracing::warn!(source = %source.display(), "Static source directory not found, skipping");
            report.missing_sources.push(source.clone());
            continue;
        }

        let mut files = Vec::new();
        walk(source, &mut files)?;

        for file in files {
            let Ok(relative) = file.strip_prefix(source) else {
                continue;
            };
            if !seen.insert(relative.to_path_buf()) {
                tracing::debug!(file = %relative.display(), "Already collected from an earlier source");
                continue;
            }

            let target = policy.root_path.join(relative);
            if is_current(&file, &target) {
                report.unmodified += 1;
                continue;
            }
            if let Some(parent) = target.parent() {
                create_dir(parent)?;
            }
            fs::copy(&file, &target).map_err(|source| CollectError::Io {
                action: "copy",
                path: file.clone(),
                source,
            })?;
            report.copied += 1;
        }
    }

    tracing::info!(
        root = %policy.root_path.display(),
        copied = report.copied,
        unmodified = report.unmodified,
        "Static files collected"
    );
    Ok(report)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CollectError> {
    let entries = fs::read_dir(dir).map_err(|source| CollectError::Io {
        action: "read directory",
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// The target exists, has the same size, and is no older than the source.
fn is_current(source: &Path, target: &Path) -> bool {
    let (Ok(src), Ok(dst)) = (fs::metadata(source), fs::metadata(target)) else {
        return false;
    };
    match (src.modified(), dst.modified()) {
        (Ok(src_time), Ok(dst_time)) => src.len() == dst.len() && dst_time >= src_time,
        _ => false,
    }
}

fn create_dir(path: &Path) -> Result<(), CollectError> {
    fs::create_dir_all(path).map_err(|source| CollectError::Io {
        action: "create directory",
        path: path.to_path_buf(),
        source,
    })
}
