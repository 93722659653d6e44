//! Resolution of configured input roots into the ordered target list.

use std::io::Read;
use std::path::{Path, PathBuf};

use manifold_core::types::ResolvedTarget;
use manifold_fs::{Fs, FsError};
use tracing::info;

use crate::InputError;

/// Resolves the roots as directories of manifest files.
///
/// Every file found under a root is a manifest: UTF-8 text, one target path
/// per non-empty line. Each line is stat'ed into a [`ResolvedTarget`]; a
/// line naming a missing path or a directory fails the whole call, so data
/// is never silently dropped from the logical input. Ordering follows the
/// manifest walk order, then line order within each manifest.
pub fn resolve_manifest_targets(
    fs: &dyn Fs,
    roots: &[PathBuf],
) -> Result<Vec<ResolvedTarget>, InputError> {
    let mut targets = Vec::new();
    for root in roots {
        for manifest in walk_files(fs, root)? {
            let lines = read_manifest_lines(fs, &manifest)?;
            for line in &lines {
                targets.push(resolve_target(fs, Path::new(line))?);
            }
            info!(
                target: "manifold_proof",
                event = "manifest_resolved",
                manifest = %manifest.display(),
                entries = lines.len() as u64,
                "resolved manifest"
            );
        }
    }
    Ok(targets)
}

/// Resolves the roots as directories holding the data files themselves.
pub fn resolve_direct_targets(
    fs: &dyn Fs,
    roots: &[PathBuf],
) -> Result<Vec<ResolvedTarget>, InputError> {
    let mut targets = Vec::new();
    for root in roots {
        for path in walk_files(fs, root)? {
            targets.push(resolve_target(fs, &path)?);
        }
    }
    Ok(targets)
}

/// Recursively collects the files under `root`, depth-first, children in
/// the filesystem's listing order.
fn walk_files(fs: &dyn Fs, root: &Path) -> Result<Vec<PathBuf>, FsError> {
    let mut out = Vec::new();
    walk_into(fs, root, &mut out)?;
    Ok(out)
}

fn walk_into(fs: &dyn Fs, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), FsError> {
    for entry in fs.list(dir)? {
        if entry.is_dir {
            walk_into(fs, &entry.path, out)?;
        } else {
            out.push(entry.path);
        }
    }
    Ok(())
}

fn resolve_target(fs: &dyn Fs, path: &Path) -> Result<ResolvedTarget, InputError> {
    match fs.stat(path) {
        Ok(stat) => Ok(ResolvedTarget {
            path: path.to_path_buf(),
            len: stat.len,
            blocks: stat.blocks,
        }),
        Err(FsError::NotAFile(p)) => Err(InputError::TargetIsDirectory(p)),
        Err(err) => Err(err.into()),
    }
}

fn read_manifest_lines(fs: &dyn Fs, manifest: &Path) -> Result<Vec<String>, InputError> {
    let mut stream = fs.open_read(manifest)?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
