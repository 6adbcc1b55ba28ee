//! Copy / mirror / rename / remove over a working tree.

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use tracing::debug;
use walkdir::WalkDir;

/// Filesystem mutations a scaffold run depends on.
///
/// Every method raises on failure (missing source, permission denied) instead
/// of returning a status, so a single handler can catch them all.
pub trait TreeOps {
    /// Copy one file, creating missing parent directories of `to`.
    fn copy(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()>;

    /// Recursively copy a directory, creating `to`.
    fn mirror(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()>;

    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()>;

    /// Delete files and directory trees. Paths that do not exist are skipped.
    fn remove(&self, paths: &[Utf8PathBuf]) -> anyhow::Result<()>;
}

/// `TreeOps` backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTree;

impl TreeOps for FsTree {
    fn copy(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
        if !from.is_file() {
            bail!("copy source {} is not a file", from);
        }
        ensure_parent(to)?;
        fs::copy(from, to).with_context(|| format!("copy {} -> {}", from, to))?;
        debug!(from = from.as_str(), to = to.as_str(), "copied file");
        Ok(())
    }

    fn mirror(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
        if !from.is_dir() {
            bail!("mirror source {} is not a directory", from);
        }
        fs::create_dir_all(to).with_context(|| format!("create {}", to))?;

        let mut files = 0usize;
        for entry in WalkDir::new(from)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("walk {}", from))?;
            let rel = entry
                .path()
                .strip_prefix(from)
                .with_context(|| format!("{} escapes {}", entry.path().display(), from))?;
            let rel = Utf8Path::from_path(rel)
                .with_context(|| format!("non UTF-8 path under {}", from))?;
            let dest = to.join(rel);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).with_context(|| format!("create {}", dest))?;
            } else {
                fs::copy(entry.path(), &dest)
                    .with_context(|| format!("copy {} -> {}", from.join(rel), dest))?;
                files += 1;
            }
        }
        debug!(from = from.as_str(), to = to.as_str(), files, "mirrored directory");
        Ok(())
    }

    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
        if !from.exists() {
            bail!("rename source {} does not exist", from);
        }
        ensure_parent(to)?;
        fs::rename(from, to).with_context(|| format!("rename {} -> {}", from, to))?;
        debug!(from = from.as_str(), to = to.as_str(), "renamed");
        Ok(())
    }

    fn remove(&self, paths: &[Utf8PathBuf]) -> anyhow::Result<()> {
        for path in paths {
            let meta = match std::fs::symlink_metadata(path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = path.as_str(), "nothing to remove");
                    continue;
                }
                Err(e) => return Err(e).with_context(|| format!("stat {}", path)),
            };
            if meta.is_dir() {
                fs::remove_dir_all(path).with_context(|| format!("remove {}", path))?;
            } else {
                fs::remove_file(path).with_context(|| format!("remove {}", path))?;
            }
            debug!(path = path.as_str(), "removed");
        }
        Ok(())
    }
}

fn ensure_parent(path: &Utf8Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create parent dir for {}", path))?;
    }
    Ok(())
}
