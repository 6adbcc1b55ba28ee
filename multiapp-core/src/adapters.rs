//! Default port implementations.

use crate::ports::{AbortSignal, ReleaseSource, TemplateSource};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use multiapp_edit::{FsTree, TreeOps};
use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

const CHUNK: usize = 64 * 1024;

/// Copies an already extracted template directory.
#[derive(Debug, Clone)]
pub struct DirTemplateSource {
    pub root: Utf8PathBuf,
}

impl DirTemplateSource {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateSource for DirTemplateSource {
    fn materialize(&self, dest: &Utf8Path, abort: &dyn AbortSignal) -> anyhow::Result<()> {
        abort.check()?;
        if !self.root.is_dir() {
            anyhow::bail!("template directory {} does not exist", self.root);
        }
        FsTree
            .mirror(&self.root, dest)
            .with_context(|| format!("copy template {} into {}", self.root, dest))?;
        debug!(template = self.root.as_str(), dest = dest.as_str(), "template materialized");
        Ok(())
    }
}

/// Release metadata and executable served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReleaseSource {
    /// Plain-text body holding the latest version string.
    pub version_url: String,
    pub download_url: String,
}

impl ReleaseSource for HttpReleaseSource {
    fn latest_version(&self) -> anyhow::Result<String> {
        let body = ureq::get(&self.version_url)
            .call()
            .with_context(|| format!("GET {}", self.version_url))?
            .into_string()
            .with_context(|| format!("read body of {}", self.version_url))?;
        let version = body.trim();
        if version.is_empty() {
            anyhow::bail!("{} returned an empty version", self.version_url);
        }
        Ok(version.to_string())
    }

    fn download(&self, dest: &Utf8Path, abort: &dyn AbortSignal) -> anyhow::Result<()> {
        let response = ureq::get(&self.download_url)
            .call()
            .with_context(|| format!("GET {}", self.download_url))?;
        let mut reader = response.into_reader();
        let mut out = fs::File::create(dest.as_std_path())?;
        let mut buf = vec![0u8; CHUNK];
        let mut total = 0u64;
        loop {
            abort.check().context("download interrupted")?;
            let n = reader
                .read(&mut buf)
                .with_context(|| format!("read {}", self.download_url))?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])?;
            total += n as u64;
        }
        out.flush()?;
        debug!(url = self.download_url.as_str(), bytes = total, "release downloaded");
        Ok(())
    }
}

/// In-memory release for embedding and testing.
#[derive(Debug, Clone)]
pub struct StaticReleaseSource {
    pub version: String,
    pub bytes: Vec<u8>,
}

impl ReleaseSource for StaticReleaseSource {
    fn latest_version(&self) -> anyhow::Result<String> {
        Ok(self.version.clone())
    }

    fn download(&self, dest: &Utf8Path, abort: &dyn AbortSignal) -> anyhow::Result<()> {
        abort.check()?;
        fs::write(dest, &self.bytes)?;
        Ok(())
    }
}

/// Abort signal backed by a shared flag, e.g. one set from a SIGINT handler.
#[derive(Debug, Clone, Default)]
pub struct FlagAbort {
    flag: Arc<AtomicBool>,
}

impl FlagAbort {
    pub fn new() -> Self {
        Self::default()
    }

    /// The flag to hand to a signal handler.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl AbortSignal for FlagAbort {
    fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Never requests cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortSignal for NeverAbort {
    fn is_aborted(&self) -> bool {
        false
    }
}
