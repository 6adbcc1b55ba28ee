//! Port traits abstracting the outside world away from the pipelines.

use camino::Utf8Path;
use multiapp_types::UserAbort;

/// Produces the single-app template tree at a local path.
pub trait TemplateSource {
    /// Populate `dest` (an existing, empty directory) with the template.
    fn materialize(&self, dest: &Utf8Path, abort: &dyn AbortSignal) -> anyhow::Result<()>;
}

/// Where self-update finds the newest release.
pub trait ReleaseSource {
    fn latest_version(&self) -> anyhow::Result<String>;

    /// Write the release executable to `dest`.
    fn download(&self, dest: &Utf8Path, abort: &dyn AbortSignal) -> anyhow::Result<()>;
}

/// Cancellation requested by the user (Ctrl-C, a closed prompt...).
pub trait AbortSignal {
    fn is_aborted(&self) -> bool;

    /// `Err(UserAbort)` once cancellation was requested.
    fn check(&self) -> anyhow::Result<()> {
        if self.is_aborted() {
            Err(UserAbort.into())
        } else {
            Ok(())
        }
    }
}
