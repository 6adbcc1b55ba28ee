use camino::{Utf8Path, Utf8PathBuf};

/// Read-only view of a template tree.
///
/// Layout detection and template checks go through this so they can run
/// against an in-memory listing in tests.
pub trait TemplateView {
    fn root(&self) -> &Utf8Path;

    fn is_file(&self, rel: &Utf8Path) -> bool;

    fn is_dir(&self, rel: &Utf8Path) -> bool;
}

/// File-system backed `TemplateView`.
#[derive(Debug, Clone)]
pub struct FsTemplateView {
    root: Utf8PathBuf,
}

impl FsTemplateView {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl TemplateView for FsTemplateView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn is_file(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).is_file()
    }

    fn is_dir(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).is_dir()
    }
}
