//! The `new` pipeline: setup, scaffold, finalize.
//!
//! Every failure funnels through one dispatch point that classifies it, removes
//! whatever this run built, and records the outcome in the run report.

use crate::executor::{ExecutionJournal, execute_plan};
use crate::ports::{AbortSignal, TemplateSource};
use crate::settings::NewSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use fs_err as fs;
use multiapp_domain::template::SECRET_PLACEHOLDER;
use multiapp_domain::{FsTemplateView, Planner, check_reserved, check_template, detect_layout};
use multiapp_edit::{TreeOps, sha256_hex};
use multiapp_render::render_readme;
use multiapp_types::plan::ScaffoldPlan;
use multiapp_types::report::{RunReport, RunStatus};
use multiapp_types::{LayoutFlavor, ScaffoldConfig, UserAbort};
use tracing::{info, warn};

/// Failure of a pipeline run, classified for the exit status.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("aborted by user")]
    Aborted,

    /// Bad input, unusable target, template or download problems.
    #[error("{0:#}")]
    Setup(anyhow::Error),

    /// A scaffolding step or the executable swap failed.
    #[error("{0:#}")]
    Transform(anyhow::Error),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Aborted => 130,
            RunError::Setup(_) => 2,
            RunError::Transform(_) => 1,
        }
    }

    pub fn status(&self) -> RunStatus {
        match self {
            RunError::Aborted => RunStatus::Aborted,
            _ => RunStatus::Failed,
        }
    }

    /// `Aborted` when a [`UserAbort`] sits anywhere in the error chain.
    pub(crate) fn classify(self) -> Self {
        match self {
            RunError::Setup(e) | RunError::Transform(e) if is_user_abort(&e) => RunError::Aborted,
            other => other,
        }
    }
}

pub(crate) fn is_user_abort(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<UserAbort>())
}

/// Outcome of a successful `run_new`.
#[derive(Debug)]
pub struct NewOutcome {
    pub config: ScaffoldConfig,
    pub plan: ScaffoldPlan,
    /// Unified diff of every text patch applied.
    pub diff: String,
}

/// What exists on disk that a failed run must take back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Footprint {
    Nothing,
    /// The project directory was created by this run.
    CreatedDir,
    /// The project directory already existed (empty) and was filled.
    FilledDir,
}

/// Scaffold a multi-app project from the single-app template.
///
/// `report` is filled in as the run progresses and finished on every path, so
/// the caller can persist it whether or not the run succeeded.
pub fn run_new(
    settings: &NewSettings,
    template: &dyn TemplateSource,
    tree: &dyn TreeOps,
    abort: &dyn AbortSignal,
    report: &mut RunReport,
) -> Result<NewOutcome, RunError> {
    let root = settings.project_dir.clone();
    report.project_root = Some(root.to_string());

    let mut footprint = Footprint::Nothing;
    match scaffold(settings, template, tree, abort, report, &mut footprint) {
        Ok(outcome) => {
            finalize(settings, &outcome.config, report);
            report.finish(RunStatus::Succeeded);
            info!(project = root.as_str(), apps = outcome.config.apps.len(), "project created");
            Ok(outcome)
        }
        Err(err) => Err(fail(err, &root, footprint, tree, report)),
    }
}

fn scaffold(
    settings: &NewSettings,
    template: &dyn TemplateSource,
    tree: &dyn TreeOps,
    abort: &dyn AbortSignal,
    report: &mut RunReport,
    footprint: &mut Footprint,
) -> Result<NewOutcome, RunError> {
    let root = settings.project_dir.clone();

    // Validate everything that needs no disk access first.
    let apps = settings
        .app_set()
        .context("invalid application names")
        .map_err(RunError::Setup)?;
    let core = settings
        .core_name()
        .context("invalid core module name")
        .map_err(RunError::Setup)?;
    check_reserved(&apps, &core).map_err(|e| RunError::Setup(e.into()))?;
    let draft = ScaffoldConfig::new(
        root.clone(),
        apps,
        core,
        settings.layout.fixed().unwrap_or(LayoutFlavor::Modern),
    )
    .map_err(|e| RunError::Setup(e.into()))?;
    report.apps = draft.apps.names();
    report.core = Some(draft.core.to_string());

    *footprint = prepare_project_dir(&root).map_err(RunError::Setup)?;
    template
        .materialize(&root, abort)
        .context("materialize template")
        .map_err(RunError::Setup)?;

    let view = FsTemplateView::new(root.clone());
    let layout = settings.layout.fixed().unwrap_or_else(|| detect_layout(&view));
    check_template(&view, layout).map_err(RunError::Setup)?;
    let config = ScaffoldConfig { layout, ..draft };
    report.layout = Some(layout);
    info!(project = root.as_str(), layout = %layout, apps = ?report.apps, "scaffolding");

    let plan = Planner::new().plan(&config).map_err(RunError::Setup)?;

    let mut journal = ExecutionJournal::default();
    let executed = execute_plan(&config, &plan, tree, abort, &mut journal);
    report.steps = journal.steps;
    report.files_changed = journal.files_changed;
    report.anchors_missed = journal.anchors_missed;
    executed.map_err(RunError::Transform)?;

    Ok(NewOutcome {
        config,
        plan,
        diff: journal.diff,
    })
}

fn prepare_project_dir(root: &Utf8Path) -> anyhow::Result<Footprint> {
    if root.exists() {
        if !root.is_dir() {
            anyhow::bail!("{} exists and is not a directory", root);
        }
        let mut entries = fs::read_dir(root)?;
        if entries.next().is_some() {
            anyhow::bail!("project directory {} already exists and is not empty", root);
        }
        return Ok(Footprint::FilledDir);
    }
    fs::create_dir_all(root).with_context(|| format!("create project directory {}", root))?;
    Ok(Footprint::CreatedDir)
}

/// The single cleanup-then-report dispatch point.
fn fail(
    err: RunError,
    root: &Utf8Path,
    footprint: Footprint,
    tree: &dyn TreeOps,
    report: &mut RunReport,
) -> RunError {
    let err = err.classify();
    match &err {
        RunError::Aborted => warn!("aborted; cleaning up"),
        other => warn!(error = %other, "run failed; cleaning up"),
    }

    if let Err(cleanup) = clean_up(root, footprint, tree) {
        warn!(error = %format!("{cleanup:#}"), "cleanup incomplete");
        report.warnings.push(format!("cleanup incomplete: {cleanup:#}"));
    }

    report.error = Some(err.to_string());
    report.finish(err.status());
    err
}

fn clean_up(root: &Utf8Path, footprint: Footprint, tree: &dyn TreeOps) -> anyhow::Result<()> {
    match footprint {
        Footprint::Nothing => Ok(()),
        Footprint::CreatedDir => tree.remove(&[root.to_path_buf()]),
        Footprint::FilledDir => {
            let mut children = Vec::new();
            for entry in fs::read_dir(root)? {
                let path = Utf8PathBuf::from_path_buf(entry?.path())
                    .map_err(|p| anyhow::anyhow!("non UTF-8 path {}", p.display()))?;
                children.push(path);
            }
            tree.remove(&children)
        }
    }
}

/// Optional touches after a successful scaffold. Failures only warn.
fn finalize(settings: &NewSettings, config: &ScaffoldConfig, report: &mut RunReport) {
    let readme = config.project_root.join("README.md");
    let contents = render_readme(&settings.project_name(), &Local::now());
    if let Err(e) = fs::write(&readme, contents) {
        warn!(path = readme.as_str(), error = %e, "README not written");
        report.warnings.push(format!("README not written: {e}"));
    }

    for app in config.apps.iter() {
        let params = config
            .project_root
            .join(format!("apps/{app}/config/parameters.yml"));
        if let Err(e) = replace_secret(&params) {
            warn!(path = params.as_str(), error = %format!("{e:#}"), "secret not updated");
            report
                .warnings
                .push(format!("secret not updated in {params}: {e:#}"));
        }
    }
}

fn replace_secret(path: &Utf8Path) -> anyhow::Result<()> {
    let contents = fs::read_to_string(path)?;
    if !contents.contains(SECRET_PLACEHOLDER) {
        return Ok(());
    }
    fs::write(path, contents.replace(SECRET_PLACEHOLDER, &generate_secret()))?;
    Ok(())
}

fn generate_secret() -> String {
    sha256_hex(uuid::Uuid::new_v4().as_bytes())
}
