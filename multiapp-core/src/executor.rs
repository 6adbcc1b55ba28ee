//! Applies a [`ScaffoldPlan`] to the project tree.

use crate::ports::AbortSignal;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use multiapp_edit::{FileEdit, TreeOps, insert_at, regex_replace_all, splice_lines};
use multiapp_types::ScaffoldConfig;
use multiapp_types::ops::ScaffoldOp;
use multiapp_types::plan::{PlannedStep, ScaffoldPlan};
use multiapp_types::report::{FileChange, MissedAnchor, StepRecord, StepStatus};
use tracing::{debug, info, warn};

/// What a (possibly interrupted) plan execution did.
#[derive(Debug, Clone, Default)]
pub struct ExecutionJournal {
    pub steps: Vec<StepRecord>,
    pub files_changed: Vec<FileChange>,
    pub anchors_missed: Vec<MissedAnchor>,
    /// Unified diff of every text patch, in application order.
    pub diff: String,
}

impl ExecutionJournal {
    fn record_edit(&mut self, root: &Utf8Path, edit: FileEdit) {
        let rel = edit
            .path
            .strip_prefix(root)
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|_| edit.path.clone());

        if let Some(anchor) = &edit.anchor_missing {
            warn!(path = rel.as_str(), anchor = anchor.as_str(), "anchor line not found; file left unchanged");
            self.anchors_missed.push(MissedAnchor {
                path: rel.to_string(),
                anchor: anchor.clone(),
            });
        }
        if edit.changed() {
            let mut change = edit.file_change();
            change.path = rel.to_string();
            self.files_changed.push(change);
            self.diff.push_str(&edit.unified_diff(rel.as_str()));
        }
    }
}

/// Apply every step of `plan` in order.
///
/// The abort signal is checked before each step. Progress is recorded in
/// `journal` as it happens, so the caller still sees what was done when this
/// returns an error.
pub fn execute_plan(
    config: &ScaffoldConfig,
    plan: &ScaffoldPlan,
    tree: &dyn TreeOps,
    abort: &dyn AbortSignal,
    journal: &mut ExecutionJournal,
) -> anyhow::Result<()> {
    let root = config.project_root.as_path();
    for step in &plan.steps {
        abort.check()?;
        let label = step.label();
        info!(step = label.as_str(), ops = step.ops.len(), "scaffold step");

        let result = run_step(root, step, tree, journal);
        journal.steps.push(StepRecord {
            stage: step.stage,
            app: step.app.as_ref().map(|a| a.to_string()),
            ops: step.ops.len() as u64,
            status: if result.is_ok() {
                StepStatus::Applied
            } else {
                StepStatus::Failed
            },
            message: result.as_ref().err().map(|e| format!("{e:#}")),
        });
        result.with_context(|| format!("step {label} failed"))?;
    }
    Ok(())
}

fn run_step(
    root: &Utf8Path,
    step: &PlannedStep,
    tree: &dyn TreeOps,
    journal: &mut ExecutionJournal,
) -> anyhow::Result<()> {
    for op in &step.ops {
        debug!(kind = op.kind(), "apply op");
        apply_op(root, op, tree, journal).with_context(|| describe(op))?;
    }
    Ok(())
}

fn apply_op(
    root: &Utf8Path,
    op: &ScaffoldOp,
    tree: &dyn TreeOps,
    journal: &mut ExecutionJournal,
) -> anyhow::Result<()> {
    match op {
        ScaffoldOp::Copy { from, to } => tree.copy(&root.join(from), &root.join(to)),
        ScaffoldOp::Mirror { from, to } => tree.mirror(&root.join(from), &root.join(to)),
        ScaffoldOp::Rename { from, to } => tree.rename(&root.join(from), &root.join(to)),
        ScaffoldOp::Remove { paths } => {
            let abs: Vec<Utf8PathBuf> = paths.iter().map(|p| root.join(p)).collect();
            tree.remove(&abs)
        }
        ScaffoldOp::InsertAt {
            file,
            anchor,
            position,
            lines,
        } => {
            let edit = insert_at(&root.join(file), anchor, *position, lines)?;
            journal.record_edit(root, edit);
            Ok(())
        }
        ScaffoldOp::Splice {
            file,
            offset,
            length,
            lines,
        } => {
            let edit = splice_lines(&root.join(file), *offset, *length, lines)?;
            journal.record_edit(root, edit);
            Ok(())
        }
        ScaffoldOp::ReplaceAll { files, rules } => {
            let abs: Vec<Utf8PathBuf> = files.iter().map(|p| root.join(p)).collect();
            for edit in regex_replace_all(&abs, rules)? {
                journal.record_edit(root, edit);
            }
            Ok(())
        }
    }
}

fn describe(op: &ScaffoldOp) -> String {
    let targets: Vec<&str> = op.targets().into_iter().map(Utf8Path::as_str).collect();
    format!("{} {}", op.kind(), targets.join(", "))
}
