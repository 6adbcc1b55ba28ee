//! Rendering helpers for human-readable output.

use chrono::{DateTime, TimeZone};
use multiapp_types::config::LayoutFlavor;
use multiapp_types::ops::{InsertPosition, ScaffoldOp};
use multiapp_types::plan::ScaffoldPlan;
use multiapp_types::report::RunReport;

pub fn render_plan_md(plan: &ScaffoldPlan) -> String {
    let mut out = String::new();
    out.push_str("# multiapp plan\n\n");
    out.push_str(&format!("- Layout: `{}`\n", plan.layout));
    out.push_str(&format!("- Core module: `{}`\n", plan.core));
    out.push_str(&format!("- Apps: {}\n", plan.apps.names().join(", ")));
    out.push_str(&format!(
        "- Steps: {} ({} ops)\n\n",
        plan.steps.len(),
        plan.ops_total()
    ));

    out.push_str("## Steps\n\n");
    for (i, step) in plan.steps.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, step.label()));
        if step.ops.is_empty() {
            out.push_str(&format!("_Nothing to do for the `{}` layout._\n\n", plan.layout));
            continue;
        }
        for op in &step.ops {
            out.push_str(&format!("- {}\n", describe_op(op)));
        }
        out.push('\n');
    }

    out
}

fn describe_op(op: &ScaffoldOp) -> String {
    match op {
        ScaffoldOp::Copy { from, to } => format!("copy `{from}` → `{to}`"),
        ScaffoldOp::Mirror { from, to } => format!("mirror `{from}/` → `{to}/`"),
        ScaffoldOp::Rename { from, to } => format!("rename `{from}` → `{to}`"),
        ScaffoldOp::Remove { paths } => {
            let list: Vec<String> = paths.iter().map(|p| format!("`{p}`")).collect();
            format!("remove {}", list.join(", "))
        }
        ScaffoldOp::InsertAt {
            file,
            anchor,
            position,
            lines,
        } => format!(
            "insert {} line(s) {} `{}` in `{file}`",
            lines.len(),
            position_label(*position),
            anchor
        ),
        ScaffoldOp::Splice {
            file,
            offset,
            length,
            lines,
        } => format!(
            "splice `{file}` at line {offset}: drop {length}, insert {}",
            lines.len()
        ),
        ScaffoldOp::ReplaceAll { files, rules } => {
            let files: Vec<String> = files.iter().map(|p| format!("`{p}`")).collect();
            let rules: Vec<String> = rules
                .iter()
                .map(|r| format!("`{}` → `{}`", r.pattern, r.replacement))
                .collect();
            format!("replace {} in {}", rules.join(", "), files.join(", "))
        }
    }
}

fn position_label(p: InsertPosition) -> &'static str {
    match p {
        InsertPosition::Before => "before",
        InsertPosition::Same => "in place of",
        InsertPosition::After => "after",
    }
}

/// Summary printed after a successful `new` run.
pub fn render_install_result(report: &RunReport) -> String {
    let layout = report.layout.unwrap_or(LayoutFlavor::Modern);
    let mut out = String::new();
    out.push_str(" ✔  Multi-app project was successfully created. Now you can:\n\n");

    out.push_str("    * Applications installed:\n");
    for (i, app) in report.apps.iter().enumerate() {
        out.push_str(&format!("        {}. Name: {}\n", i + 1, app));
    }
    out.push('\n');

    if let Some(root) = report.project_root.as_deref().filter(|r| *r != ".") {
        out.push_str(&format!("    * Change your current directory to {root}\n\n"));
    }

    let console = match layout {
        LayoutFlavor::Modern => "bin/{app_name}",
        LayoutFlavor::Legacy => "apps/{app_name}/console",
    };
    out.push_str(
        "    * Configure each application in apps/{app_name}/config/parameters.yml\n\n",
    );
    out.push_str("    * Run an application:\n");
    out.push_str(&format!(
        "        1. Execute php {console} server:run --docroot web/{{app_name}}\n"
    ));
    out.push_str("        2. Browse to http://localhost:8000\n");

    if !report.anchors_missed.is_empty() {
        out.push_str("\n    * Some patches were skipped because their anchor line was missing:\n");
        for missed in &report.anchors_missed {
            out.push_str(&format!("        - {}: {}\n", missed.path, missed.anchor));
        }
    }

    out
}

/// `README.md` written at the project root.
pub fn render_readme<Tz>(project_name: &str, created: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{project_name}\n{}\n\nA Symfony multi-project created on {}.\n",
        "=".repeat(project_name.chars().count()),
        created.format("%B %-d, %Y, %-I:%M %P")
    )
}
