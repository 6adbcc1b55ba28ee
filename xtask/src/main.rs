use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use fs_err as fs;
use multiapp_core::adapters::{DirTemplateSource, NeverAbort};
use multiapp_core::{FsTree, LayoutChoice, NewSettings, run_new};
use multiapp_types::report::{RunReport, ToolInfo};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by multiapp.
    PrintSchemas,
    /// Scaffold a bundled fixture template into a scratch directory for inspection.
    ScaffoldFixture {
        /// Fixture flavor: modern or legacy.
        #[arg(long, default_value = "modern")]
        layout: String,

        #[arg(long, default_value = "target/fixture-project")]
        out: Utf8PathBuf,

        #[arg(long, value_delimiter = ',')]
        apps: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", multiapp_types::schema::MULTIAPP_PLAN_V1);
            println!("{}", multiapp_types::schema::MULTIAPP_RUN_V1);
        }
        Command::ScaffoldFixture { layout, out, apps } => {
            let template = Utf8PathBuf::from(format!("tests/fixtures/template-{layout}"));
            if !template.is_dir() {
                anyhow::bail!("no fixture template at {template} (run from the workspace root)");
            }
            if out.exists() {
                fs::remove_dir_all(&out).with_context(|| format!("clear {out}"))?;
            }

            let settings = NewSettings {
                project_dir: out.clone(),
                apps,
                layout: LayoutChoice::Auto,
                ..NewSettings::default()
            };
            let mut report = RunReport::new(
                ToolInfo {
                    name: "xtask".to_string(),
                    version: None,
                },
                "scaffold-fixture",
            );
            run_new(
                &settings,
                &DirTemplateSource::new(template),
                &FsTree,
                &NeverAbort,
                &mut report,
            )
            .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!(
                "scaffolded {} ({} steps, {} files patched)",
                out,
                report.steps.len(),
                report.files_changed.len()
            );
        }
    }
    Ok(())
}
