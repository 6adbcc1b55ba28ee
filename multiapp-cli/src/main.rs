mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use config::{ConfigMerger, MergedScaffold, MultiappConfig, ScaffoldOverrides};
use fs_err as fs;
use multiapp_core::adapters::{DirTemplateSource, FlagAbort, HttpReleaseSource};
use multiapp_core::{
    FsTree, LayoutChoice, NewSettings, RunError, SelfUpdateSettings, UpdateOutcome, run_new,
    run_self_update,
};
use multiapp_domain::{FsTemplateView, Planner, check_template, detect_layout};
use multiapp_render::{render_install_result, render_plan_md};
use multiapp_types::ScaffoldConfig;
use multiapp_types::report::{RunReport, ToolInfo};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "multiapp",
    version,
    about = "Scaffold a single-app Symfony template into several isolated applications sharing a core module."
)]
struct Cli {
    /// Config file (default: ./multiapp.toml when present).
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new multi-app project.
    New(NewArgs),
    /// Print the scaffold plan without touching disk.
    Plan(PlanArgs),
    /// Replace this executable with the latest release.
    #[command(alias = "selfupdate")]
    SelfUpdate(SelfUpdateArgs),
}

#[derive(Debug, Args)]
struct NamingArgs {
    /// Application names, comma separated (default: app1..appN).
    #[arg(long, value_delimiter = ',')]
    apps: Vec<String>,

    /// Number of numbered applications when --apps is not given.
    #[arg(long)]
    app_count: Option<usize>,

    /// Core module name (e.g. CoreBundle).
    #[arg(long)]
    core: Option<String>,

    /// Template layout: auto, modern or legacy.
    #[arg(long)]
    layout: Option<LayoutChoice>,
}

impl NamingArgs {
    fn overrides(self) -> ScaffoldOverrides {
        ScaffoldOverrides {
            apps: self.apps,
            app_count: self.app_count,
            core: self.core,
            layout: self.layout,
        }
    }
}

#[derive(Debug, Parser)]
struct NewArgs {
    /// Directory of the new project.
    directory: Utf8PathBuf,

    /// Extracted single-app template to start from.
    #[arg(long)]
    template: Utf8PathBuf,

    #[command(flatten)]
    naming: NamingArgs,

    /// Write the JSON run report here (also on failure).
    #[arg(long)]
    report: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    /// Extracted single-app template to plan against.
    #[arg(long)]
    template: Utf8PathBuf,

    #[command(flatten)]
    naming: NamingArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct SelfUpdateArgs {
    /// URL whose body is the latest version string.
    #[arg(long)]
    version_url: Option<String>,

    /// URL of the release executable.
    #[arg(long)]
    download_url: Option<String>,

    /// Expected sha256 (hex) of the downloaded executable.
    #[arg(long)]
    sha256: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let abort = FlagAbort::new();
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, abort.flag()) {
        debug!("could not install SIGINT handler: {}", e);
    }

    let result = match cli.cmd {
        Command::New(args) => cmd_new(cli.config.as_deref(), args, &abort),
        Command::Plan(args) => cmd_plan(cli.config.as_deref(), args),
        Command::SelfUpdate(args) => cmd_self_update(cli.config.as_deref(), args, &abort),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", failure_message(&err));
            ExitCode::from(err.exit_code())
        }
    }
}

/// A user abort is a notice, not an error.
fn failure_message(err: &RunError) -> String {
    match err {
        RunError::Aborted => "Aborting and cleaning up temporary files and directories.".to_string(),
        other => format!("error: {other}"),
    }
}

fn load_config(explicit: Option<&Utf8Path>) -> Result<MultiappConfig, RunError> {
    config::load(explicit, Utf8Path::new("."))
        .context("load multiapp.toml config")
        .map_err(RunError::Setup)
}

fn merge_naming(
    explicit: Option<&Utf8Path>,
    naming: NamingArgs,
) -> Result<MergedScaffold, RunError> {
    let defaults = NewSettings::default();
    let merged = ConfigMerger::new(load_config(explicit)?)
        .merge_scaffold(naming.overrides(), (defaults.app_count, defaults.core.as_str()))
        .map_err(RunError::Setup)?;
    debug!(
        "merged config: apps={:?}, app_count={}, core={}, layout={:?}",
        merged.apps, merged.app_count, merged.core, merged.layout
    );
    Ok(merged)
}

fn settings_from(project_dir: Utf8PathBuf, merged: MergedScaffold) -> NewSettings {
    NewSettings {
        project_dir,
        apps: merged.apps,
        app_count: merged.app_count,
        core: merged.core,
        layout: merged.layout,
    }
}

fn cmd_new(
    explicit: Option<&Utf8Path>,
    args: NewArgs,
    abort: &FlagAbort,
) -> Result<(), RunError> {
    let merged = merge_naming(explicit, args.naming)?;
    let settings = settings_from(args.directory, merged);
    let template = DirTemplateSource::new(args.template);

    let mut report = RunReport::new(tool_info(), "new");
    let result = run_new(&settings, &template, &FsTree, abort, &mut report);

    if let Some(path) = &args.report
        && let Err(e) = write_json(path, &report)
    {
        warn!("run report not written: {:#}", e);
    }

    let outcome = result?;
    print!("{}", render_install_result(&report));
    info!(
        "created {} with {} apps ({} files patched)",
        outcome.config.project_root,
        outcome.config.apps.len(),
        report.files_changed.len()
    );
    Ok(())
}

fn cmd_plan(explicit: Option<&Utf8Path>, args: PlanArgs) -> Result<(), RunError> {
    let merged = merge_naming(explicit, args.naming)?;
    let layout_choice = merged.layout;
    let settings = settings_from(Utf8PathBuf::from("."), merged);

    let apps = settings
        .app_set()
        .context("invalid application names")
        .map_err(RunError::Setup)?;
    let core = settings
        .core_name()
        .context("invalid core module name")
        .map_err(RunError::Setup)?;

    let view = FsTemplateView::new(args.template);
    let layout = layout_choice.fixed().unwrap_or_else(|| detect_layout(&view));
    check_template(&view, layout).map_err(RunError::Setup)?;

    let config = ScaffoldConfig::new(settings.project_dir, apps, core, layout)
        .map_err(|e| RunError::Setup(e.into()))?;
    let plan = Planner::new().plan(&config).map_err(RunError::Setup)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_plan_md(&plan)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan)
                .context("serialize plan")
                .map_err(RunError::Setup)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn cmd_self_update(
    explicit: Option<&Utf8Path>,
    args: SelfUpdateArgs,
    abort: &FlagAbort,
) -> Result<(), RunError> {
    let merged =
        ConfigMerger::new(load_config(explicit)?).merge_self_update(args.version_url, args.download_url);
    let (Some(version_url), Some(download_url)) = (merged.version_url, merged.download_url) else {
        return Err(RunError::Setup(anyhow::anyhow!(
            "self-update needs a release location: pass --version-url and --download-url \
             or set them under [self_update] in multiapp.toml"
        )));
    };

    let exe = std::env::current_exe()
        .context("locate the running executable")
        .map_err(RunError::Setup)?;
    let current_exe = Utf8PathBuf::from_path_buf(exe).map_err(|p| {
        RunError::Setup(anyhow::anyhow!("non UTF-8 executable path {}", p.display()))
    })?;
    let temp_dir = Utf8PathBuf::from_path_buf(std::env::temp_dir()).map_err(|p| {
        RunError::Setup(anyhow::anyhow!("non UTF-8 temp directory {}", p.display()))
    })?;

    let settings = SelfUpdateSettings {
        current_exe,
        current_version: env!("CARGO_PKG_VERSION").to_string(),
        temp_dir,
        expected_sha256: args.sha256,
    };
    let source = HttpReleaseSource {
        version_url,
        download_url,
    };

    match run_self_update(&settings, &source, abort)? {
        UpdateOutcome::UpToDate { version } => {
            println!("multiapp is already up to date ({version}).");
        }
        UpdateOutcome::Updated { from, to } => {
            println!("multiapp was updated from {from} to {to}.");
        }
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "multiapp".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
