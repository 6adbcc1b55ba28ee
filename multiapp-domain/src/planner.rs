use crate::naming::{self, DerivedNames};
use crate::template::*;
use camino::Utf8PathBuf;
use multiapp_types::ops::{InsertPosition, ReplaceRule, ScaffoldOp, Stage};
use multiapp_types::plan::{PlannedStep, ScaffoldPlan};
use multiapp_types::{AppId, LayoutFlavor, ScaffoldConfig};
use tracing::debug;

/// Turns a [`ScaffoldConfig`] into the ordered op list that grows the
/// single-app tree into one tree per application.
///
/// Planning never touches the filesystem; the same config always yields
/// the same plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, config: &ScaffoldConfig) -> anyhow::Result<ScaffoldPlan> {
        naming::check_reserved(&config.apps, &config.core)?;

        let mut plan = ScaffoldPlan::new(config);
        plan.steps.push(step(Stage::RenameOriginalWebRoot, None, rename_web_root()));
        plan.steps.push(step(
            Stage::MaterializeCoreModule,
            None,
            core_module_ops(config.core.as_str()),
        ));

        for app in config.apps.iter() {
            let names = naming::derive_names(app);
            let per_app = [
                (Stage::MaterializeAppTree, app_tree_ops(config, app, &names)),
                (Stage::MaterializeAppBundle, bundle_ops(&names.bundle_class)),
                (Stage::MaterializeConsoleEntry, console_ops(config.layout, app, &names)),
                (Stage::MaterializeCacheAndLogDirs, runtime_dir_ops(config.layout, app)),
                (Stage::MaterializePublicDir, public_dir_ops(app, &names)),
            ];
            for (stage, ops) in per_app {
                plan.steps.push(step(stage, Some(app.clone()), ops));
            }
        }

        plan.steps.push(step(
            Stage::RemoveOriginalSingleAppArtifacts,
            None,
            removal_ops(config.layout),
        ));

        debug!(
            steps = plan.steps.len(),
            ops = plan.ops_total(),
            layout = %config.layout,
            "planned scaffold"
        );
        Ok(plan)
    }
}

fn step(stage: Stage, app: Option<AppId>, ops: Vec<ScaffoldOp>) -> PlannedStep {
    PlannedStep { stage, app, ops }
}

fn path(s: impl Into<String>) -> Utf8PathBuf {
    Utf8PathBuf::from(s.into())
}

/// A rule that matches `token` literally.
fn literal(token: &str, replacement: impl Into<String>) -> ReplaceRule {
    ReplaceRule::new(regex::escape(token), replacement)
}

fn class_rules(names: &DerivedNames) -> Vec<ReplaceRule> {
    vec![
        literal(GENERIC_BUNDLE, names.bundle_class.as_str()),
        literal(GENERIC_KERNEL, names.kernel_class.as_str()),
        literal(GENERIC_CACHE, names.cache_class.as_str()),
    ]
}

fn kernel_require(rel_prefix: &str, app: &AppId, names: &DerivedNames) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "require_once __DIR__.'{rel_prefix}/{APPS_DIR}/{app}/{}.php';",
            names.kernel_class
        ),
    ]
}

fn rename_web_root() -> Vec<ScaffoldOp> {
    vec![ScaffoldOp::Rename {
        from: path(WEB_DIR),
        to: path(WEB_ORIGINAL_DIR),
    }]
}

fn core_module_ops(core: &str) -> Vec<ScaffoldOp> {
    let mut ops = bundle_ops(&naming::bundle_class_name(core));
    let config_dir = format!("{APPS_DIR}/{core}/config");
    for file in CORE_CONFIG_FILES {
        ops.push(ScaffoldOp::Copy {
            from: path(format!("{APP_DIR}/config/{file}")),
            to: path(format!("{config_dir}/{file}")),
        });
    }
    ops.push(ScaffoldOp::Splice {
        file: path(format!("{config_dir}/config.yml")),
        offset: 0,
        length: CORE_CONFIG_HEADER_LINES,
        lines: vec![],
    });
    ops
}

/// Copy of `src/AppBundle` renamed to `bundle_class`.
fn bundle_ops(bundle_class: &str) -> Vec<ScaffoldOp> {
    let dir = format!("{SRC_DIR}/{bundle_class}");
    vec![
        ScaffoldOp::Mirror {
            from: path(format!("{SRC_DIR}/{GENERIC_BUNDLE}")),
            to: path(&dir),
        },
        ScaffoldOp::Rename {
            from: path(format!("{dir}/{GENERIC_BUNDLE}.php")),
            to: path(format!("{dir}/{bundle_class}.php")),
        },
        ScaffoldOp::ReplaceAll {
            files: vec![
                path(format!("{dir}/{bundle_class}.php")),
                path(format!("{dir}/Controller/DefaultController.php")),
            ],
            rules: vec![literal(GENERIC_BUNDLE, bundle_class)],
        },
    ]
}

fn app_tree_ops(config: &ScaffoldConfig, app: &AppId, names: &DerivedNames) -> Vec<ScaffoldOp> {
    let dir = format!("{APPS_DIR}/{app}");
    let kernel = path(format!("{dir}/{}.php", names.kernel_class));
    let cache = path(format!("{dir}/{}.php", names.cache_class));
    let app_config = path(format!("{dir}/config/config.yml"));
    let per_app_var = format!("/../{VAR_DIR}/{app}/");

    let mut ops = vec![
        ScaffoldOp::Mirror {
            from: path(APP_DIR),
            to: path(&dir),
        },
        ScaffoldOp::Rename {
            from: path(format!("{dir}/{GENERIC_KERNEL}.php")),
            to: kernel.clone(),
        },
        ScaffoldOp::Rename {
            from: path(format!("{dir}/{GENERIC_CACHE}.php")),
            to: cache.clone(),
        },
        ScaffoldOp::ReplaceAll {
            files: vec![kernel.clone(), cache],
            rules: class_rules(names),
        },
    ];

    ops.push(match config.layout {
        LayoutFlavor::Modern => ScaffoldOp::ReplaceAll {
            files: vec![kernel],
            rules: vec![literal("/var/", per_app_var.as_str())],
        },
        LayoutFlavor::Legacy => ScaffoldOp::Splice {
            file: kernel,
            offset: -2,
            length: 0,
            lines: legacy_dir_overrides(app),
        },
    });

    ops.extend([
        ScaffoldOp::ReplaceAll {
            files: vec![path(format!("{dir}/autoload.php"))],
            rules: vec![literal("../vendor", "../../vendor")],
        },
        ScaffoldOp::ReplaceAll {
            files: vec![path(format!("{dir}/config/routing.yml"))],
            rules: vec![literal(
                &format!("@{GENERIC_BUNDLE}"),
                format!("@{}", names.bundle_class),
            )],
        },
        ScaffoldOp::ReplaceAll {
            files: vec![app_config.clone()],
            rules: vec![literal("/var/", per_app_var.as_str())],
        },
        // Core params, app params, core config: app values override core
        // defaults and core services load last.
        ScaffoldOp::Splice {
            file: app_config,
            offset: 1,
            length: 1,
            lines: vec![
                format!(
                    "    - {{ resource: ../../{}/config/parameters.yml }}",
                    config.core
                ),
                "    - { resource: parameters.yml }".to_string(),
                format!("    - {{ resource: ../../{}/config/config.yml }}", config.core),
            ],
        },
    ]);
    ops
}

/// Cache and log directory accessors for kernels that predate `var/`.
fn legacy_dir_overrides(app: &AppId) -> Vec<String> {
    vec![
        String::new(),
        "    public function getCacheDir()".to_string(),
        "    {".to_string(),
        format!(
            "        return $this->getRootDir().\"/../../{VAR_DIR}/{app}/cache/\".$this->environment;"
        ),
        "    }".to_string(),
        String::new(),
        "    public function getLogDir()".to_string(),
        "    {".to_string(),
        format!("        return $this->getRootDir().\"/../../{VAR_DIR}/{app}/logs\";"),
        "    }".to_string(),
    ]
}

fn console_ops(layout: LayoutFlavor, app: &AppId, names: &DerivedNames) -> Vec<ScaffoldOp> {
    match layout {
        LayoutFlavor::Modern => {
            let entry = path(format!("{BIN_DIR}/{}", names.binary_entry));
            vec![
                ScaffoldOp::Copy {
                    from: path(CONSOLE_ENTRY),
                    to: entry.clone(),
                },
                ScaffoldOp::ReplaceAll {
                    files: vec![entry.clone()],
                    rules: vec![
                        literal(GENERIC_KERNEL, names.kernel_class.as_str()),
                        literal(&format!("/{APP_DIR}/"), format!("/{APPS_DIR}/{app}/")),
                    ],
                },
                ScaffoldOp::InsertAt {
                    file: entry,
                    anchor: format!("$kernel = new {}($env, $debug);", names.kernel_class),
                    position: InsertPosition::Before,
                    lines: kernel_require("/..", app, names),
                },
            ]
        }
        // The legacy console already lives inside the mirrored app tree.
        LayoutFlavor::Legacy => vec![ScaffoldOp::ReplaceAll {
            files: vec![path(format!("{APPS_DIR}/{app}/console"))],
            rules: vec![literal(GENERIC_KERNEL, names.kernel_class.as_str())],
        }],
    }
}

fn runtime_dir_ops(layout: LayoutFlavor, app: &AppId) -> Vec<ScaffoldOp> {
    if !layout.is_modern() {
        return vec![];
    }
    RUNTIME_DIRS
        .iter()
        .map(|dir| ScaffoldOp::Mirror {
            from: path(format!("{VAR_DIR}/{dir}")),
            to: path(format!("{VAR_DIR}/{app}/{dir}")),
        })
        .collect()
}

fn public_dir_ops(app: &AppId, names: &DerivedNames) -> Vec<ScaffoldOp> {
    let dir = format!("{WEB_DIR}/{}", names.public_asset_dir);
    let mut rules = class_rules(names);
    rules.push(literal(
        &format!("/{APP_DIR}/"),
        format!("/../{APPS_DIR}/{app}/"),
    ));
    rules.push(literal("/var/", "/../var/"));

    let mut ops = vec![
        ScaffoldOp::Mirror {
            from: path(WEB_ORIGINAL_DIR),
            to: path(&dir),
        },
        ScaffoldOp::ReplaceAll {
            files: FRONT_CONTROLLERS
                .iter()
                .map(|(file, _)| path(format!("{dir}/{file}")))
                .collect(),
            rules,
        },
    ];
    for (file, args) in FRONT_CONTROLLERS {
        ops.push(ScaffoldOp::InsertAt {
            file: path(format!("{dir}/{file}")),
            anchor: format!("$kernel = new {}({args});", names.kernel_class),
            position: InsertPosition::Before,
            lines: kernel_require("/../..", app, names),
        });
    }
    ops
}

fn removal_ops(layout: LayoutFlavor) -> Vec<ScaffoldOp> {
    let mut paths = vec![
        path(APP_DIR),
        path(format!("{SRC_DIR}/{GENERIC_BUNDLE}")),
    ];
    if layout.is_modern() {
        paths.push(path(CONSOLE_ENTRY));
        paths.extend(RUNTIME_DIRS.iter().map(|d| path(format!("{VAR_DIR}/{d}"))));
    }
    paths.push(path(WEB_ORIGINAL_DIR));
    paths.push(path(format!("{TESTS_DIR}/{GENERIC_BUNDLE}")));
    vec![ScaffoldOp::Remove { paths }]
}
