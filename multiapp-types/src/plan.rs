use crate::config::{LayoutFlavor, ScaffoldConfig};
use crate::ids::{AppId, AppSet, CoreModuleName};
use crate::ops::{ScaffoldOp, Stage};
use serde::{Deserialize, Serialize};

/// The full, ordered list of operations for one scaffold run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldPlan {
    pub schema: String,
    pub apps: AppSet,
    pub core: CoreModuleName,
    pub layout: LayoutFlavor,

    #[serde(default)]
    pub steps: Vec<PlannedStep>,
}

impl ScaffoldPlan {
    pub fn new(config: &ScaffoldConfig) -> Self {
        Self {
            schema: crate::schema::MULTIAPP_PLAN_V1.to_string(),
            apps: config.apps.clone(),
            core: config.core.clone(),
            layout: config.layout,
            steps: vec![],
        }
    }

    pub fn ops_total(&self) -> usize {
        self.steps.iter().map(|s| s.ops.len()).sum()
    }

    pub fn steps_for(&self, stage: Stage) -> impl Iterator<Item = &PlannedStep> {
        self.steps.iter().filter(move |s| s.stage == stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub stage: Stage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppId>,

    #[serde(default)]
    pub ops: Vec<ScaffoldOp>,
}

impl PlannedStep {
    /// `stage` or `stage[app]`, used in logs and error context.
    pub fn label(&self) -> String {
        match &self.app {
            Some(app) => format!("{}[{}]", self.stage, app),
            None => self.stage.to_string(),
        }
    }
}
