use crate::config::LayoutFlavor;
use crate::ops::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Machine-readable record of one `new` or `self-update` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub run_id: String,
    pub tool: ToolInfo,
    pub command: String,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    pub status: RunStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutFlavor>,

    #[serde(default)]
    pub steps: Vec<StepRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_changed: Vec<FileChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors_missed: Vec<MissedAnchor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(tool: ToolInfo, command: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::MULTIAPP_RUN_V1.to_string(),
            run_id: uuid::Uuid::new_v4().to_string(),
            tool,
            command: command.into(),
            started_at: Utc::now(),
            ended_at: None,
            status: RunStatus::Running,
            project_root: None,
            apps: vec![],
            core: None,
            layout: None,
            steps: vec![],
            files_changed: vec![],
            anchors_missed: vec![],
            warnings: vec![],
            error: None,
        }
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded,
    UpToDate,
    Failed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub stage: Stage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    pub ops: u64,
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    Failed,
}

/// Content change made by one text patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub before_sha256: String,
    pub after_sha256: String,
    pub before_bytes: u64,
    pub after_bytes: u64,
}

/// An `insert_at` anchor that was not found; the file was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedAnchor {
    pub path: String,
    pub anchor: String,
}
