use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Environment variable consulted when `--workspace` isn't given.
pub const WORKSPACE_ENV: &str = "GROWTHTRACK_WORKSPACE";

const ANALYTICS_FILE: &str = "data/analytics.json";
const STRATEGY_TASKS_FILE: &str = "data/strategy-tasks.json";
const MASTER_TASKS_FILE: &str = "data/tasks.json";
const DASHBOARD_FILE: &str = "dashboard/index.html";

/// Tasks whose category contains this text are counted by `status`.
pub const DEFAULT_TASK_CATEGORY: &str = "linkedin";

/// Every location the tool touches. It's resolved once at startup and handed to each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    pub analytics_path: PathBuf,
    pub strategy_tasks_path: PathBuf,
    pub master_tasks_path: PathBuf,
    pub dashboard_path: PathBuf,
    pub task_category: String,
}

impl WorkspaceConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            analytics_path: root.join(ANALYTICS_FILE),
            strategy_tasks_path: root.join(STRATEGY_TASKS_FILE),
            master_tasks_path: root.join(MASTER_TASKS_FILE),
            dashboard_path: root.join(DASHBOARD_FILE),
            task_category: DEFAULT_TASK_CATEGORY.to_string(),
            root,
        }
    }

    /// Picks the workspace root from the command line, then [WORKSPACE_ENV], then the current
    /// directory.
    pub fn resolve(workspace: Option<&Path>) -> Result<Self> {
        let root = match workspace {
            Some(v) => v.to_path_buf(),
            None => match env::var_os(WORKSPACE_ENV) {
                Some(v) if !v.is_empty() => PathBuf::from(v),
                _ => env::current_dir().context("Couldn't determine the current directory")?,
            },
        };
        Ok(Self::new(root))
    }

    pub fn with_task_category(self, task_category: impl Into<String>) -> Self {
        Self {
            task_category: task_category.into(),
            ..self
        }
    }
}
