use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::{info, instrument};

use crate::fs::operations::{read_optional, replace_file, WriterLock};

use super::{
    entities::{Task, TaskFields},
    parse_document, to_document,
};

/// The strategy task list to merge from doesn't exist.
#[derive(Debug)]
pub struct MissingSourceError {
    pub path: PathBuf,
}

impl Display for MissingSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Strategy task list {:?} doesn't exist", self.path)
    }
}

impl std::error::Error for MissingSourceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Tasks the master list held before the merge, 0 if it didn't exist.
    pub existing: usize,
    pub appended: usize,
    pub total: usize,
}

/// Appends every task of `strategy_path` to the end of `master_path`. The master list is created as
/// a copy of the strategy list when missing. Tasks aren't deduplicated, so merging twice appends
/// the strategy tasks twice.
#[instrument]
pub async fn merge_task_lists(strategy_path: &Path, master_path: &Path) -> Result<MergeReport> {
    let Some(raw_strategy) = read_optional(strategy_path).await? else {
        return Err(MissingSourceError {
            path: strategy_path.to_path_buf(),
        }
        .into());
    };
    let strategy: Vec<Task> = parse_document(strategy_path, &raw_strategy)?;

    let lock = WriterLock::acquire(master_path).await?;
    let result = merge_locked(strategy, master_path).await;
    lock.release().await?;
    let report = result?;

    info!(
        "Merged {} tasks into {master_path:?}, {} in total",
        report.appended, report.total
    );
    Ok(report)
}

async fn merge_locked(strategy: Vec<Task>, master_path: &Path) -> Result<MergeReport> {
    let mut master: Vec<Task> = match read_optional(master_path).await? {
        Some(raw) => parse_document(master_path, &raw)?,
        None => Vec::new(),
    };

    let existing = master.len();
    let appended = strategy.len();
    master.extend(strategy);

    replace_file(master_path, &to_document(&master)?).await?;
    Ok(MergeReport {
        existing,
        appended,
        total: master.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub backlog: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.backlog + self.in_progress + self.done
    }
}

/// Counts tasks whose category contains `category` (ignoring case) by status. Statuses other than
/// `backlog`, `in_progress` and `done` aren't counted.
pub fn count_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, category: &str) -> TaskCounts {
    let category = category.to_lowercase();
    tasks
        .into_iter()
        .filter(|task| {
            task.category()
                .is_some_and(|v| v.to_lowercase().contains(&category))
        })
        .fold(TaskCounts::default(), |mut counts, task| {
            match task.status() {
                Some("backlog") => counts.backlog += 1,
                Some("in_progress") => counts.in_progress += 1,
                Some("done") => counts.done += 1,
                _ => {}
            }
            counts
        })
}

/// Reads the task list at `path` and counts it with [count_tasks]. A missing list counts as empty.
pub async fn load_task_counts(path: &Path, category: &str) -> Result<TaskCounts> {
    let tasks: Vec<Task> = match read_optional(path).await? {
        Some(raw) => parse_document(path, &raw)?,
        None => Vec::new(),
    };
    Ok(count_tasks(&tasks, category))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use anyhow::Result;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use super::{
        count_tasks, load_task_counts, merge_task_lists, MergeReport, MissingSourceError,
        TaskCounts,
    };

    fn write_json(path: &Path, value: Value) -> Result<()> {
        std::fs::write(path, serde_json::to_vec(&value)?)?;
        Ok(())
    }

    fn read_json(path: &Path) -> Result<Value> {
        Ok(serde_json::from_slice(&std::fs::read(path)?)?)
    }

    #[tokio::test]
    async fn test_merge_appends_strategy_after_master() -> Result<()> {
        let dir = tempdir()?;
        let strategy = dir.path().join("strategy.json");
        let master = dir.path().join("tasks.json");
        write_json(&strategy, json!([{ "id": 2 }, { "id": 3 }]))?;
        write_json(&master, json!([{ "id": 1 }]))?;
        let strategy_before = std::fs::read(&strategy)?;

        let report = merge_task_lists(&strategy, &master).await?;

        assert_eq!(
            report,
            MergeReport {
                existing: 1,
                appended: 2,
                total: 3
            }
        );
        assert_eq!(read_json(&master)?, json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));
        assert_eq!(std::fs::read(&strategy)?, strategy_before);
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_twice_duplicates() -> Result<()> {
        let dir = tempdir()?;
        let strategy = dir.path().join("strategy.json");
        let master = dir.path().join("tasks.json");
        write_json(&strategy, json!([{ "id": "a" }, { "id": "b" }]))?;
        write_json(&master, json!([{ "id": "m1" }, { "id": "m2" }, { "id": "m3" }]))?;

        merge_task_lists(&strategy, &master).await?;
        let report = merge_task_lists(&strategy, &master).await?;

        // M + 2S, no deduplication.
        assert_eq!(report.total, 3 + 2 * 2);
        assert_eq!(
            read_json(&master)?,
            json!([
                { "id": "m1" }, { "id": "m2" }, { "id": "m3" },
                { "id": "a" }, { "id": "b" },
                { "id": "a" }, { "id": "b" }
            ])
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_without_master_copies_strategy() -> Result<()> {
        let dir = tempdir()?;
        let strategy = dir.path().join("strategy.json");
        let master = dir.path().join("tasks.json");
        let tasks = json!([{ "id": 7, "title": "Comment on 5 posts", "tags": ["x"] }]);
        write_json(&strategy, tasks.clone())?;

        let report = merge_task_lists(&strategy, &master).await?;

        assert_eq!(report.existing, 0);
        assert_eq!(report.total, 1);
        assert_eq!(read_json(&master)?, tasks);
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_missing_source() -> Result<()> {
        let dir = tempdir()?;
        let strategy = dir.path().join("strategy.json");
        let master = dir.path().join("tasks.json");
        write_json(&master, json!([{ "id": 1 }]))?;
        let master_before = std::fs::read(&master)?;

        let error = merge_task_lists(&strategy, &master).await.unwrap_err();

        let missing = error.downcast_ref::<MissingSourceError>().unwrap();
        assert_eq!(missing.path, strategy);
        assert_eq!(std::fs::read(&master)?, master_before);
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_rejects_non_array() -> Result<()> {
        let dir = tempdir()?;
        let strategy = dir.path().join("strategy.json");
        let master = dir.path().join("tasks.json");
        write_json(&strategy, json!({ "id": 1 }))?;

        assert!(merge_task_lists(&strategy, &master).await.is_err());
        assert!(!master.exists());
        Ok(())
    }

    #[test]
    fn test_count_tasks() {
        let tasks = [
            json!({ "category": "LinkedIn outreach", "status": "backlog" }),
            json!({ "category": "linkedin", "status": "backlog" }),
            json!({ "category": "linkedin-content", "status": "in_progress" }),
            json!({ "category": "linkedin", "status": "done" }),
            json!({ "category": "linkedin", "status": "blocked" }),
            json!({ "category": "newsletter", "status": "done" }),
            json!({ "status": "done" }),
            json!(42),
        ];

        let counts = count_tasks(&tasks, "linkedin");

        assert_eq!(
            counts,
            TaskCounts {
                backlog: 2,
                in_progress: 1,
                done: 1
            }
        );
        assert_eq!(counts.total(), 4);
    }

    #[tokio::test]
    async fn test_load_task_counts_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let counts = load_task_counts(&dir.path().join("tasks.json"), "linkedin").await?;
        assert_eq!(counts, TaskCounts::default());
        Ok(())
    }
}
