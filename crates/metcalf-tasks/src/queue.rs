//! Queue construction

use tracing::{debug, info, instrument, warn};

use metcalf_core::config::{Config, TaskDefinition};
use metcalf_core::Result;

use crate::expander::TaskExpander;
use crate::job::Job;
use crate::sets::SetFilters;

/// Which tasks, and which set values, make it into the queue
#[derive(Debug, Clone, Default)]
pub struct QueueSelection {
    /// Explicit task ids. When given, exactly these tasks run, manual-only
    /// ones included.
    pub tasks: Option<Vec<String>>,
    /// Value filters per set name
    pub filters: SetFilters,
}

impl QueueSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(mut self, tasks: &[&str]) -> Self {
        self.tasks = Some(tasks.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_filters(mut self, filters: SetFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Whether a task takes part in the run
    pub fn includes(&self, id: &str, task: &TaskDefinition) -> bool {
        match &self.tasks {
            Some(selected) => selected.iter().any(|s| s == id),
            None => !task.manual_only,
        }
    }
}

/// Build the run queue: every included task in config order, each expanded
/// in combination order.
///
/// Any configuration error aborts the whole build, so either every job is
/// valid or none is returned.
#[instrument(skip_all, fields(tasks = config.tasks().count()))]
pub fn build_queue(config: &Config, selection: &QueueSelection) -> Result<Vec<Job>> {
    if let Some(selected) = &selection.tasks {
        for id in selected {
            if config.task(id).is_none() {
                warn!(task = %id, "selected task is not defined in the configuration");
            }
        }
    }

    let expander = TaskExpander::new(config, &selection.filters);
    let mut queue = Vec::new();

    for (id, task) in config.tasks() {
        if !selection.includes(id, task) {
            debug!(task = id, manual_only = task.manual_only, "skipping task");
            continue;
        }
        queue.extend(expander.expand(id, task)?);
    }

    info!(jobs = queue.len(), "queue built");
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metcalf_core::config::TaskMap;
    use serde_json::json;

    fn config() -> Config {
        let mut tasks = TaskMap::new();
        tasks.insert(
            "build",
            TaskDefinition::new("build @os@")
                .with_run("os")
                .with_arg("@os@"),
        );
        tasks.insert(
            "release",
            TaskDefinition::new("release @os@")
                .with_run("os")
                .manual_only(),
        );
        tasks.insert(
            "docs",
            TaskDefinition::new("docs").with_command("mdbook"),
        );

        let mut config = Config {
            command: Some("make".to_string()),
            tasks: Some(tasks),
            ..Default::default()
        };
        config.sets.insert("os".to_string(), json!(["linux", "macos"]));
        config
    }

    fn titles(queue: &[Job]) -> Vec<&str> {
        queue.iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn test_default_selection_skips_manual_tasks() {
        let queue = build_queue(&config(), &QueueSelection::new()).unwrap();
        assert_eq!(titles(&queue), vec!["build linux", "build macos", "docs"]);
    }

    #[test]
    fn test_explicit_selection_includes_manual_task() {
        let selection = QueueSelection::new().with_tasks(&["release"]);
        let queue = build_queue(&config(), &selection).unwrap();
        assert_eq!(titles(&queue), vec!["release linux", "release macos"]);
    }

    #[test]
    fn test_selection_keeps_config_order() {
        let selection = QueueSelection::new().with_tasks(&["docs", "build"]);
        let queue = build_queue(&config(), &selection).unwrap();
        assert_eq!(titles(&queue), vec!["build linux", "build macos", "docs"]);
    }

    #[test]
    fn test_unknown_selected_task_is_ignored() {
        let selection = QueueSelection::new().with_tasks(&["nope"]);
        let queue = build_queue(&config(), &selection).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_filters_apply_across_tasks() {
        let selection =
            QueueSelection::new().with_filters(SetFilters::new().with("os", &["macos"]));
        let queue = build_queue(&config(), &selection).unwrap();
        assert_eq!(titles(&queue), vec!["build macos", "docs"]);
    }

    #[test]
    fn test_invalid_filter_yields_no_queue() {
        let selection =
            QueueSelection::new().with_filters(SetFilters::new().with("os", &["qa"]));
        assert!(build_queue(&config(), &selection).is_err());
    }

    #[test]
    fn test_error_in_later_task_aborts_build() {
        let mut config = config();
        config
            .tasks
            .as_mut()
            .unwrap()
            .insert("broken", TaskDefinition::new("x").with_run("missing"));

        assert!(build_queue(&config, &QueueSelection::new()).is_err());
    }

    #[test]
    fn test_excluded_task_is_not_validated() {
        let mut config = config();
        config.tasks.as_mut().unwrap().insert(
            "broken",
            TaskDefinition::new("x").with_run("missing").manual_only(),
        );

        let queue = build_queue(&config, &QueueSelection::new()).unwrap();
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_task_command_override() {
        let queue = build_queue(&config(), &QueueSelection::new()).unwrap();
        assert_eq!(queue[0].command, "make");
        assert_eq!(queue[2].command, "mdbook");
    }
}
