//! Configuration types

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Named value sets. Values stay untyped until a task resolves them so that
/// a set which is not an array can be reported against the task using it.
pub type SetMap = HashMap<String, Value>;

/// Main configuration for Metcalf
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Default command for every task that does not declare its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Maximum number of jobs running at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<i64>,

    /// Global value sets
    #[serde(default)]
    pub sets: SetMap,

    /// Task definitions, in file order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TaskMap>,
}

impl Config {
    /// Task definitions in file order, empty if none were declared
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &TaskDefinition)> {
        self.tasks.iter().flat_map(|tasks| tasks.iter())
    }

    /// Find a task definition by id
    pub fn task(&self, id: &str) -> Option<&TaskDefinition> {
        self.tasks.as_ref().and_then(|tasks| tasks.get(id))
    }
}

/// A task: a set of templates expanded once per combination of its sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    /// Set names forming the product axes, outermost first
    #[serde(default)]
    pub run: Vec<String>,

    /// Sets shadowing the global ones for this task
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sets: SetMap,

    /// Command overriding the global default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Job title template
    pub title: String,

    /// Argument templates
    pub command_args: Vec<String>,

    /// Directory templates created before each job is launched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_dirs: Option<Vec<String>>,

    /// Only run when selected explicitly
    #[serde(default)]
    pub manual_only: bool,
}

impl TaskDefinition {
    /// Create a new task definition
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Add a product axis
    pub fn with_run(mut self, set: impl Into<String>) -> Self {
        self.run.push(set.into());
        self
    }

    /// Add an argument template
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.command_args.push(arg.into());
        self
    }

    /// Set the command override
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Add a directory template
    pub fn with_create_dir(mut self, dir: impl Into<String>) -> Self {
        self.create_dirs.get_or_insert_with(Vec::new).push(dir.into());
        self
    }

    /// Mark the task as manual-only
    pub fn manual_only(mut self) -> Self {
        self.manual_only = true;
        self
    }
}

/// Task definitions keyed by id, preserving the order of the config file.
///
/// Queue order follows this order, so a hash map will not do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskMap(Vec<(String, TaskDefinition)>);

impl TaskMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, replacing an existing one with the same id in place
    pub fn insert(&mut self, id: impl Into<String>, task: TaskDefinition) {
        let id = id.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = task,
            None => self.0.push((id, task)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&TaskDefinition> {
        self.0.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskDefinition)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TaskDefinition)> for TaskMap {
    fn from_iter<I: IntoIterator<Item = (String, TaskDefinition)>>(iter: I) -> Self {
        let mut map = TaskMap::new();
        for (id, task) in iter {
            map.insert(id, task);
        }
        map
    }
}

impl Serialize for TaskMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, task) in &self.0 {
            map.serialize_entry(id, task)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaskMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TaskMapVisitor;

        impl<'de> Visitor<'de> for TaskMapVisitor {
            type Value = TaskMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of task IDs to task definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TaskMap, A::Error> {
                let mut tasks = TaskMap::new();
                while let Some((id, task)) = access.next_entry::<String, TaskDefinition>()? {
                    tasks.insert(id, task);
                }
                Ok(tasks)
            }
        }

        deserializer.deserialize_map(TaskMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_map_preserves_file_order() {
        let config: Config = serde_json::from_str(
            r#"{
                "command": "make",
                "tasks": {
                    "zeta": { "title": "z", "commandArgs": [] },
                    "alpha": { "title": "a", "commandArgs": [] },
                    "mid": { "title": "m", "commandArgs": [] }
                }
            }"#,
        )
        .unwrap();

        let ids: Vec<_> = config.tasks().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_camel_case_fields() {
        let task: TaskDefinition = serde_json::from_value(json!({
            "run": ["env"],
            "title": "build @env@",
            "commandArgs": ["--env", "@env@"],
            "createDirs": ["out/@env@"],
            "manualOnly": true
        }))
        .unwrap();

        assert_eq!(task.run, vec!["env"]);
        assert_eq!(task.command_args, vec!["--env", "@env@"]);
        assert_eq!(task.create_dirs, Some(vec!["out/@env@".to_string()]));
        assert!(task.manual_only);
        assert!(task.command.is_none());
    }

    #[test]
    fn test_max_workers_field() {
        let config: Config =
            serde_json::from_value(json!({ "command": "make", "maxWorkers": 3 })).unwrap();
        assert_eq!(config.max_workers, Some(3));
        assert!(config.tasks.is_none());
    }

    #[test]
    fn test_task_definition_builder() {
        let task = TaskDefinition::new("deploy @env@")
            .with_run("env")
            .with_arg("@env@")
            .with_create_dir("logs/@env@")
            .manual_only();

        assert_eq!(task.title, "deploy @env@");
        assert_eq!(task.command_args, vec!["@env@"]);
        assert_eq!(task.create_dirs, Some(vec!["logs/@env@".to_string()]));
        assert!(task.manual_only);
    }

    #[test]
    fn test_task_map_insert_replaces_in_place() {
        let mut tasks = TaskMap::new();
        tasks.insert("a", TaskDefinition::new("first"));
        tasks.insert("b", TaskDefinition::new("second"));
        tasks.insert("a", TaskDefinition::new("replaced"));

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(tasks.get("a").unwrap().title, "replaced");
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let mut tasks = TaskMap::new();
        tasks.insert("build", TaskDefinition::new("build").with_arg("all"));
        let config = Config {
            command: Some("make".to_string()),
            tasks: Some(tasks),
            ..Default::default()
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.tasks, config.tasks);
    }
}
