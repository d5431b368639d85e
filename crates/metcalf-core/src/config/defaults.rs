//! Default configuration values

/// Default configuration file name (JSON)
pub const DEFAULT_CONFIG_JSON: &str = "Metcalf.json";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "Metcalf.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "Metcalf.toml";

/// Worker count used when neither the command line nor the config sets one
pub const DEFAULT_MAX_WORKERS: usize = 1;

/// Get list of config file names to search for, in order of preference
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_JSON,
        DEFAULT_CONFIG_YAML,
        "Metcalf.yml",
        DEFAULT_CONFIG_TOML,
    ]
}

/// Starter configuration written by `metcalf init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"{
  "command": "echo",
  "maxWorkers": 2,
  "sets": {
    "platform": ["linux", "windows"],
    "profile": ["debug", "release"]
  },
  "tasks": {
    "build": {
      "run": ["platform", "profile"],
      "title": "build @platform@ (@profile@)",
      "commandArgs": ["building", "@platform@", "@profile@"],
      "createDirs": ["dist/@platform@/@profile@"]
    },
    "package": {
      "run": ["platform"],
      "manualOnly": true,
      "title": "package @platform@",
      "commandArgs": ["packaging", "@platform@"]
    }
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_template_parses() {
        let config: Config = serde_json::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.command.as_deref(), Some("echo"));
        assert_eq!(config.tasks().count(), 2);
        assert!(config.task("package").unwrap().manual_only);
    }

    #[test]
    fn test_json_preferred() {
        assert_eq!(config_file_names()[0], DEFAULT_CONFIG_JSON);
    }
}
