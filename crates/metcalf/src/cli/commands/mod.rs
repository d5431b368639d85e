//! CLI commands

mod init;
mod list;
mod run;

pub use init::InitCommand;
pub use list::ListCommand;
pub use run::RunCommand;

use clap::Args;

use metcalf_tasks::{QueueSelection, SetFilters};

/// Which tasks and set values to queue
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Only queue these task ids, manual-only tasks included
    #[arg(long, value_delimiter = ',', value_name = "ID,...")]
    pub tasks: Option<Vec<String>>,

    /// Restrict a set to some of its values (can be repeated)
    #[arg(long = "set", value_name = "NAME=VALUE,...", value_parser = parse_set_filter)]
    pub sets: Vec<(String, Vec<String>)>,
}

impl SelectionArgs {
    /// Build the queue selection; repeated sets accumulate their values
    pub fn to_selection(&self) -> QueueSelection {
        let mut merged: Vec<(String, Vec<String>)> = Vec::new();
        for (name, values) in &self.sets {
            match merged.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, existing)) => existing.extend(values.iter().cloned()),
                None => merged.push((name.clone(), values.clone())),
            }
        }

        QueueSelection {
            tasks: self.tasks.clone(),
            filters: merged.into_iter().collect::<SetFilters>(),
        }
    }
}

/// Parse `name=v1,v2` into a set name and its values
fn parse_set_filter(raw: &str) -> Result<(String, Vec<String>), String> {
    let (name, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE,... but got `{}`", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing set name in `{}`", raw));
    }

    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    if values.is_empty() {
        return Err(format!("no values given for set `{}`", name));
    }

    Ok((name.to_string(), values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_filter() {
        assert_eq!(
            parse_set_filter("env=prod, dev").unwrap(),
            ("env".to_string(), vec!["prod".to_string(), "dev".to_string()])
        );
        assert_eq!(
            parse_set_filter("arch=x64").unwrap(),
            ("arch".to_string(), vec!["x64".to_string()])
        );
    }

    #[test]
    fn test_parse_set_filter_errors() {
        assert!(parse_set_filter("env").is_err());
        assert!(parse_set_filter("=prod").is_err());
        assert!(parse_set_filter("env=").is_err());
        assert!(parse_set_filter("env=,,").is_err());
    }

    #[test]
    fn test_repeated_sets_accumulate() {
        let args = SelectionArgs {
            tasks: None,
            sets: vec![
                ("env".to_string(), vec!["prod".to_string()]),
                ("os".to_string(), vec!["linux".to_string()]),
                ("env".to_string(), vec!["dev".to_string()]),
            ],
        };

        let selection = args.to_selection();
        assert_eq!(
            selection.filters.get("env"),
            Some(&["prod".to_string(), "dev".to_string()][..])
        );
        assert_eq!(selection.filters.get("os"), Some(&["linux".to_string()][..]));
        assert!(selection.tasks.is_none());
    }
}
