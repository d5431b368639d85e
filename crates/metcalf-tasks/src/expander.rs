//! Task expansion
//!
//! Turns one task definition into its jobs: resolve every set the task runs
//! over, take the cartesian product, and fill the templates once per
//! combination.

use tracing::{debug, instrument};

use metcalf_core::config::{Config, TaskDefinition};
use metcalf_core::{ConfigError, Result};

use crate::job::{Job, SetCombination};
use crate::sets::{ResolvedSet, SetFilters, SetResolver};

/// Character wrapping a set name inside a template, as in `@env@`
pub const TOKEN_MARKER: char = '@';

/// Expands task definitions from one configuration
#[derive(Debug, Clone, Copy)]
pub struct TaskExpander<'a> {
    config: &'a Config,
    resolver: SetResolver<'a>,
}

impl<'a> TaskExpander<'a> {
    pub fn new(config: &'a Config, filters: &'a SetFilters) -> Self {
        Self {
            config,
            resolver: SetResolver::new(&config.sets, filters),
        }
    }

    /// Expand a task into its jobs, in combination order
    #[instrument(skip(self, task), fields(sets = task.run.len()))]
    pub fn expand(&self, id: &str, task: &TaskDefinition) -> Result<Vec<Job>> {
        let sets = task
            .run
            .iter()
            .map(|set| self.resolver.resolve(id, set, &task.sets))
            .collect::<Result<Vec<_>>>()?;

        let command = task
            .command
            .as_ref()
            .or(self.config.command.as_ref())
            .cloned()
            .ok_or_else(|| ConfigError::MissingField("command".to_string()))?;

        let jobs: Vec<Job> = cartesian_product(&sets)
            .into_iter()
            .map(|combination| Job {
                task: id.to_string(),
                command: command.clone(),
                title: substitute(&task.title, &combination),
                args: task
                    .command_args
                    .iter()
                    .map(|arg| substitute(arg, &combination))
                    .collect(),
                create_dirs: task
                    .create_dirs
                    .iter()
                    .flatten()
                    .map(|dir| substitute(dir, &combination))
                    .collect(),
                combination,
            })
            .collect();

        debug!(task = id, jobs = jobs.len(), "expanded task");
        Ok(jobs)
    }
}

/// Cartesian product of resolved sets.
///
/// The first set is the outermost axis and varies slowest; the last set
/// varies fastest. No sets yield a single empty combination, and any empty
/// set yields no combinations at all.
pub fn cartesian_product(sets: &[ResolvedSet]) -> Vec<SetCombination> {
    sets.iter().fold(vec![SetCombination::new()], |acc, set| {
        acc.iter()
            .flat_map(|prefix| {
                set.values
                    .iter()
                    .map(move |value| prefix.clone().with(set.name.as_str(), value.as_str()))
            })
            .collect()
    })
}

/// Replace every `@set@` token naming a set of `combination` with its value.
///
/// The template is scanned once, left to right, so substituted values are
/// never scanned again. Tokens naming other sets are kept verbatim.
pub fn substitute(template: &str, combination: &SetCombination) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(TOKEN_MARKER) {
        out.push_str(&rest[..start]);
        let after = &rest[start + TOKEN_MARKER.len_utf8()..];

        let token = combination.iter().find_map(|(name, value)| {
            after
                .strip_prefix(name)
                .and_then(|tail| tail.strip_prefix(TOKEN_MARKER))
                .map(|tail| (value, tail))
        });

        match token {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push(TOKEN_MARKER);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
