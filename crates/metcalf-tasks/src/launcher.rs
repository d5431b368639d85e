//! Process launching

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::job::Job;

/// Starts a job's process and reports how it exited
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run `command` with the job's arguments to completion.
    ///
    /// Returns the exit code, or an error if the process could not be started.
    async fn launch(&self, command: &str, job: &Job) -> std::io::Result<i32>;
}

/// Launches jobs as child processes of the current process
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    root_dir: PathBuf,
}

impl CommandLauncher {
    /// Launch processes with `root_dir` as their working directory
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }
}

#[async_trait]
impl ProcessLauncher for CommandLauncher {
    async fn launch(&self, command: &str, job: &Job) -> std::io::Result<i32> {
        let mut child = Command::new(command)
            .args(&job.args)
            .current_dir(&self.root_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes must be drained concurrently or the child can stall on a full one.
        tokio::join!(
            forward_lines(&job.title, stdout, false),
            forward_lines(&job.title, stderr, true)
        );

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Forward a child's output to the debug log, line by line.
///
/// Reads until EOF whatever the bytes are; closing the pipe early would
/// kill a child that is still writing.
async fn forward_lines<R>(title: &str, pipe: Option<R>, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else {
        return;
    };

    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                debug!(job = title, stderr = is_stderr, "{}", line.trim_end());
            }
            Err(e) => {
                debug!(job = title, stderr = is_stderr, error = %e, "output pipe failed");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::job::SetCombination;

    fn job(args: &[&str]) -> Job {
        Job {
            task: "test".to_string(),
            command: "sh".to_string(),
            title: "test job".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            create_dirs: Vec::new(),
            combination: SetCombination::new(),
        }
    }

    #[tokio::test]
    async fn test_successful_exit() {
        let launcher = CommandLauncher::new(std::env::temp_dir());
        let code = launcher.launch("sh", &job(&["-c", "echo hello"])).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_nonzero_exit() {
        let launcher = CommandLauncher::new(std::env::temp_dir());
        let code = launcher
            .launch("sh", &job(&["-c", "echo oops >&2; exit 3"]))
            .await
            .unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn test_non_utf8_output_is_drained() {
        let launcher = CommandLauncher::new(std::env::temp_dir());
        let script = "printf '\\377\\n'; i=0; while [ $i -lt 20000 ]; do echo line $i; i=$((i+1)); done; exit 0";
        let code = launcher.launch("sh", &job(&["-c", script])).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_runs_in_root_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let launcher = CommandLauncher::new(temp.path());
        let code = launcher
            .launch("sh", &job(&["-c", "touch marker"]))
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert!(temp.path().join("marker").exists());
    }

    #[tokio::test]
    async fn test_missing_command_is_an_error() {
        let launcher = CommandLauncher::new(std::env::temp_dir());
        let result = launcher
            .launch("metcalf-no-such-command", &job(&[]))
            .await;
        assert!(result.is_err());
    }
}
