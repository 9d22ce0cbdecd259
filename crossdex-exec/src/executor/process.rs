use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// How an invocation's env overlay combines with the parent environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvMode {
    /// Overlay entries are merged over the inherited environment.
    #[default]
    Inherit,
    /// The child sees only the overlay entries.
    Replace,
}

/// Everything needed to spawn one external tool run.
#[derive(Debug, Clone)]
pub struct ProcessInvocation {
    /// Human-readable handle used in events and failure reports.
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub env_mode: EnvMode,
    /// Bytes written to the child's stdin; stdin is closed when `None`.
    pub stdin: Option<Vec<u8>>,
    /// Kill the child and fail the invocation once this much time passes.
    pub timeout: Option<Duration>,
}

impl ProcessInvocation {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            env_mode: EnvMode::Inherit,
            stdin: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn env_mode(mut self, mode: EnvMode) -> Self {
        self.env_mode = mode;
        self
    }

    pub fn stdin_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.stdin = Some(bytes);
        self
    }

    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// The invocation rendered as a single line for reports and errors.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Exit status and captured streams of a finished child.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code; `None` when the child was killed by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error while running {command_line}: {source}")]
    Io {
        command_line: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command timed out after {timeout:?}: {command_line}")]
    Timeout {
        command_line: String,
        timeout: Duration,
    },
    #[error("command failed ({}): {command_line}", exit_label(*status))]
    Failed {
        command_line: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl ProcessError {
    /// Full failure report for operator output: the command line plus the
    /// child's captured streams when it produced any.
    pub fn detail(&self) -> String {
        match self {
            ProcessError::Failed {
                command_line,
                status,
                stdout,
                stderr,
            } => {
                let mut out = format!(
                    "failed to execute: \"{command_line}\" ({})",
                    exit_label(*status)
                );
                if !stdout.trim().is_empty() {
                    out.push_str("\n\n=== STDOUT ===\n");
                    out.push_str(stdout.trim_end());
                }
                if !stderr.trim().is_empty() {
                    out.push_str("\n\n=== STDERR ===\n");
                    out.push_str(stderr.trim_end());
                }
                out
            }
            other => other.to_string(),
        }
    }
}

fn exit_label(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}

/// The boundary everything external sits behind. Implementations run one
/// invocation to completion and capture both output streams.
///
/// A non-zero exit is data, not an error, at this level; callers that treat
/// it as fatal go through [`run_checked`].
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    async fn run(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ProcessError>;
}

/// Spawns real child processes on the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutor;

#[async_trait]
impl ProcessExecutor for TokioExecutor {
    async fn run(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ProcessError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        if invocation.env_mode == EnvMode::Replace {
            command.env_clear();
        }
        command.envs(&invocation.env);
        command.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        // A timed-out child must not outlive the await that abandoned it.
        command.kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: invocation.program.display().to_string(),
            source,
        })?;

        if let Some(bytes) = invocation.stdin.clone() {
            if let Some(mut stdin) = child.stdin.take() {
                // Feed stdin alongside the wait; a child that exits early
                // just breaks the pipe and its exit status tells the story.
                tokio::spawn(async move {
                    let _ = stdin.write_all(&bytes).await;
                    let _ = stdin.shutdown().await;
                });
            }
        }

        let wait = child.wait_with_output();
        let output = match invocation.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(done) => done,
                Err(_) => {
                    return Err(ProcessError::Timeout {
                        command_line: invocation.command_line(),
                        timeout: limit,
                    })
                }
            },
            None => wait.await,
        }
        .map_err(|source| ProcessError::Io {
            command_line: invocation.command_line(),
            source,
        })?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Runs the invocation and lifts a non-zero exit into
/// [`ProcessError::Failed`], carrying the command line and both captured
/// streams. There is no retry here; callers decide what a failure means.
pub async fn run_checked(
    executor: &dyn ProcessExecutor,
    invocation: &ProcessInvocation,
) -> Result<ProcessOutput, ProcessError> {
    let output = executor.run(invocation).await?;
    if output.success() {
        return Ok(output);
    }
    Err(ProcessError::Failed {
        command_line: invocation.command_line(),
        status: output.status,
        stdout: output.stdout_lossy(),
        stderr: output.stderr_lossy(),
    })
}
