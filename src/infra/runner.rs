// ABOUTME: Subprocess seam for the IaC engine.
// ABOUTME: The controller builds invocations; a runner executes them and reports the raw result.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// How the engine's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Output captured for later display; stdin closed.
    Captured,
    /// Output streamed to the terminal as it arrives; stdin closed.
    Passthrough,
    /// All streams attached to the terminal so the engine can prompt.
    Interactive,
}

/// One engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub stdio: StdioMode,
}

impl Invocation {
    /// Command line as a single string, for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Raw result of one engine call. Interpreting the exit code is the
/// controller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfraCommandResult {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl InfraCommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes engine invocations.
///
/// Errors are spawn failures only; a non-zero exit is a normal result.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<InfraCommandResult>;
}

/// Runs the engine as a child process with tokio.
///
/// Once spawned, the child runs to completion; the engine owns its own
/// interrupt handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<InfraCommandResult> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).current_dir(&invocation.cwd);

        match invocation.stdio {
            StdioMode::Captured => {
                command
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
            StdioMode::Passthrough => {
                command
                    .stdin(Stdio::null())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            StdioMode::Interactive => {
                command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
        }

        let output = command.output().await?;

        Ok(InfraCommandResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
