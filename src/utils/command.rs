//! Utilities for running commands with proper error handling and timeouts

use crate::error::{DumpError, Result};
use std::fs::File;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, error};

/// One external process invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for the child; values are never logged
    pub env: Vec<(String, String)>,
    /// Feed this file to the child's stdin
    pub stdin: Option<PathBuf>,
    /// Write the child's stdout into this file instead of capturing it
    pub stdout: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
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

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Some(ref path) = self.stdin {
            line.push_str(&format!(" < {}", path.display()));
        }
        if let Some(ref path) = self.stdout {
            line.push_str(&format!(" > {}", path.display()));
        }
        line
    }

    /// Build the error for a non-zero exit
    pub fn failed(&self, exit_code: Option<i32>, stderr: impl Into<String>) -> DumpError {
        DumpError::CommandFailed {
            command: self.display(),
            exit_code,
            stderr: stderr.into(),
        }
    }
}

/// Captured result of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run a command, failing with `CommandFailed` on non-zero exit or timeout
pub fn run_command(spec: &CommandSpec) -> Result<CommandOutput> {
    let mut cmd = std::process::Command::new(&spec.program);
    cmd.args(&spec.args);
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    match spec.stdin {
        Some(ref path) => {
            cmd.stdin(Stdio::from(File::open(path)?));
        }
        None => {
            cmd.stdin(Stdio::null());
        }
    }

    match spec.stdout {
        Some(ref path) => {
            cmd.stdout(Stdio::from(File::create(path)?));
        }
        None => {
            cmd.stdout(Stdio::piped());
        }
    }
    cmd.stderr(Stdio::piped());

    debug!("Running command: {}", spec.display());

    let mut cmd = tokio::process::Command::from(cmd);
    cmd.kill_on_drop(true);

    // Each call drives its own runtime; callers are synchronous
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let output: std::io::Result<Option<std::process::Output>> = runtime.block_on(async {
        let child = cmd.spawn()?;
        match spec.timeout {
            Some(timeout_duration) => {
                match tokio::time::timeout(timeout_duration, child.wait_with_output()).await {
                    Ok(output) => output.map(Some),
                    Err(_) => Ok(None),
                }
            }
            None => child.wait_with_output().await.map(Some),
        }
    });

    let output = match output? {
        Some(output) => output,
        None => {
            let timeout = spec.timeout.unwrap_or_default();
            error!("Command timed out after {:?}: {}", timeout, spec.display());
            return Err(spec.failed(None, format!("timed out after {:?}", timeout)));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        error!("Command failed: {}", spec.display());
        error!("Stderr: {}", stderr);
        return Err(spec.failed(output.status.code(), stderr));
    }

    if !stdout.is_empty() {
        debug!("Command output: {}", stdout.trim_end());
    }

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: output.status.code().unwrap_or(0),
    })
}

/// Quote a string for `sh -c`
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r#"'\''"#))
    }
}

/// Join a program and its arguments into one shell-safe fragment
pub fn shell_join(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}
