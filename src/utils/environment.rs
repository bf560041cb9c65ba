//! Host vs. container command execution
//!
//! Every dump and restore tool runs through an [`ExecContext`]. On the host
//! the tool is spawned directly; for a container target it goes through
//! `docker exec`, and files cross the boundary with `docker cp`.

use super::command::{shell_join, shell_quote, CommandOutput, CommandSpec};
use super::executor::CommandExecutor;
use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const PARTIAL_SUFFIX: &str = ".partial";

/// Where a target's commands run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Host,
    Container(String),
}

impl Environment {
    pub fn from_container(container: Option<&str>) -> Self {
        match container {
            Some(name) => Environment::Container(name.to_string()),
            None => Environment::Host,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Environment::Container(_))
    }
}

/// Temporary path inside a container, unique to this process
pub fn remote_temp_path(file_name: &str) -> String {
    format!("/tmp/db-backup-manager-{}-{}", std::process::id(), file_name)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string())
}

/// Sibling of `local` a dump is written to before it is complete
///
/// The suffix keeps it out of artifact listings and the dedup guard.
pub fn partial_path(local: &Path) -> PathBuf {
    local.with_file_name(format!("{}{}", file_name_of(local), PARTIAL_SUFFIX))
}

/// Move a finished dump into place, or drop what a failed one left behind
fn commit_partial(partial: &Path, local: &Path, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => {
            fs::rename(partial, local)?;
            Ok(())
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(partial) {
                if remove_err.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove incomplete dump {:?}: {}", partial, remove_err);
                }
            }
            Err(e)
        }
    }
}

/// Runs commands for one target in its environment
pub struct ExecContext<'a> {
    executor: &'a dyn CommandExecutor,
    environment: Environment,
    timeout: Option<Duration>,
}

impl<'a> ExecContext<'a> {
    pub fn new(
        executor: &'a dyn CommandExecutor,
        environment: Environment,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            executor,
            environment,
            timeout,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn is_container(&self) -> bool {
        self.environment.is_container()
    }

    /// Wrap a command so it runs in this environment
    ///
    /// In a container the environment is forwarded as `-e NAME` bindings and
    /// the values ride on the docker client process, never on argv.
    fn wrap(&self, program: &str, args: &[String], env: &[(&str, &str)]) -> CommandSpec {
        let spec = match self.environment {
            Environment::Host => CommandSpec::new(program).args(args.iter().cloned()),
            Environment::Container(ref container) => {
                let mut spec = CommandSpec::new("docker").arg("exec");
                for (key, _) in env {
                    spec = spec.arg("-e").arg(*key);
                }
                spec.arg(container.as_str())
                    .arg(program)
                    .args(args.iter().cloned())
            }
        };

        env.iter()
            .fold(spec, |spec, (key, value)| spec.env(*key, *value))
            .timeout(self.timeout)
    }

    /// Run a command and capture its output
    pub fn run(&self, program: &str, args: &[String], env: &[(&str, &str)]) -> Result<CommandOutput> {
        let spec = self.wrap(program, args, env);
        self.executor.run(&spec)
    }

    /// Run a shell script with `sh -c` in this environment
    fn run_shell(&self, script: String, env: &[(&str, &str)]) -> Result<CommandOutput> {
        self.run("sh", &["-c".to_string(), script], env)
    }

    /// Copy a local file into the container; returns the path the tool should read
    pub fn stage_in(&self, local: &Path) -> Result<String> {
        match self.environment {
            Environment::Host => Ok(local.display().to_string()),
            Environment::Container(ref container) => {
                let remote = remote_temp_path(&file_name_of(local));
                let spec = CommandSpec::new("docker")
                    .arg("cp")
                    .arg(local.display().to_string())
                    .arg(format!("{}:{}", container, remote))
                    .timeout(self.timeout);
                self.executor.run(&spec)?;
                debug!("Staged {:?} into {}:{}", local, container, remote);
                Ok(remote)
            }
        }
    }

    /// Copy a file produced in the container back to the host
    pub fn stage_out(&self, remote: &str, local: &Path) -> Result<()> {
        match self.environment {
            Environment::Host => {
                if Path::new(remote) != local {
                    fs::copy(remote, local)?;
                }
                Ok(())
            }
            Environment::Container(ref container) => {
                let spec = CommandSpec::new("docker")
                    .arg("cp")
                    .arg(format!("{}:{}", container, remote))
                    .arg(local.display().to_string())
                    .timeout(self.timeout);
                self.executor.run(&spec)?;
                debug!("Staged {}:{} out to {:?}", container, remote, local);
                Ok(())
            }
        }
    }

    /// Best-effort removal of a staged file; failures are only logged
    pub fn cleanup(&self, remote: &str) {
        if let Environment::Container(ref container) = self.environment {
            let args = vec!["-f".to_string(), remote.to_string()];
            if let Err(e) = self.run("rm", &args, &[]) {
                warn!(
                    "Failed to remove staged file {}:{}: {}",
                    container, remote, e
                );
            }
        }
    }

    /// Run a tool that writes its output to a path argument
    ///
    /// `build_args` receives the path the tool must write to.
    pub fn write_file<F>(
        &self,
        local: &Path,
        program: &str,
        env: &[(&str, &str)],
        build_args: F,
    ) -> Result<()>
    where
        F: Fn(&str) -> Vec<String>,
    {
        let partial = partial_path(local);
        let result = if !self.is_container() {
            let args = build_args(&partial.display().to_string());
            self.run(program, &args, env).map(|_| ())
        } else {
            let remote = remote_temp_path(&file_name_of(local));
            let result = self
                .run(program, &build_args(&remote), env)
                .and_then(|_| self.stage_out(&remote, &partial));
            self.cleanup(&remote);
            result
        };
        commit_partial(&partial, local, result)
    }

    /// Run a tool that writes its output to stdout, landing it in `local`
    pub fn write_stdout(
        &self,
        local: &Path,
        program: &str,
        args: &[String],
        env: &[(&str, &str)],
    ) -> Result<()> {
        let partial = partial_path(local);
        let result = if !self.is_container() {
            let spec = self.wrap(program, args, env).stdout_to(partial.clone());
            self.executor.run(&spec).map(|_| ())
        } else {
            let remote = remote_temp_path(&file_name_of(local));
            let script = format!("{} > {}", shell_join(program, args), shell_quote(&remote));
            let result = self
                .run_shell(script, env)
                .and_then(|_| self.stage_out(&remote, &partial));
            self.cleanup(&remote);
            result
        };
        commit_partial(&partial, local, result)
    }

    /// Run a tool that reads `local` through a path argument
    pub fn read_file<F>(
        &self,
        local: &Path,
        program: &str,
        env: &[(&str, &str)],
        build_args: F,
    ) -> Result<CommandOutput>
    where
        F: Fn(&str) -> Vec<String>,
    {
        let path = self.stage_in(local)?;
        let result = self.run(program, &build_args(&path), env);
        self.cleanup(&path);
        result
    }

    /// Run a tool that reads `local` on stdin
    pub fn read_stdin(
        &self,
        local: &Path,
        program: &str,
        args: &[String],
        env: &[(&str, &str)],
    ) -> Result<CommandOutput> {
        if !self.is_container() {
            let spec = self.wrap(program, args, env).stdin_from(PathBuf::from(local));
            return self.executor.run(&spec);
        }

        let remote = self.stage_in(local)?;
        let script = format!("{} < {}", shell_join(program, args), shell_quote(&remote));
        let result = self.run_shell(script, env);
        self.cleanup(&remote);
        result
    }
}
