//! Common utilities for integration tests
//!
//! This module provides cleanup guards and helper functions for integration tests.

use anyhow::Result;
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Helper to check if Docker is available
pub fn is_docker_available() -> bool {
    Command::new("docker")
        .args(["ps"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Guard that ensures Docker container cleanup on drop (even on panic)
pub struct ContainerGuard {
    name: String,
}

impl ContainerGuard {
    pub fn new(name: &str) -> Self {
        cleanup_container(name);
        Self {
            name: name.to_string(),
        }
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        cleanup_container(&self.name);
    }
}

/// Stop and remove a container and its anonymous volumes
fn cleanup_container(name: &str) {
    let _ = Command::new("docker").args(["stop", name]).output();
    let _ = Command::new("docker").args(["rm", "-v", name]).output();
}

/// Start a detached container
pub fn start_container(name: &str, image: &str, env: &[&str]) -> Result<()> {
    let mut cmd = Command::new("docker");
    cmd.args(["run", "-d", "--name", name]);
    for binding in env {
        cmd.args(["-e", binding]);
    }
    let output = cmd.arg(image).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "docker run failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Run a command inside a container, returning trimmed stdout
pub fn exec_in(container: &str, env: &[&str], args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("docker");
    cmd.arg("exec");
    for binding in env {
        cmd.args(["-e", binding]);
    }
    let output = cmd.arg(container).args(args).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Poll `probe` until it succeeds
pub fn wait_until<F>(what: &str, mut probe: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    for _ in 0..60 {
        if probe() {
            return Ok(());
        }
        thread::sleep(Duration::from_secs(1));
    }
    Err(anyhow::anyhow!("{} failed to become ready", what))
}
