//! Command execution abstraction for testability
//!
//! This module provides a trait-based abstraction for command execution,
//! enabling dependency injection and mocking for tests.

use super::command::{CommandOutput, CommandSpec};
use crate::error::Result;

/// Abstraction for command execution, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor: Send + Sync {
    /// Run one external command to completion
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        super::command::run_command(command)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub env: Vec<(String, String)>,
        pub stdin: Option<String>,
        pub stdout: Option<String>,
    }

    impl CommandCall {
        /// The tool that actually ran, looking through `docker exec`
        pub fn tool(&self) -> &str {
            if self.program != "docker" || self.args.first().map(String::as_str) != Some("exec") {
                return &self.program;
            }

            let mut rest = self.args.iter().skip(1);
            let mut container_seen = false;
            while let Some(arg) = rest.next() {
                if arg == "-e" {
                    rest.next();
                    continue;
                }
                if arg.starts_with('-') {
                    continue;
                }
                if container_seen {
                    return arg;
                }
                container_seen = true;
            }
            &self.program
        }

        /// Whether `docker exec` wraps this call
        pub fn in_container(&self) -> bool {
            self.program == "docker" && self.args.first().map(String::as_str) == Some("exec")
        }

        /// Full command line, for substring assertions
        pub fn line(&self) -> String {
            std::iter::once(self.program.as_str())
                .chain(self.args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ")
        }

        pub fn has_arg(&self, arg: &str) -> bool {
            self.args.iter().any(|a| a == arg)
        }

        /// Value following a flag such as `-f`
        pub fn arg_after(&self, flag: &str) -> Option<&str> {
            self.args
                .iter()
                .position(|a| a == flag)
                .and_then(|i| self.args.get(i + 1))
                .map(String::as_str)
        }
    }

    /// Response configuration for mock
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String, stderr: String },
        Failure { stderr: String, exit_code: i32 },
        Timeout,
    }

    impl MockResponse {
        pub fn stdout(stdout: &str) -> Self {
            MockResponse::Success {
                stdout: stdout.to_string(),
                stderr: String::new(),
            }
        }

        pub fn failure(stderr: &str, exit_code: i32) -> Self {
            MockResponse::Failure {
                stderr: stderr.to_string(),
                exit_code,
            }
        }
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    /// Mock executor for testing
    ///
    /// Successful dump-producing calls also create their output files, so
    /// backup flows leave artifacts on disk the way the real tools do.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        /// Pre-configured responses: tool name -> queued responses
        responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
        /// Default response when no specific response is configured
        default_response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a response for a specific tool
        ///
        /// Repeated calls queue responses; the last one keeps answering.
        pub fn expect(self, tool: &str, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .entry(tool.to_string())
                .or_default()
                .push_back(response);
            self
        }

        /// Set the default response for unconfigured tools
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Calls whose tool matches
        pub fn calls_to(&self, tool: &str) -> Vec<CommandCall> {
            self.get_calls()
                .into_iter()
                .filter(|c| c.tool() == tool)
                .collect()
        }

        /// Check if a tool was called
        pub fn was_called(&self, tool: &str) -> bool {
            self.call_count(tool) > 0
        }

        /// Get number of calls to a specific tool
        pub fn call_count(&self, tool: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.tool() == tool)
                .count()
        }

        /// Index of the first call whose command line contains `needle`
        pub fn position(&self, needle: &str) -> Option<usize> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .position(|c| c.line().contains(needle))
        }

        fn record_call(&self, command: &CommandSpec) -> CommandCall {
            let call = CommandCall {
                program: command.program.clone(),
                args: command.args.clone(),
                env: command.env.clone(),
                stdin: command.stdin.as_ref().map(|p| p.display().to_string()),
                stdout: command.stdout.as_ref().map(|p| p.display().to_string()),
            };
            self.calls.lock().unwrap().push(call.clone());
            call
        }

        fn get_response(&self, tool: &str) -> MockResponse {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(tool) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
                Some(queue) if !queue.is_empty() => queue[0].clone(),
                _ => self.default_response.lock().unwrap().clone(),
            }
        }

        /// Create the files a real tool would have written
        fn simulate_outputs(&self, call: &CommandCall, stdout: &str) -> Result<()> {
            if let Some(ref path) = call.stdout {
                fs::write(path, stdout)?;
            }

            if call.tool() == "pg_dump" && !call.in_container() {
                if let Some(path) = call.arg_after("-f") {
                    fs::write(path, "-- mock dump\n")?;
                }
            }

            if call.program == "docker" && call.args.first().map(String::as_str) == Some("cp") {
                if let Some(dest) = call.args.get(2) {
                    if !dest.contains(':') {
                        if let Some(parent) = Path::new(dest).parent() {
                            fs::create_dir_all(parent)?;
                        }
                        fs::write(dest, "-- mock dump\n")?;
                    }
                }
            }

            Ok(())
        }

        /// A failing tool still truncates its redirect target, and
        /// `pg_dump -f` may have written part of the file
        fn simulate_leftovers(&self, call: &CommandCall) -> Result<()> {
            if let Some(ref path) = call.stdout {
                fs::write(path, "")?;
            }
            if call.tool() == "pg_dump" && !call.in_container() {
                if let Some(path) = call.arg_after("-f") {
                    fs::write(path, "-- partial\n")?;
                }
            }
            Ok(())
        }

        fn execute_response(
            &self,
            command: &CommandSpec,
            call: &CommandCall,
            response: MockResponse,
        ) -> Result<CommandOutput> {
            match response {
                MockResponse::Success { stdout, stderr } => {
                    self.simulate_outputs(call, &stdout)?;
                    let captured = if call.stdout.is_some() { String::new() } else { stdout };
                    Ok(CommandOutput {
                        stdout: captured,
                        stderr,
                        exit_code: 0,
                    })
                }
                MockResponse::Failure { stderr, exit_code } => {
                    self.simulate_leftovers(call)?;
                    Err(command.failed(Some(exit_code), stderr))
                }
                MockResponse::Timeout => Err(command.failed(None, "timed out")),
            }
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
            let call = self.record_call(command);
            let response = self.get_response(call.tool());
            self.execute_response(command, &call, response)
        }
    }
}
