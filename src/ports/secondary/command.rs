/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::domain::CommandError;
use async_trait::async_trait;
use std::time::Duration;

/// Represents a system command to be executed
#[derive(Debug, Clone)]
pub struct SystemCommand {
    /// Command program name
    pub program: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Execution timeout
    pub timeout: Option<Duration>,
    /// Whether to use sudo for privilege escalation
    pub use_sudo: bool,
}

impl SystemCommand {
    /// Create a new system command
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            timeout: None,
            use_sudo: false,
        }
    }

    /// Add arguments to the command
    pub fn args<S: AsRef<str>>(mut self, args: &[S]) -> Self {
        self.args = args.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Set execution timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable sudo for privilege escalation
    pub fn with_sudo(mut self) -> Self {
        self.use_sudo = true;
        self
    }

    /// Program and arguments joined for log messages
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit status code
    pub exit_code: Option<i32>,
    /// Whether command was successful
    pub success: bool,
}

/// Secondary port - Command execution abstraction
///
/// This interface abstracts system command execution, allowing for different
/// implementations (direct execution, mocked for testing, etc.)
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a system command
    ///
    /// A non-zero exit status is not an error; inspect `CommandOutput::success`.
    ///
    /// # Returns
    /// * `Ok(CommandOutput)` - Command output and status
    /// * `Err(CommandError)` - Command could not be spawned or timed out
    async fn execute(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError>;

    /// Check if a command is available on the system path
    async fn is_command_available(&self, command_name: &str) -> Result<bool, CommandError>;
}
