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

//! Unix command execution adapter

use crate::domain::{CommandError, SystemError};
use crate::ports::{CommandExecutor, CommandOutput, SystemCommand};
use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Unix-based command executor that handles privilege escalation and timeouts
///
/// Failed commands are never retried.
pub struct UnixCommandExecutor {
    /// Default timeout for commands
    default_timeout: Duration,
}

impl UnixCommandExecutor {
    /// Create a new Unix command executor
    ///
    /// # Arguments
    /// * `default_timeout` - Timeout for commands that do not set their own
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    /// Create a Unix command executor with default settings
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_secs(30))
    }

    fn is_root() -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail
        unsafe { libc::geteuid() == 0 }
    }

    /// Execute a command once
    async fn execute_once(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
        let command_timeout = command.timeout.unwrap_or(self.default_timeout);
        let escalate = command.use_sudo && !Self::is_root();

        let mut cmd = if escalate {
            let mut sudo_cmd = Command::new("sudo");
            sudo_cmd.arg(&command.program);
            sudo_cmd.args(&command.args);
            sudo_cmd
        } else {
            let mut base_cmd = Command::new(&command.program);
            base_cmd.args(&command.args);
            base_cmd
        };

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(
            "Executing: {}{}",
            if escalate { "sudo " } else { "" },
            command.display()
        );

        match timeout(command_timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                let success = output.status.success();
                let exit_code = output.status.code();

                if !success {
                    debug!(
                        "'{}' exited with {exit_code:?}: {}",
                        command.program,
                        stderr.trim()
                    );
                }

                Ok(CommandOutput {
                    stdout,
                    stderr,
                    exit_code,
                    success,
                })
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => Err(CommandError::System(
                SystemError::CommandNotFound(command.program.clone()),
            )),
            Ok(Err(e)) => Err(CommandError::ExecutionFailed(format!(
                "Failed to execute command '{}': {}",
                command.program, e
            ))),
            Err(_) => Err(CommandError::TimedOut {
                command: command.program.clone(),
                seconds: command_timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl CommandExecutor for UnixCommandExecutor {
    async fn execute(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
        self.execute_once(command).await
    }

    async fn is_command_available(&self, command_name: &str) -> Result<bool, CommandError> {
        // Resolved against PATH in-process, without spawning anything
        match which::which(command_name) {
            Ok(path) => {
                debug!("{command_name} resolved to {}", path.display());
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unix_command_executor_basic() {
        let executor = UnixCommandExecutor::with_defaults();

        let cmd = SystemCommand::new("echo").args(&["hello", "world"]);

        let result = executor.execute(&cmd).await.unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "hello world");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let executor = UnixCommandExecutor::with_defaults();

        let result = executor.execute(&SystemCommand::new("false")).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let executor = UnixCommandExecutor::with_defaults();

        let err = executor
            .execute(&SystemCommand::new("definitely_not_a_real_command_12345"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::System(SystemError::CommandNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_command_availability_check() {
        let executor = UnixCommandExecutor::with_defaults();

        // Test with a command that should not exist
        assert!(!executor
            .is_command_available("definitely_not_a_real_command_12345")
            .await
            .unwrap());
        assert!(executor.is_command_available("sh").await.unwrap());
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let executor = UnixCommandExecutor::with_defaults();

        let cmd = SystemCommand::new("sleep")
            .args(&["10"])
            .timeout(Duration::from_millis(100));

        let result = executor.execute(&cmd).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }
}
