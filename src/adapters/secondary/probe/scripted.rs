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

//! Command executor that replays canned outputs, for adapter tests

use crate::domain::{CommandError, SystemError};
use crate::ports::{CommandExecutor, CommandOutput, SystemCommand};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedExecutor {
    /// Keyed by `SystemCommand::display()`
    responses: HashMap<String, CommandOutput>,
    available: HashSet<String>,
    /// `(command line, with sudo)` in execution order
    pub executed: Mutex<Vec<(String, bool)>>,
}

impl ScriptedExecutor {
    pub fn respond(mut self, command_line: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.insert(
            command_line.to_string(),
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code: Some(exit_code),
                success: exit_code == 0,
            },
        );
        self
    }

    pub fn with_available(mut self, command: &str) -> Self {
        self.available.insert(command.to_string());
        self
    }

    pub fn executed(&self) -> Vec<(String, bool)> {
        self.executed.lock().unwrap().clone()
    }

    fn replay(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
        let line = command.display();
        self.executed
            .lock()
            .unwrap()
            .push((line.clone(), command.use_sudo));
        self.responses
            .get(&line)
            .cloned()
            .ok_or_else(|| CommandError::System(SystemError::CommandNotFound(command.program.clone())))
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, command: &SystemCommand) -> Result<CommandOutput, CommandError> {
        self.replay(command)
    }

    async fn is_command_available(&self, command_name: &str) -> Result<bool, CommandError> {
        Ok(self.available.contains(command_name))
    }
}
