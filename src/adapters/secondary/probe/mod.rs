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

//! Probe adapters backed by system commands and sysfs

pub mod ibstat;
pub mod iproute;
pub mod package;
pub mod sysfs;

#[cfg(test)]
pub(crate) mod scripted;

pub use ibstat::IbstatProbe;
pub use iproute::IprouteLinkProbe;
pub use package::SystemPackageInstaller;
pub use sysfs::{SysfsClassTree, DEFAULT_IB_CLASS_PATH};

use crate::domain::{CommandError, SystemError};
use crate::ports::{CommandExecutor, CommandOutput, SystemCommand};

fn command_failed(command: &SystemCommand, err: CommandError) -> SystemError {
    match err {
        CommandError::System(system) => system,
        CommandError::TimedOut { command, seconds } => {
            SystemError::Timeout(format!("'{command}' did not finish within {seconds}s"))
        }
        other => SystemError::CommandFailed {
            command: command.display(),
            exit_code: None,
            stderr: other.to_string(),
        },
    }
}

/// Run a command, mapping executor errors into [`SystemError`]
async fn run(
    executor: &dyn CommandExecutor,
    command: &SystemCommand,
) -> Result<CommandOutput, SystemError> {
    executor
        .execute(command)
        .await
        .map_err(|e| command_failed(command, e))
}

/// Run a command and treat a non-zero exit status as an error
async fn run_checked(
    executor: &dyn CommandExecutor,
    command: &SystemCommand,
) -> Result<CommandOutput, SystemError> {
    let output = run(executor, command).await?;
    if output.success {
        Ok(output)
    } else {
        Err(SystemError::CommandFailed {
            command: command.display(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }
}
