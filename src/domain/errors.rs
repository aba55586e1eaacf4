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

use std::path::PathBuf;
use thiserror::Error;

/// System-level errors for adapters (not exposed to domain)
#[derive(Debug, Clone, Error)]
pub enum SystemError {
    /// Command execution failed
    #[error("Command '{command}' failed{}{}", exit_code_suffix(.exit_code), stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    /// Command not found
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    /// I/O operation failed
    #[error("I/O error: {0}")]
    IoError(String),
    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Timeout
    #[error("Timeout: {0}")]
    Timeout(String),
}

fn exit_code_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" with exit code {c}"))
        .unwrap_or_default()
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Command execution errors
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// System error occurred
    #[error(transparent)]
    System(#[from] SystemError),
    /// Command could not be spawned
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
    /// Command did not finish within its timeout
    #[error("Command '{command}' timed out after {seconds}s")]
    TimedOut { command: String, seconds: u64 },
}

/// Errors raised while making sure the InfiniBand inspection tool is installed
#[derive(Debug, Clone, Error)]
pub enum DependencyError {
    /// None of the known package managers is on the path
    #[error("'{tool}' is not installed and no supported package manager was found (tried {tried})")]
    NoPackageManager { tool: String, tried: String },
    /// The package manager ran but reported failure
    #[error("Failed to install '{package}' with {manager}: {reason}")]
    InstallFailed {
        manager: String,
        package: String,
        reason: String,
    },
}

/// Errors raised while writing assignments to their destination
#[derive(Debug, Clone, Error)]
pub enum EmitError {
    /// The output file could not be opened or written
    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
    /// Standard output could not be written
    #[error("Failed to write to stdout: {0}")]
    Stdout(String),
    /// Detection report could not be serialized
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

/// Errors raised while loading the optional configuration file
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    /// File is not valid TOML for the expected schema
    #[error("Invalid config file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Top-level error returned by the fabric environment service
#[derive(Debug, Clone, Error)]
pub enum FabricEnvError {
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
