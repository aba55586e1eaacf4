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

use crate::domain::EmitError;
use async_trait::async_trait;

/// Secondary port - Destination for rendered output lines
///
/// Implementations write to standard output (for `eval`/sourcing in a live
/// shell) or append to a file sourced later by another provisioning step.
#[async_trait]
pub trait AssignmentSink: Send + Sync {
    /// Write all lines, each terminated by a newline
    async fn write_lines(&self, lines: &[String]) -> Result<(), EmitError>;

    /// Whether assignments written here should carry the `export` prefix
    fn wants_exports(&self) -> bool;

    /// Human-readable destination for log messages
    fn describe(&self) -> String;
}
