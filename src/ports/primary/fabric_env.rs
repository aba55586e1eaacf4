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

use crate::domain::{DetectionResult, FabricEnvError};
use async_trait::async_trait;

/// Primary port - Main interface offered by the fabric environment domain
///
/// This is what the CLI (or a library consumer) uses to detect fabric and
/// emit NCCL/UCX settings.
#[async_trait]
pub trait FabricEnvService: Send + Sync {
    /// Make sure the InfiniBand inspection tool is installed
    ///
    /// # Returns
    /// * `Ok(())` - Tool present or installed
    /// * `Err(FabricEnvError)` - Tool missing and could not be installed
    async fn ensure_dependencies(&self) -> Result<(), FabricEnvError>;

    /// Detect InfiniBand devices and Ethernet interfaces
    ///
    /// Detection never fails; devices and interfaces that cannot be
    /// inspected are left out of the result.
    async fn detect(&self) -> DetectionResult;

    /// Format and write assignments for a detection result
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of lines written
    /// * `Err(FabricEnvError)` - Destination could not be written
    async fn emit(&self, result: &DetectionResult) -> Result<usize, FabricEnvError>;

    /// Run the whole sequence: ensure, detect, emit
    async fn run(&self) -> Result<DetectionResult, FabricEnvError>;
}
