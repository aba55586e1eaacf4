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

use crate::domain::{
    formatter, DependencyEnsurer, DetectionResult, EmitError, EthernetDetector, FabricEnvError,
    InfinibandDetector, OutputConfig,
};
use crate::ports::{AssignmentSink, FabricEnvService};
use async_trait::async_trait;
use log::{info, Level};
use std::sync::Arc;

/// Domain service that sequences dependency checks, detection and emission
///
/// Every step runs to completion before the next one starts.
pub struct FabricEnvironmentService {
    /// Installs the inspection tool when missing; `None` skips the step
    ensurer: Option<DependencyEnsurer>,
    infiniband: InfinibandDetector,
    ethernet: EthernetDetector,
    /// Destination for rendered lines
    sink: Arc<dyn AssignmentSink>,
    output: OutputConfig,
}

impl FabricEnvironmentService {
    /// Create a new fabric environment service
    ///
    /// # Arguments
    /// * `ensurer` - Dependency ensurer, or `None` to never install packages
    /// * `infiniband` - InfiniBand detector
    /// * `ethernet` - Ethernet detector
    /// * `sink` - Where rendered output goes
    /// * `output` - Verbosity and output mode
    pub fn new(
        ensurer: Option<DependencyEnsurer>,
        infiniband: InfinibandDetector,
        ethernet: EthernetDetector,
        sink: Arc<dyn AssignmentSink>,
        output: OutputConfig,
    ) -> Self {
        Self {
            ensurer,
            infiniband,
            ethernet,
            sink,
            output,
        }
    }

    fn render(&self, result: &DetectionResult) -> Result<Vec<String>, EmitError> {
        if self.output.json {
            let json = serde_json::to_string_pretty(result)
                .map_err(|e| EmitError::SerializationFailed(e.to_string()))?;
            return Ok(vec![json]);
        }

        Ok(formatter::format(
            result,
            self.sink.wants_exports(),
            self.output.verbose,
        ))
    }

    /// Summary lines logged after a verbose run; empty otherwise
    fn summary(&self, result: &DetectionResult) -> Vec<(Level, String)> {
        if !self.output.verbose {
            return Vec::new();
        }

        let mut lines = Vec::new();
        if result.has_infiniband() {
            lines.push((Level::Info, format!("InfiniBand devices: {}", result.ib_device_list())));
            lines.push((Level::Info, format!("InfiniBand ports: {}", result.ib_port_list())));
        } else {
            lines.push((
                Level::Warn,
                "No active InfiniBand devices found; NCCL will fall back to TCP sockets".to_string(),
            ));
        }

        lines.push((
            Level::Info,
            match result.first_ethernet() {
                Some(first) => format!(
                    "Ethernet interfaces: {} (using {first})",
                    result.eth_interface_list()
                ),
                None => "Ethernet interfaces: none".to_string(),
            },
        ));
        lines
    }

    fn log_summary(&self, result: &DetectionResult) {
        for (level, message) in self.summary(result) {
            log::log!(level, "{message}");
        }
    }
}

#[async_trait]
impl FabricEnvService for FabricEnvironmentService {
    async fn ensure_dependencies(&self) -> Result<(), FabricEnvError> {
        match &self.ensurer {
            Some(ensurer) => Ok(ensurer.ensure_tool_present().await?),
            None => {
                info!("Package installation disabled; skipping dependency check");
                Ok(())
            }
        }
    }

    async fn detect(&self) -> DetectionResult {
        let infiniband = self.infiniband.detect().await;
        let ethernet = self.ethernet.detect().await;
        DetectionResult::new(infiniband, ethernet)
    }

    async fn emit(&self, result: &DetectionResult) -> Result<usize, FabricEnvError> {
        let lines = self.render(result)?;
        self.sink.write_lines(&lines).await?;
        info!("Wrote {} line(s) to {}", lines.len(), self.sink.describe());
        Ok(lines.len())
    }

    async fn run(&self) -> Result<DetectionResult, FabricEnvError> {
        self.ensure_dependencies().await?;
        let result = self.detect().await;
        self.emit(&result).await?;
        self.log_summary(&result);
        Ok(result)
    }
}
