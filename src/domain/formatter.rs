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

//! Maps a [`DetectionResult`] onto NCCL and UCX environment assignments

use crate::domain::DetectionResult;
use std::fmt;

pub const EXPORT_PREFIX: &str = "export ";

/// Consumer an assignment configures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Collective-communication runtime
    Nccl,
    /// RDMA-aware messaging layer
    Ucx,
}

impl Section {
    fn header(self) -> &'static str {
        match self {
            Section::Nccl => "# NCCL transport settings",
            Section::Ucx => "# UCX transport settings",
        }
    }
}

/// One `KEY=VALUE` environment assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAssignment {
    pub section: Section,
    pub key: &'static str,
    pub value: String,
}

impl EnvAssignment {
    fn new(section: Section, key: &'static str, value: impl Into<String>) -> Self {
        Self {
            section,
            key,
            value: value.into(),
        }
    }
}

impl fmt::Display for EnvAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Build the ordered assignment table for a detection result
pub fn build_assignments(result: &DetectionResult) -> Vec<EnvAssignment> {
    use Section::{Nccl, Ucx};

    let mut assignments = Vec::new();

    if result.has_infiniband() {
        assignments.push(EnvAssignment::new(Nccl, "NCCL_IB_HCA", result.ib_device_list()));
        assignments.push(EnvAssignment::new(Nccl, "NCCL_IB_DISABLE", "0"));
        assignments.push(EnvAssignment::new(Nccl, "NCCL_IB_TIMEOUT", "23"));
        assignments.push(EnvAssignment::new(Nccl, "NCCL_IB_RETRY_CNT", "7"));
    } else {
        assignments.push(EnvAssignment::new(Nccl, "NCCL_IB_DISABLE", "1"));
    }

    if let Some(eth) = result.first_ethernet() {
        assignments.push(EnvAssignment::new(Nccl, "NCCL_SOCKET_IFNAME", eth));
    }

    assignments.push(EnvAssignment::new(Nccl, "NCCL_DEBUG", "INFO"));
    assignments.push(EnvAssignment::new(Nccl, "NCCL_DEBUG_SUBSYS", "ALL"));

    if !result.ib_ports.is_empty() {
        assignments.push(EnvAssignment::new(Ucx, "UCX_NET_DEVICES", result.ib_port_list()));
    } else if let Some(eth) = result.first_ethernet() {
        assignments.push(EnvAssignment::new(Ucx, "UCX_NET_DEVICES", eth));
    }

    assignments
}

/// Render assignments as output lines
///
/// # Arguments
/// * `assignments` - Ordered assignments from [`build_assignments`]
/// * `exported` - Prefix every assignment with `export `
/// * `verbose` - Interleave `#` commentary lines
pub fn render_assignments(assignments: &[EnvAssignment], exported: bool, verbose: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(assignments.len() + 3);
    let mut current_section = None;

    if verbose {
        lines.push("# Fabric environment generated by fabric_env".to_string());
    }

    for assignment in assignments {
        if verbose && current_section != Some(assignment.section) {
            lines.push(assignment.section.header().to_string());
            current_section = Some(assignment.section);
        }

        if exported {
            lines.push(format!("{EXPORT_PREFIX}{assignment}"));
        } else {
            lines.push(assignment.to_string());
        }
    }

    lines
}

/// Build and render in one step
pub fn format(result: &DetectionResult, exported: bool, verbose: bool) -> Vec<String> {
    render_assignments(&build_assignments(result), exported, verbose)
}
