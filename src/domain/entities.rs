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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Link-layer classification of a host network device
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Native InfiniBand link layer
    InfiniBand,
    /// Ethernet link layer (includes RoCE adapters)
    Ethernet,
    /// Anything else, or a link layer that could not be read
    Other,
}

impl DeviceKind {
    /// Classify a link layer string as reported by `ibstat`.
    ///
    /// Matching is exact: `"infiniband"` is not InfiniBand.
    pub fn from_link_layer(value: &str) -> Self {
        match value {
            "InfiniBand" => DeviceKind::InfiniBand,
            "Ethernet" => DeviceKind::Ethernet,
            _ => DeviceKind::Other,
        }
    }
}

/// Operational state of a device or port
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Active,
    Down,
    Unknown,
}

impl LinkState {
    /// Map an `ibstat` state string; only exact matches are recognised
    pub fn from_ibstat(value: &str) -> Self {
        match value {
            "Active" => LinkState::Active,
            "Down" => LinkState::Down,
            _ => LinkState::Unknown,
        }
    }
}

/// Snapshot of one device reported by the InfiniBand inspection tool
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NetworkDevice {
    /// Device name (e.g. `mlx5_0`)
    pub name: String,
    /// Link layer classification
    pub kind: DeviceKind,
    /// Device-level state
    pub link_state: LinkState,
    /// Number of ports on the device
    pub port_count: u32,
}

impl NetworkDevice {
    /// A device is usable for NCCL/UCX only if it is InfiniBand and active
    pub fn is_active_infiniband(&self) -> bool {
        self.kind == DeviceKind::InfiniBand && self.link_state == LinkState::Active
    }

    /// Ports `1..=port_count` in ascending order
    pub fn ports(&self) -> impl Iterator<Item = IbPort> + '_ {
        (1..=self.port_count).map(move |port| IbPort::new(&self.name, port))
    }
}

/// An InfiniBand device and one of its 1-based port numbers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IbPort {
    pub device: String,
    pub port: u32,
}

impl IbPort {
    pub fn new(device: &str, port: u32) -> Self {
        Self {
            device: device.to_string(),
            port,
        }
    }
}

impl fmt::Display for IbPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device, self.port)
    }
}

/// InfiniBand half of a detection run
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct InfinibandDetection {
    /// Qualifying device names, in enumeration order
    pub devices: Vec<String>,
    /// Qualifying device ports, grouped by device, ascending port number
    pub ports: Vec<IbPort>,
}

/// Immutable result of one detection run, consumed by the formatter
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct DetectionResult {
    /// Active InfiniBand devices
    pub ib_devices: Vec<String>,
    /// Active InfiniBand device ports
    pub ib_ports: Vec<IbPort>,
    /// Usable Ethernet interfaces, in enumeration order
    pub eth_interfaces: Vec<String>,
}

impl DetectionResult {
    pub fn new(infiniband: InfinibandDetection, eth_interfaces: Vec<String>) -> Self {
        Self {
            ib_devices: infiniband.devices,
            ib_ports: infiniband.ports,
            eth_interfaces,
        }
    }

    /// Comma-joined InfiniBand device names
    pub fn ib_device_list(&self) -> String {
        self.ib_devices.join(",")
    }

    /// Comma-joined `device:port` list
    pub fn ib_port_list(&self) -> String {
        self.ib_ports
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Comma-joined Ethernet interface names
    pub fn eth_interface_list(&self) -> String {
        self.eth_interfaces.join(",")
    }

    /// First Ethernet interface in enumeration order
    pub fn first_ethernet(&self) -> Option<&str> {
        self.eth_interfaces.first().map(String::as_str)
    }

    pub fn has_infiniband(&self) -> bool {
        !self.ib_devices.is_empty()
    }
}

/// Package manager families able to install the InfiniBand diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Yum,
    Dnf,
    Pacman,
    Zypper,
}

impl PackageManager {
    /// Probe order when looking for an installed package manager
    pub const PRIORITY: [PackageManager; 5] = [
        PackageManager::Apt,
        PackageManager::Yum,
        PackageManager::Dnf,
        PackageManager::Pacman,
        PackageManager::Zypper,
    ];

    /// Executable looked up on the path
    pub fn binary(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Yum => "yum",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
        }
    }

    /// Package that ships `ibstat` in this family's repositories
    pub fn ibstat_package(self) -> &'static str {
        match self {
            PackageManager::Pacman => "rdma-core",
            _ => "infiniband-diags",
        }
    }

    /// Index refresh run before installing, if the family needs one
    pub fn refresh_args(self) -> Option<&'static [&'static str]> {
        match self {
            PackageManager::Apt => Some(&["update"]),
            _ => None,
        }
    }

    /// Non-interactive install arguments for `package`
    pub fn install_args(self, package: &str) -> Vec<String> {
        let base: &[&str] = match self {
            PackageManager::Apt | PackageManager::Yum | PackageManager::Dnf => &["install", "-y"],
            PackageManager::Pacman => &["-S", "--noconfirm"],
            PackageManager::Zypper => &["--non-interactive", "install"],
        };
        base.iter()
            .map(|arg| arg.to_string())
            .chain(std::iter::once(package.to_string()))
            .collect()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// How the run should emit its results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Emit commentary and diagnostics
    pub verbose: bool,
    /// Append bare assignments to this file instead of printing exports
    pub output: Option<PathBuf>,
    /// Print the detection result as JSON instead of assignments
    pub json: bool,
}

impl OutputConfig {
    /// Assignments are exported only when printed for shell sourcing
    pub fn exported(&self) -> bool {
        self.output.is_none()
    }
}
