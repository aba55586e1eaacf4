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

//! In-memory port implementations shared by the service tests

use crate::domain::{
    DeviceKind, EmitError, LinkState, NetworkDevice, PackageManager, SystemError,
};
use crate::ports::{
    AssignmentSink, InfiniBandClassTree, InfiniBandProbe, LinkProbe, PackageInstaller,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

pub fn ib_device(name: &str, link_layer: &str, state: &str, ports: u32) -> NetworkDevice {
    NetworkDevice {
        name: name.to_string(),
        kind: DeviceKind::from_link_layer(link_layer),
        link_state: LinkState::from_ibstat(state),
        port_count: ports,
    }
}

/// `ibstat` stand-in; devices missing from `devices` fail to query
pub struct FakeIbProbe {
    pub available: bool,
    pub order: Vec<String>,
    pub devices: HashMap<String, NetworkDevice>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeIbProbe {
    pub fn unavailable() -> Self {
        Self::with_devices(false, vec![])
    }

    pub fn with_devices(available: bool, devices: Vec<NetworkDevice>) -> Self {
        Self {
            available,
            order: devices.iter().map(|d| d.name.clone()).collect(),
            devices: devices.into_iter().map(|d| (d.name.clone(), d)).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Add a listed device whose query fails
    pub fn with_broken(mut self, name: &str) -> Self {
        self.order.push(name.to_string());
        self
    }
}

#[async_trait]
impl InfiniBandProbe for FakeIbProbe {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn list_devices(&self) -> Result<Vec<String>, SystemError> {
        Ok(self.order.clone())
    }

    async fn query_device(&self, name: &str) -> Result<NetworkDevice, SystemError> {
        self.queries.lock().unwrap().push(name.to_string());
        self.devices
            .get(name)
            .cloned()
            .ok_or_else(|| SystemError::ParseError(format!("No port count in ibstat output for {name}")))
    }
}

/// Class tree stand-in: device -> port -> state file content
#[derive(Default)]
pub struct FakeClassTree {
    pub devices: BTreeMap<String, BTreeMap<u32, String>>,
}

impl FakeClassTree {
    pub fn with_port(mut self, device: &str, port: u32, state: &str) -> Self {
        self.devices
            .entry(device.to_string())
            .or_default()
            .insert(port, state.to_string());
        self
    }
}

#[async_trait]
impl InfiniBandClassTree for FakeClassTree {
    async fn list_devices(&self) -> Result<Vec<String>, SystemError> {
        Ok(self.devices.keys().cloned().collect())
    }

    async fn list_ports(&self, device: &str) -> Result<Vec<u32>, SystemError> {
        self.devices
            .get(device)
            .map(|ports| ports.keys().copied().collect())
            .ok_or_else(|| SystemError::IoError(format!("{device}: no such device")))
    }

    async fn port_state(&self, device: &str, port: u32) -> Result<String, SystemError> {
        self.devices
            .get(device)
            .and_then(|ports| ports.get(&port))
            .cloned()
            .ok_or_else(|| SystemError::IoError(format!("{device}/{port}: no state file")))
    }
}

/// A link as the fake `ip` tool reports it
pub struct FakeLink {
    pub name: String,
    pub state: &'static str,
    pub ipv4: bool,
    /// Listed by enumeration but gone by the time it is inspected
    pub vanished: bool,
}

pub fn link(name: &str, state: &'static str, ipv4: bool) -> FakeLink {
    FakeLink {
        name: name.to_string(),
        state,
        ipv4,
        vanished: false,
    }
}

#[derive(Default)]
pub struct FakeLinkProbe {
    pub links: Vec<FakeLink>,
    pub fail_listing: bool,
}

impl FakeLinkProbe {
    pub fn new(links: Vec<FakeLink>) -> Self {
        Self {
            links,
            fail_listing: false,
        }
    }

    fn find(&self, name: &str) -> Option<&FakeLink> {
        self.links.iter().find(|l| l.name == name && !l.vanished)
    }
}

#[async_trait]
impl LinkProbe for FakeLinkProbe {
    async fn list_links(&self) -> Result<Vec<String>, SystemError> {
        if self.fail_listing {
            return Err(SystemError::CommandNotFound("ip".to_string()));
        }
        Ok(self.links.iter().map(|l| l.name.clone()).collect())
    }

    async fn link_state(&self, name: &str) -> Result<Option<String>, SystemError> {
        Ok(self.find(name).map(|l| l.state.to_string()))
    }

    async fn has_ipv4(&self, name: &str) -> Result<bool, SystemError> {
        Ok(self.find(name).is_some_and(|l| l.ipv4))
    }
}

/// Package installer stand-in that records every lookup and install
#[derive(Default)]
pub struct FakeInstaller {
    pub present: Mutex<HashSet<String>>,
    pub install_fails: bool,
    /// Whether a successful install puts `ibstat` on the path
    pub provides_ibstat: bool,
    pub lookups: Mutex<Vec<String>>,
    pub installs: Mutex<Vec<(PackageManager, String)>>,
}

impl FakeInstaller {
    pub fn with_commands(commands: &[&str]) -> Self {
        Self {
            present: Mutex::new(commands.iter().map(|c| c.to_string()).collect()),
            provides_ibstat: true,
            ..Default::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn installs(&self) -> Vec<(PackageManager, String)> {
        self.installs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    async fn command_exists(&self, command: &str) -> bool {
        self.lookups.lock().unwrap().push(command.to_string());
        self.present.lock().unwrap().contains(command)
    }

    async fn install(&self, manager: PackageManager, package: &str) -> Result<(), SystemError> {
        self.installs
            .lock()
            .unwrap()
            .push((manager, package.to_string()));
        if self.install_fails {
            return Err(SystemError::CommandFailed {
                command: manager.binary().to_string(),
                exit_code: Some(100),
                stderr: format!("E: Unable to locate package {package}"),
            });
        }
        if self.provides_ibstat {
            self.present.lock().unwrap().insert("ibstat".to_string());
        }
        Ok(())
    }
}

/// Sink capturing written lines in memory
pub struct MemorySink {
    pub exported: bool,
    pub lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new(exported: bool) -> Self {
        Self {
            exported,
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssignmentSink for MemorySink {
    async fn write_lines(&self, lines: &[String]) -> Result<(), EmitError> {
        self.lines.lock().unwrap().extend_from_slice(lines);
        Ok(())
    }

    fn wants_exports(&self) -> bool {
        self.exported
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
