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

use crate::domain::{NetworkDevice, PackageManager, SystemError};
use async_trait::async_trait;

/// Secondary port - InfiniBand inspection tool (`ibstat`)
///
/// Exposes device enumeration and per-device attributes as typed queries so
/// the classification rules can be tested without the tool installed.
#[async_trait]
pub trait InfiniBandProbe: Send + Sync {
    /// Check whether the inspection tool can be run on this host
    async fn is_available(&self) -> bool;

    /// List device names in the order the tool reports them
    async fn list_devices(&self) -> Result<Vec<String>, SystemError>;

    /// Read link layer, state and port count for one device
    ///
    /// # Returns
    /// * `Ok(NetworkDevice)` - Device snapshot
    /// * `Err(SystemError)` - Tool failed or output could not be parsed
    async fn query_device(&self, name: &str) -> Result<NetworkDevice, SystemError>;
}

/// Secondary port - Kernel InfiniBand device-class tree (`/sys/class/infiniband`)
///
/// Used when the inspection tool is unavailable.
#[async_trait]
pub trait InfiniBandClassTree: Send + Sync {
    /// List device directory names, sorted by name
    ///
    /// A missing class directory yields an empty list.
    async fn list_devices(&self) -> Result<Vec<String>, SystemError>;

    /// List port numbers of a device, ascending
    async fn list_ports(&self, device: &str) -> Result<Vec<u32>, SystemError>;

    /// Raw content of a port's `state` file
    async fn port_state(&self, device: &str, port: u32) -> Result<String, SystemError>;
}

/// Secondary port - Link-layer enumeration tool (`ip`)
#[async_trait]
pub trait LinkProbe: Send + Sync {
    /// List interface names in enumeration order
    async fn list_links(&self) -> Result<Vec<String>, SystemError>;

    /// Current operational state token of an interface (e.g. `UP`)
    ///
    /// # Returns
    /// * `Ok(Some(state))` - Interface exists
    /// * `Ok(None)` - Interface no longer exists
    /// * `Err(SystemError)` - Tool could not be run
    async fn link_state(&self, name: &str) -> Result<Option<String>, SystemError>;

    /// Whether at least one IPv4 address is bound to the interface
    async fn has_ipv4(&self, name: &str) -> Result<bool, SystemError>;
}

/// Secondary port - OS package installation
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Whether an executable is on the path
    async fn command_exists(&self, command: &str) -> bool;

    /// Install a package with elevated privileges
    ///
    /// # Returns
    /// * `Ok(())` - Install command exited successfully
    /// * `Err(SystemError)` - Install command failed or could not be run
    async fn install(&self, manager: PackageManager, package: &str) -> Result<(), SystemError>;
}
