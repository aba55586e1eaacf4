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

use crate::domain::is_excluded_interface;
use crate::ports::LinkProbe;
use log::{debug, warn};
use std::sync::Arc;

/// Operational state an interface must report to be used
pub const LINK_UP: &str = "UP";

/// Finds Ethernet interfaces usable as NCCL/UCX socket transports
pub struct EthernetDetector {
    links: Arc<dyn LinkProbe>,
}

impl EthernetDetector {
    pub fn new(links: Arc<dyn LinkProbe>) -> Self {
        Self { links }
    }

    /// Interfaces that are not excluded by name, are `UP`, and carry an IPv4
    /// address, in enumeration order
    pub async fn detect(&self) -> Vec<String> {
        let names = match self.links.list_links().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list network interfaces: {e}");
                return Vec::new();
            }
        };

        let mut interfaces = Vec::new();
        for name in names {
            if is_excluded_interface(&name) {
                debug!("{name}: excluded by name");
                continue;
            }

            if self.is_usable(&name).await {
                interfaces.push(name);
            }
        }

        interfaces
    }

    async fn is_usable(&self, name: &str) -> bool {
        match self.links.link_state(name).await {
            Ok(Some(state)) if state == LINK_UP => {}
            Ok(Some(state)) => {
                debug!("{name}: state {state}");
                return false;
            }
            Ok(None) => {
                debug!("{name}: disappeared during detection");
                return false;
            }
            Err(e) => {
                debug!("{name}: {e}");
                return false;
            }
        }

        match self.links.has_ipv4(name).await {
            Ok(true) => true,
            Ok(false) => {
                debug!("{name}: no IPv4 address");
                false
            }
            Err(e) => {
                debug!("{name}: {e}");
                false
            }
        }
    }
}
