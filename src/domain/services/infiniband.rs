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

use crate::domain::{is_active_port_state, IbPort, InfinibandDetection};
use crate::ports::{InfiniBandClassTree, InfiniBandProbe};
use log::{debug, info, warn};
use std::sync::Arc;

/// Finds active InfiniBand devices and the ports to hand to UCX
///
/// With `ibstat` available a device qualifies iff its link layer is exactly
/// `InfiniBand` and its state is exactly `Active`, and all of its ports
/// `1..=port_count` are listed. Without `ibstat` the kernel class tree is read
/// instead and each port is gated on its own `4: ACTIVE` state; a device is
/// listed iff at least one of its ports is.
pub struct InfinibandDetector {
    probe: Arc<dyn InfiniBandProbe>,
    class_tree: Arc<dyn InfiniBandClassTree>,
}

impl InfinibandDetector {
    pub fn new(probe: Arc<dyn InfiniBandProbe>, class_tree: Arc<dyn InfiniBandClassTree>) -> Self {
        Self { probe, class_tree }
    }

    pub async fn detect(&self) -> InfinibandDetection {
        if self.probe.is_available().await {
            self.detect_with_probe().await
        } else {
            info!("ibstat unavailable, reading InfiniBand class tree");
            self.detect_from_class_tree().await
        }
    }

    async fn detect_with_probe(&self) -> InfinibandDetection {
        let mut detection = InfinibandDetection::default();

        let names = match self.probe.list_devices().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list InfiniBand devices: {e}");
                return detection;
            }
        };

        for name in names {
            match self.probe.query_device(&name).await {
                Ok(device) if device.is_active_infiniband() => {
                    debug!("{name}: active InfiniBand, {} port(s)", device.port_count);
                    detection.ports.extend(device.ports());
                    detection.devices.push(device.name);
                }
                Ok(device) => {
                    debug!(
                        "{name}: skipped (link layer {:?}, state {:?})",
                        device.kind, device.link_state
                    );
                }
                Err(e) => debug!("{name}: skipped ({e})"),
            }
        }

        detection
    }

    async fn detect_from_class_tree(&self) -> InfinibandDetection {
        let mut detection = InfinibandDetection::default();

        let devices = match self.class_tree.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Could not read InfiniBand class tree: {e}");
                return detection;
            }
        };

        for device in devices {
            let ports = match self.class_tree.list_ports(&device).await {
                Ok(ports) => ports,
                Err(e) => {
                    debug!("{device}: skipped ({e})");
                    continue;
                }
            };

            let mut active = Vec::new();
            for port in ports {
                match self.class_tree.port_state(&device, port).await {
                    Ok(state) if is_active_port_state(&state) => active.push(IbPort::new(&device, port)),
                    Ok(state) => debug!("{device}:{port}: state {}", state.trim()),
                    Err(e) => debug!("{device}:{port}: skipped ({e})"),
                }
            }

            if !active.is_empty() {
                detection.ports.extend(active);
                detection.devices.push(device);
            }
        }

        detection
    }
}
