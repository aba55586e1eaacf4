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

//! Kernel InfiniBand class tree reader

use crate::domain::SystemError;
use crate::ports::InfiniBandClassTree;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default location of the InfiniBand device class
pub const DEFAULT_IB_CLASS_PATH: &str = "/sys/class/infiniband";

/// Reads `<root>/<device>/ports/<n>/state`
pub struct SysfsClassTree {
    root: PathBuf,
}

impl SysfsClassTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn ports_dir(&self, device: &str) -> PathBuf {
        self.root.join(device).join("ports")
    }
}

impl Default for SysfsClassTree {
    fn default() -> Self {
        Self::new(DEFAULT_IB_CLASS_PATH)
    }
}

async fn entry_names(dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

fn io_error(path: &Path, e: std::io::Error) -> SystemError {
    SystemError::IoError(format!("{}: {e}", path.display()))
}

#[async_trait]
impl InfiniBandClassTree for SysfsClassTree {
    async fn list_devices(&self) -> Result<Vec<String>, SystemError> {
        match entry_names(&self.root).await {
            Ok(mut names) => {
                names.sort();
                Ok(names)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(&self.root, e)),
        }
    }

    async fn list_ports(&self, device: &str) -> Result<Vec<u32>, SystemError> {
        let dir = self.ports_dir(device);
        let names = entry_names(&dir).await.map_err(|e| io_error(&dir, e))?;

        let mut ports: Vec<u32> = names.iter().filter_map(|n| n.parse().ok()).collect();
        ports.sort_unstable();
        Ok(ports)
    }

    async fn port_state(&self, device: &str, port: u32) -> Result<String, SystemError> {
        let path = self.ports_dir(device).join(port.to_string()).join("state");
        fs::read_to_string(&path)
            .await
            .map_err(|e| io_error(&path, e))
    }
}
