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

use crate::domain::{DependencyError, PackageManager};
use crate::ports::PackageInstaller;
use log::{debug, info, warn};
use std::sync::Arc;

/// Executable the InfiniBand detector prefers
pub const IBSTAT: &str = "ibstat";

/// Makes sure `ibstat` is installed, installing it through the first package
/// manager found.
///
/// This may change system package state.
pub struct DependencyEnsurer {
    installer: Arc<dyn PackageInstaller>,
}

impl DependencyEnsurer {
    pub fn new(installer: Arc<dyn PackageInstaller>) -> Self {
        Self { installer }
    }

    /// First package manager on the path, in [`PackageManager::PRIORITY`] order
    pub async fn find_package_manager(&self) -> Option<PackageManager> {
        for manager in PackageManager::PRIORITY {
            if self.installer.command_exists(manager.binary()).await {
                return Some(manager);
            }
        }
        None
    }

    /// Ensure the inspection tool is present
    ///
    /// # Returns
    /// * `Ok(())` - Tool already present, or install command succeeded
    /// * `Err(DependencyError)` - No package manager found, or install failed
    pub async fn ensure_tool_present(&self) -> Result<(), DependencyError> {
        if self.installer.command_exists(IBSTAT).await {
            debug!("{IBSTAT} found on path");
            return Ok(());
        }

        let Some(manager) = self.find_package_manager().await else {
            let tried = PackageManager::PRIORITY
                .iter()
                .map(|m| m.binary())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(DependencyError::NoPackageManager {
                tool: IBSTAT.to_string(),
                tried,
            });
        };

        let package = manager.ibstat_package();
        info!("{IBSTAT} not found, installing {package} with {manager}");

        self.installer
            .install(manager, package)
            .await
            .map_err(|e| DependencyError::InstallFailed {
                manager: manager.to_string(),
                package: package.to_string(),
                reason: e.to_string(),
            })?;

        if !self.installer.command_exists(IBSTAT).await {
            warn!("{package} installed but {IBSTAT} is still not on the path; falling back to sysfs");
        }

        Ok(())
    }
}
