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

//! Package installation through the host's package manager

use super::{run, run_checked};
use crate::domain::{PackageManager, SystemError};
use crate::ports::{CommandExecutor, PackageInstaller, SystemCommand};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Installs packages with `sudo <manager> install ...`
pub struct SystemPackageInstaller {
    command_executor: Arc<dyn CommandExecutor>,
    /// Package operations get their own, longer timeout
    install_timeout: Duration,
}

impl SystemPackageInstaller {
    pub fn new(command_executor: Arc<dyn CommandExecutor>, install_timeout: Duration) -> Self {
        Self {
            command_executor,
            install_timeout,
        }
    }
}

#[async_trait]
impl PackageInstaller for SystemPackageInstaller {
    async fn command_exists(&self, command: &str) -> bool {
        self.command_executor
            .is_command_available(command)
            .await
            .unwrap_or(false)
    }

    async fn install(&self, manager: PackageManager, package: &str) -> Result<(), SystemError> {
        if let Some(refresh_args) = manager.refresh_args() {
            let refresh = SystemCommand::new(manager.binary())
                .args(refresh_args)
                .timeout(self.install_timeout)
                .with_sudo();
            // Stale indexes only matter if the install below fails
            if let Err(e) = run(self.command_executor.as_ref(), &refresh).await {
                debug!("{} failed: {e}", refresh.display());
            }
        }

        let install = SystemCommand::new(manager.binary())
            .args(&manager.install_args(package))
            .timeout(self.install_timeout)
            .with_sudo();
        info!("Running {}", install.display());
        run_checked(self.command_executor.as_ref(), &install).await?;
        Ok(())
    }
}
