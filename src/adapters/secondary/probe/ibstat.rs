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

//! `ibstat` backed InfiniBand probe

use super::run_checked;
use crate::domain::{parse_ibstat_device, parse_ibstat_device_list, NetworkDevice, SystemError, IBSTAT};
use crate::ports::{CommandExecutor, InfiniBandProbe, SystemCommand};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// InfiniBand probe running `ibstat -l` and `ibstat <device>`
pub struct IbstatProbe {
    command_executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
}

impl IbstatProbe {
    pub fn new(command_executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self {
            command_executor,
            timeout,
        }
    }
}

#[async_trait]
impl InfiniBandProbe for IbstatProbe {
    async fn is_available(&self) -> bool {
        self.command_executor
            .is_command_available(IBSTAT)
            .await
            .unwrap_or(false)
    }

    async fn list_devices(&self) -> Result<Vec<String>, SystemError> {
        let cmd = SystemCommand::new(IBSTAT).args(&["-l"]).timeout(self.timeout);
        let output = run_checked(self.command_executor.as_ref(), &cmd).await?;
        Ok(parse_ibstat_device_list(&output.stdout))
    }

    async fn query_device(&self, name: &str) -> Result<NetworkDevice, SystemError> {
        let cmd = SystemCommand::new(IBSTAT).args(&[name]).timeout(self.timeout);
        let output = run_checked(self.command_executor.as_ref(), &cmd).await?;
        parse_ibstat_device(name, &output.stdout).map_err(SystemError::ParseError)
    }
}
