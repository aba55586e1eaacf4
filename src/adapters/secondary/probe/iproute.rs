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

//! `ip` (iproute2) backed link probe

use super::{run, run_checked};
use crate::domain::{has_ipv4_address, parse_ip_link_names, parse_link_state, SystemError};
use crate::ports::{CommandExecutor, LinkProbe, SystemCommand};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Link probe running `ip -o link show`, `ip link show dev` and `ip -4 addr show dev`
pub struct IprouteLinkProbe {
    command_executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
}

impl IprouteLinkProbe {
    pub fn new(command_executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self {
            command_executor,
            timeout,
        }
    }

    fn ip(&self, args: &[&str]) -> SystemCommand {
        SystemCommand::new("ip").args(args).timeout(self.timeout)
    }
}

#[async_trait]
impl LinkProbe for IprouteLinkProbe {
    async fn list_links(&self) -> Result<Vec<String>, SystemError> {
        let output = run_checked(self.command_executor.as_ref(), &self.ip(&["-o", "link", "show"])).await?;
        Ok(parse_ip_link_names(&output.stdout))
    }

    async fn link_state(&self, name: &str) -> Result<Option<String>, SystemError> {
        let output = run(self.command_executor.as_ref(), &self.ip(&["link", "show", "dev", name])).await?;
        if !output.success {
            return Ok(None);
        }
        Ok(Some(
            parse_link_state(&output.stdout).unwrap_or_else(|| "UNKNOWN".to_string()),
        ))
    }

    async fn has_ipv4(&self, name: &str) -> Result<bool, SystemError> {
        let output = run_checked(
            self.command_executor.as_ref(),
            &self.ip(&["-4", "-o", "addr", "show", "dev", name]),
        )
        .await?;
        Ok(has_ipv4_address(&output.stdout))
    }
}
