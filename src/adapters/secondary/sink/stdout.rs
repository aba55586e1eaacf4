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

//! Standard output sink

use crate::domain::EmitError;
use crate::ports::AssignmentSink;
use async_trait::async_trait;
use tokio::io::{self, AsyncWriteExt};

/// Prints exported assignments for sourcing into a live shell
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssignmentSink for StdoutSink {
    async fn write_lines(&self, lines: &[String]) -> Result<(), EmitError> {
        let mut stdout = io::stdout();
        for line in lines {
            stdout
                .write_all(format!("{line}\n").as_bytes())
                .await
                .map_err(|e| EmitError::Stdout(e.to_string()))?;
        }
        stdout
            .flush()
            .await
            .map_err(|e| EmitError::Stdout(e.to_string()))
    }

    fn wants_exports(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}
