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

//! Append-only file sink

use crate::domain::EmitError;
use crate::ports::AssignmentSink;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Appends bare `KEY=VALUE` lines to a file sourced later by another step
///
/// Existing content is never truncated.
pub struct FileAppendSink {
    path: PathBuf,
}

impl FileAppendSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_failed(&self, e: std::io::Error) -> EmitError {
        EmitError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl AssignmentSink for FileAppendSink {
    async fn write_lines(&self, lines: &[String]) -> Result<(), EmitError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_failed(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.write_failed(e))?;

        let mut content = lines.join("\n");
        content.push('\n');

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| self.write_failed(e))?;
        file.flush().await.map_err(|e| self.write_failed(e))
    }

    fn wants_exports(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use predicates::prelude::*;

    fn lines(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_appends_without_truncating() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.child("node.env");
        env_file.write_str("EXISTING=1\n").unwrap();

        let sink = FileAppendSink::new(env_file.path());
        sink.write_lines(&lines(&["NCCL_IB_DISABLE=1", "NCCL_DEBUG=INFO"]))
            .await
            .unwrap();
        sink.write_lines(&lines(&["NCCL_DEBUG_SUBSYS=ALL"]))
            .await
            .unwrap();

        env_file.assert("EXISTING=1\nNCCL_IB_DISABLE=1\nNCCL_DEBUG=INFO\nNCCL_DEBUG_SUBSYS=ALL\n");
    }

    #[tokio::test]
    async fn test_creates_missing_file_and_directories() {
        let temp = TempDir::new().unwrap();
        let env_file = temp.child("nested/dir/fabric.env");

        let sink = FileAppendSink::new(env_file.path());
        sink.write_lines(&lines(&["UCX_NET_DEVICES=mlx5_0:1"]))
            .await
            .unwrap();

        env_file.assert(predicate::path::exists());
        env_file.assert(predicate::str::contains("UCX_NET_DEVICES=mlx5_0:1"));
        assert!(!sink.wants_exports());
    }

    #[tokio::test]
    async fn test_unwritable_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let sink = FileAppendSink::new(temp.path());

        let err = sink.write_lines(&lines(&["A=1"])).await.unwrap_err();
        assert!(matches!(err, EmitError::WriteFailed { .. }));
    }
}
