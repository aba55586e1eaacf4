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

//! Dependency injection container for the fabric environment service

use crate::adapters::{
    FileAppendSink, IbstatProbe, IprouteLinkProbe, StdoutSink, SysfsClassTree,
    SystemPackageInstaller, UnixCommandExecutor, DEFAULT_IB_CLASS_PATH,
};
use crate::domain::{
    ConfigError, DependencyEnsurer, EthernetDetector, FabricEnvironmentService,
    InfinibandDetector, OutputConfig,
};
use crate::ports::{AssignmentSink, CommandExecutor, FabricEnvService};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the dependency injection container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Timeout for inspection commands (`ibstat`, `ip`)
    pub command_timeout: Duration,
    /// Timeout for package manager commands
    pub install_timeout: Duration,
    /// InfiniBand class tree read when `ibstat` is unavailable
    pub ib_class_path: PathBuf,
    /// Install `ibstat` when it is missing
    pub install_missing: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            install_timeout: Duration::from_secs(600),
            ib_class_path: PathBuf::from(DEFAULT_IB_CLASS_PATH),
            install_missing: true,
        }
    }
}

/// Optional TOML overlay for [`ContainerConfig`]
///
/// ```toml
/// command_timeout_secs = 10
/// install_timeout_secs = 900
/// ib_class_path = "/sys/class/infiniband"
/// install_missing = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub command_timeout_secs: Option<u64>,
    pub install_timeout_secs: Option<u64>,
    pub ib_class_path: Option<PathBuf>,
    pub install_missing: Option<bool>,
}

impl ConfigFile {
    /// Parse a config file from TOML text
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &text)
    }

    /// Apply the values present in this file on top of `config`
    pub fn apply(self, mut config: ContainerConfig) -> ContainerConfig {
        if let Some(secs) = self.command_timeout_secs {
            config.command_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.install_timeout_secs {
            config.install_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = self.ib_class_path {
            config.ib_class_path = path;
        }
        if let Some(install) = self.install_missing {
            config.install_missing = install;
        }
        config
    }
}

/// Dependency injection container
pub struct ServiceContainer {
    config: ContainerConfig,
}

impl ServiceContainer {
    /// Create a new service container with configuration
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    /// Create the command executor
    pub fn create_command_executor(&self) -> Arc<dyn CommandExecutor> {
        Arc::new(UnixCommandExecutor::new(self.config.command_timeout))
    }

    /// Create the sink selected by the output configuration
    pub fn create_sink(&self, output: &OutputConfig) -> Arc<dyn AssignmentSink> {
        match &output.output {
            Some(path) if !output.json => Arc::new(FileAppendSink::new(path)),
            _ => Arc::new(StdoutSink::new()),
        }
    }

    /// Create the fabric environment service with all adapters wired in
    pub fn create_service(&self, output: OutputConfig) -> Arc<dyn FabricEnvService> {
        let executor = self.create_command_executor();

        let ensurer = self.config.install_missing.then(|| {
            DependencyEnsurer::new(Arc::new(SystemPackageInstaller::new(
                executor.clone(),
                self.config.install_timeout,
            )))
        });

        let infiniband = InfinibandDetector::new(
            Arc::new(IbstatProbe::new(executor.clone(), self.config.command_timeout)),
            Arc::new(SysfsClassTree::new(&self.config.ib_class_path)),
        );
        let ethernet = EthernetDetector::new(Arc::new(IprouteLinkProbe::new(
            executor,
            self.config.command_timeout,
        )));

        let sink = self.create_sink(&output);
        Arc::new(FabricEnvironmentService::new(
            ensurer, infiniband, ethernet, sink, output,
        ))
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new(ContainerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_file_overlays_defaults() {
        let file = ConfigFile::parse(
            Path::new("fabric_env.toml"),
            "command_timeout_secs = 5\ninstall_missing = false\n",
        )
        .unwrap();

        let config = file.apply(ContainerConfig::default());

        assert_eq!(config.command_timeout, Duration::from_secs(5));
        assert!(!config.install_missing);
        assert_eq!(config.install_timeout, Duration::from_secs(600));
        assert_eq!(config.ib_class_path, PathBuf::from("/sys/class/infiniband"));
    }

    #[test]
    fn test_unknown_config_keys_are_rejected() {
        let err = ConfigFile::parse(Path::new("fabric_env.toml"), "retries = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ib_class_path = \"/tmp/ib\"").unwrap();

        let config = ConfigFile::load(file.path())
            .unwrap()
            .apply(ContainerConfig::default());
        assert_eq!(config.ib_class_path, PathBuf::from("/tmp/ib"));

        let missing = ConfigFile::load(Path::new("/nonexistent/fabric_env.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_sink_selection() {
        let container = ServiceContainer::default();

        let stdout = container.create_sink(&OutputConfig::default());
        assert!(stdout.wants_exports());

        let file = container.create_sink(&OutputConfig {
            output: Some(PathBuf::from("/tmp/fabric.env")),
            ..Default::default()
        });
        assert!(!file.wants_exports());
        assert_eq!(file.describe(), "/tmp/fabric.env");
    }
}
