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

//! Fabric Environment Library
//!
//! Detects InfiniBand host channel adapters and Ethernet interfaces on the
//! local host and turns the result into NCCL and UCX environment assignments,
//! using a Ports and Adapters (Hexagonal) architecture for testability.
//!
//! # Architecture
//!
//! - **Domain**: Entities, classification rules, formatting and services
//! - **Ports**: Interfaces for external interactions (`ibstat`, `ip`, sysfs,
//!   package managers, output sinks)
//! - **Adapters**: Implementations backed by system commands and files
//!
//! # Usage
//!
//! ```rust,no_run
//! use fabric_env::{ContainerConfig, FabricEnvService, OutputConfig, ServiceContainer};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = ServiceContainer::new(ContainerConfig::default());
//!     let service = container.create_service(OutputConfig::default());
//!
//!     let result = service.run().await?;
//!     eprintln!("InfiniBand: {}", result.ib_device_list());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod container;
pub mod domain;
pub mod ports;

pub use adapters::{
    FileAppendSink, IbstatProbe, IprouteLinkProbe, StdoutSink, SysfsClassTree,
    SystemPackageInstaller, UnixCommandExecutor,
};
pub use container::{ConfigFile, ContainerConfig, ServiceContainer};
pub use domain::{
    DetectionResult, FabricEnvError, FabricEnvironmentService, IbPort, NetworkDevice,
    OutputConfig,
};
pub use ports::{
    AssignmentSink, CommandExecutor, FabricEnvService, InfiniBandClassTree, InfiniBandProbe,
    LinkProbe, PackageInstaller,
};
