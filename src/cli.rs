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

//! Command line parsing
//!
//! Parsing never touches the system: `--help` and argument errors are decided
//! here, before any adapter is created.

use crate::container::{ConfigFile, ContainerConfig};
use crate::domain::{ConfigError, OutputConfig};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

const AFTER_HELP: &str = "\
If ibstat is missing it is installed with the system package manager
(apt-get, yum, dnf, pacman or zypper, via sudo) unless --no-install is given.

Examples:
  eval \"$(fabric_env)\"                     export settings into this shell
  fabric_env -v -o /etc/profile.d/fabric.sh  append settings for later sourcing";

/// Detect InfiniBand and Ethernet fabric and emit NCCL/UCX environment settings
#[derive(Debug, Parser)]
#[command(name = "fabric_env", after_help = AFTER_HELP)]
pub struct Cli {
    /// Print commentary lines and a detection summary
    #[arg(short, long)]
    pub verbose: bool,

    /// Append bare KEY=VALUE assignments to FILE instead of printing exports
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the detection result as JSON instead of assignments
    #[arg(long, conflicts_with = "output")]
    pub json: bool,

    /// Never install ibstat; read /sys/class/infiniband when it is missing
    #[arg(long)]
    pub no_install: bool,

    /// Timeout in seconds for each inspection command
    #[arg(long, value_name = "SECS", env = "FABRIC_ENV_TIMEOUT")]
    pub timeout: Option<u64>,

    /// TOML file with additional settings
    #[arg(long, value_name = "FILE", env = "FABRIC_ENV_CONFIG")]
    pub config: Option<PathBuf>,
}

/// What the binary should do after parsing its arguments
#[derive(Debug)]
pub enum CliAction {
    /// Run detection with these options
    Run(Cli),
    /// Print `usage` to stdout, `error` (if any) to stderr, and exit with `code`
    Exit {
        code: i32,
        usage: String,
        error: Option<String>,
    },
}

/// Usage text shared by `--help` and argument errors
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Parse process arguments (including the program name)
pub fn parse_args<I, T>(args: I) -> CliAction
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => CliAction::Run(cli),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => CliAction::Exit {
            code: 0,
            usage: usage(),
            error: None,
        },
        Err(e) => CliAction::Exit {
            code: 1,
            usage: usage(),
            error: e.to_string().lines().next().map(str::to_string),
        },
    }
}

impl Cli {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            verbose: self.verbose,
            output: self.output.clone(),
            json: self.json,
        }
    }

    /// Defaults, overlaid by the config file, overlaid by flags
    pub fn container_config(&self) -> Result<ContainerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ConfigFile::load(path)?.apply(ContainerConfig::default()),
            None => ContainerConfig::default(),
        };

        if let Some(secs) = self.timeout {
            config.command_timeout = Duration::from_secs(secs);
        }
        if self.no_install {
            config.install_missing = false;
        }

        Ok(config)
    }
}
