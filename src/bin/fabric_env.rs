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

use fabric_env::cli::{parse_args, Cli, CliAction};
use fabric_env::{FabricEnvError, ServiceContainer};
use log::debug;
use std::io::Write;
use std::process::exit;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), FabricEnvError> {
    let config = cli.container_config()?;
    debug!("Configuration: {config:?}");

    let container = ServiceContainer::new(config);
    let service = container.create_service(cli.output_config());
    service.run().await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match parse_args(std::env::args_os()) {
        CliAction::Run(cli) => cli,
        CliAction::Exit { code, usage, error } => {
            if let Some(error) = error {
                eprintln!("{error}");
            }
            println!("{}", usage.trim_end());
            exit(code);
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        exit(1);
    }
}
