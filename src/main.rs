// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use stackpilot::cli::commands::{Commands, DeployCommands, RemoveCommands, UpgradeCommands};
use stackpilot::cli::CliArgs;
use stackpilot::infrastructure::constants::LOG_ENV;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_log(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .with_env_var(LOG_ENV)
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_log(args.global.verbose);

    let global = &args.global;
    match args.command {
        Commands::Deploy(DeployCommands::Ingress(cmd)) => cmd.execute(global).await,
        Commands::Deploy(DeployCommands::Stack(cmd)) => cmd.execute(global).await,
        Commands::Upgrade(UpgradeCommands::Service(cmd)) => cmd.execute(global).await,
        Commands::Upgrade(UpgradeCommands::Services(cmd)) => cmd.execute(global).await,
        Commands::Remove(RemoveCommands::Ingress(cmd)) => cmd.execute(global).await,
        Commands::Remove(RemoveCommands::Namespace(cmd)) => cmd.execute(global).await,
        Commands::Exec(cmd) => cmd.execute(global).await,
    }
}
