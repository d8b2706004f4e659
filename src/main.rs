use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use setup_coolify::action::{
    self, commands::WorkflowCommands, error::ActionError, inputs::ActionInputs,
};
use setup_coolify::config::InstallerConfig;
use setup_coolify::version::types::{Installation, RequestedVersion};

#[derive(Parser)]
#[command(name = "setup-coolify")]
#[command(version, about = "Install coolify-cli and configure a Coolify context")]
struct Cli {
    /// JSON file overriding release locations and defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Install coolify-cli and add the context (default, reads INPUT_* variables)
    Run,
    /// Install coolify-cli into the tool cache without adding a context
    Install {
        /// Version to install, `latest` resolves through the release index
        #[arg(long = "tool-version", default_value = "latest")]
        tool_version: String,
    },
}

async fn execute(
    command: Command,
    config: &InstallerConfig,
    commands: &mut WorkflowCommands<std::io::Stdout>,
) -> Result<Installation, ActionError> {
    let installer = action::build_installer(config);
    match command {
        Command::Run => {
            let inputs = ActionInputs::from_env(&config.fallback_instance_url)?;
            action::run(&installer, config, &inputs, commands).await
        }
        Command::Install { tool_version } => {
            let version = RequestedVersion::parse(&tool_version);
            action::install(&installer, config, &version, commands).await
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    action::logging::init_logging()?;

    let config = match &cli.config {
        Some(path) => InstallerConfig::from_file(path)?,
        None => InstallerConfig::default(),
    }
    .with_env();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut commands = WorkflowCommands::from_env();
    let command = cli.command.unwrap_or(Command::Run);
    let result = runtime.block_on(execute(command, &config, &mut commands));

    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            commands.set_failed(&e.to_string())?;
            Ok(ExitCode::FAILURE)
        }
    }
}
