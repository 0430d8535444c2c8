// CLI command definitions

use super::workflows::{
    DeployIngressCommand, DeployStackCommand, ExecCommand, RemoveIngressCommand,
    RemoveNamespaceCommand, UpgradeServiceCommand, UpgradeServicesCommand,
};
use clap::{Args, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "stackpilot",
    version,
    about = "Deploy, upgrade and verify workloads on Rancher-managed clusters",
    long_about = "A CLI tool that drives the Rancher CLI to deploy ingresses and stacks, upgrade services and verify that the cluster reached the expected state"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Orchestrator full URL
    #[arg(long, global = true, env = "STACKPILOT_ORCHESTRATOR_URL", default_value = "")]
    pub orchestrator_url: String,

    /// Orchestrator access key
    #[arg(long, global = true, env = "STACKPILOT_ORCHESTRATOR_ACCESS_KEY", default_value = "")]
    pub orchestrator_access_key: String,

    /// Orchestrator secret key
    #[arg(
        long,
        global = true,
        env = "STACKPILOT_ORCHESTRATOR_SECRET_KEY",
        default_value = "",
        hide_env_values = true
    )]
    pub orchestrator_secret_key: String,

    /// Project ID used as login context
    #[arg(long, global = true, env = "STACKPILOT_PROJECT_ID", default_value = "")]
    pub project_id: String,

    /// Unique ID of this deployment (generated when absent)
    #[arg(long, global = true, env = "STACKPILOT_UNIQUE_ID")]
    pub unique_id: Option<String>,

    /// Path to a TOML file overriding check policies, templates and retry settings
    #[arg(long, global = true, env = "STACKPILOT_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    /// Dynamic configuration properties (-D key=value)
    ///
    /// Retry: retry.timeout (seconds)
    /// Checks: checks.<type>.max-retries, checks.<type>.initial-wait-delay (ms), checks.<type>.expect.<key>
    /// Replicas: replicas.<type>.status-key
    /// Templates: templates.directory, templates.destination, templates.ingress-file
    /// Stack: stack.deployable-kinds (comma-separated)
    ///
    /// Example: -Dchecks.deployment.max-retries=30 -Dretry.timeout=5
    #[arg(short = 'D', global = true, value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Activate verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Deploy an ingress or a stack
    #[command(subcommand)]
    Deploy(DeployCommands),

    /// Upgrade one or several services
    #[command(subcommand)]
    Upgrade(UpgradeCommands),

    /// Remove an ingress or a namespace
    #[command(subcommand)]
    Remove(RemoveCommands),

    /// Execute a command in a running service's pod
    Exec(ExecCommand),
}

#[derive(clap::Subcommand, Debug)]
pub enum DeployCommands {
    /// Deploy an ingress on namespace
    Ingress(DeployIngressCommand),

    /// Deploy a stack from yaml file on namespace
    Stack(DeployStackCommand),
}

#[derive(clap::Subcommand, Debug)]
pub enum UpgradeCommands {
    /// Upgrade a service
    Service(UpgradeServiceCommand),

    /// Upgrade multiple services concurrently
    Services(UpgradeServicesCommand),
}

#[derive(clap::Subcommand, Debug)]
pub enum RemoveCommands {
    /// Remove an ingress of namespace
    Ingress(RemoveIngressCommand),

    /// Remove a namespace
    #[command(alias = "ns")]
    Namespace(RemoveNamespaceCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_upgrade_services() {
        let args = CliArgs::try_parse_from([
            "stackpilot",
            "--orchestrator-url",
            "https://rancher.local",
            "upgrade",
            "services",
            "prod",
            "--services-list",
            r#"["api","worker"]"#,
            "-f",
            "-Dretry.timeout=1",
        ])
        .unwrap();

        assert_eq!(args.global.orchestrator_url, "https://rancher.local");
        assert_eq!(args.global.properties, vec!["retry.timeout=1"]);
        match args.command {
            Commands::Upgrade(UpgradeCommands::Services(cmd)) => {
                assert_eq!(cmd.namespace, "prod");
                assert!(cmd.force);
                assert_eq!(cmd.images_list, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_deploy_stack_defaults() {
        let args = CliArgs::try_parse_from([
            "stackpilot",
            "deploy",
            "stack",
            "staging",
            "--stack-file",
            "stack.yaml",
        ])
        .unwrap();

        match args.command {
            Commands::Deploy(DeployCommands::Stack(cmd)) => {
                assert_eq!(cmd.image, None);
                assert!(cmd.create_non_existing_namespace);
                assert!(!cmd.assert_against_template_replicas);
                assert_eq!(cmd.cert_from, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cert_copy_requires_ingress() {
        let result = CliArgs::try_parse_from([
            "stackpilot",
            "deploy",
            "stack",
            "staging",
            "--stack-file",
            "stack.yaml",
            "--cert-from",
            "shared",
        ]);
        assert!(result.is_err());
    }
}
