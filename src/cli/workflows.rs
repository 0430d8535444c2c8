//! Command handlers for deploy, upgrade, remove and exec

use super::commands::GlobalArgs;
use super::display::{ConsoleReporter, StatusIcon, TableRenderer};
use crate::domain::config::{apply_to_app_config, parse_dynamic_configs, AppConfig, OrchestratorConfig};
use crate::domain::resource::{parse_name_list, IngressDescriptor, ResourceDescriptor, ResourceType};
use crate::domain::workflow::{
    deploy_ingress, deploy_stack, exec_in_service, remove_ingress, remove_namespace,
    upgrade_service, upgrade_services, ResourceResult, WorkflowContext,
};
use crate::infrastructure::{FsTemplateSource, ShellExecutor};
use crate::shared::error::Result;
use clap::{ArgAction, Parser};
use colored::Colorize;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
pub struct DeployIngressCommand {
    /// Target namespace
    pub namespace: String,

    /// Ingress as JSON: {"name":..,"host":..,"backend":..,"port":..,"cert":..,"issuer":..}
    #[arg(long)]
    pub ingress: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DeployStackCommand {
    /// Target namespace
    pub namespace: String,

    /// Stack manifest template
    #[arg(long, value_name = "PATH")]
    pub stack_file: String,

    /// Image tag substituted in the stack template
    #[arg(long)]
    pub image: Option<String>,

    /// Ingress as JSON, deployed alongside the stack
    #[arg(long)]
    pub ingress: Option<String>,

    /// Create the namespace when it does not exist
    #[arg(long, alias = "cn", default_value_t = true, action = ArgAction::Set)]
    pub create_non_existing_namespace: bool,

    /// Copy the ingress certificate secret from another namespace
    #[arg(
        long = "copy-certificate-from-namespace",
        aliases = ["cert-from", "cf"],
        requires = "ingress",
        value_name = "NAMESPACE"
    )]
    pub cert_from: Option<String>,

    /// Check ready replicas against the replica count declared in the template
    #[arg(long, aliases = ["template-replicas", "tr"])]
    pub assert_against_template_replicas: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct UpgradeServiceCommand {
    /// Service to upgrade
    pub service: String,

    /// Namespace of the service
    pub namespace: String,

    /// New image. The current image is redeployed when absent
    #[arg(long)]
    pub image: Option<String>,

    /// Upgrade even when the workload is not in a stable state
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Workload type (deployment or statefulset)
    #[arg(long = "type", value_name = "TYPE")]
    pub resource_type: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct UpgradeServicesCommand {
    /// Namespace of the services
    pub namespace: String,

    /// Services to upgrade, as a JSON array or comma-separated list
    #[arg(long)]
    pub services_list: String,

    /// Images paired by position with the services
    #[arg(long)]
    pub images_list: Option<String>,

    /// Upgrade even when a workload is not in a stable state
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RemoveIngressCommand {
    /// Ingress name
    pub ingress: String,

    /// Namespace of the ingress
    pub namespace: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RemoveNamespaceCommand {
    /// Namespace to remove
    pub namespace: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ExecCommand {
    /// Service whose pod runs the command
    pub service: String,

    /// Namespace of the service
    pub namespace: String,

    /// Command line to execute inside the pod
    #[arg(long)]
    pub exec_command: String,
}

impl DeployIngressCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let ingress = IngressDescriptor::from_json(&self.ingress)?;
        let descriptor = base_descriptor(global, &self.namespace).with_ingress(ingress);
        let ctx = open_context(global, &descriptor, ingress_rows(&descriptor))?;

        let outcome = finish(
            deploy_ingress(&ctx, &descriptor).await,
            "Ingress was deployed",
            "Ingress was not deployed",
        )?;
        if !outcome.is_matched() {
            println!(
                "{} Ingress state was not verified, check it in the orchestrator UI",
                StatusIcon::ERROR.red()
            );
        }
        Ok(())
    }
}

impl DeployStackCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let mut descriptor = base_descriptor(global, &self.namespace)
            .with_image(self.image.clone())
            .with_namespace_creation(self.create_non_existing_namespace)
            .with_template_replica_assertion(self.assert_against_template_replicas)
            .with_certificate_source(self.cert_from.clone());
        if let Some(raw) = &self.ingress {
            descriptor = descriptor.with_ingress(IngressDescriptor::from_json(raw)?);
        }

        let mut rows = vec![("stack-file", self.stack_file.clone())];
        if let Some(image) = &self.image {
            rows.push(("image", image.clone()));
        }
        rows.push((
            "create-namespace",
            self.create_non_existing_namespace.to_string(),
        ));
        if let Some(source) = &self.cert_from {
            rows.push(("certificate-from", source.clone()));
        }
        rows.extend(ingress_rows(&descriptor));
        let ctx = open_context(global, &descriptor, rows)?;

        let deployment = finish(
            deploy_stack(&ctx, &descriptor, &self.stack_file).await,
            "Stack was deployed",
            "Stack was not deployed",
        )?;
        print_results("Stack", &deployment.results);
        Ok(())
    }
}

impl UpgradeServiceCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let explicit = self
            .resource_type
            .as_deref()
            .map(str::parse::<ResourceType>)
            .transpose()?;
        let descriptor = base_descriptor(global, &self.namespace)
            .with_service(self.service.as_str())
            .with_type(ResourceType::resolve(false, explicit))
            .with_image(self.image.clone())
            .with_force(self.force);

        let mut rows = vec![("service", self.service.clone())];
        if let Some(image) = &self.image {
            rows.push(("image", image.clone()));
        }
        rows.push(("force", self.force.to_string()));
        let ctx = open_context(global, &descriptor, rows)?;

        let result = finish(
            upgrade_service(&ctx, &descriptor).await,
            "Service upgraded",
            "Service was not upgraded",
        )?;
        print_results("Upgrade", std::slice::from_ref(&result));
        Ok(())
    }
}

impl UpgradeServicesCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let services = parse_name_list(&self.services_list)?;
        let images = match &self.images_list {
            Some(raw) => parse_name_list(raw)?,
            None => Vec::new(),
        };
        let descriptor = base_descriptor(global, &self.namespace).with_force(self.force);

        let mut rows = vec![("services", services.join(", "))];
        if !images.is_empty() {
            rows.push(("images", images.join(", ")));
        }
        rows.push(("force", self.force.to_string()));
        let ctx = open_context(global, &descriptor, rows)?;

        let results = finish(
            upgrade_services(&ctx, &descriptor, &services, &images).await,
            "Services upgraded",
            "Services were not upgraded",
        )?;
        print_results("Upgrade", &results);
        Ok(())
    }
}

impl RemoveIngressCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let descriptor = base_descriptor(global, &self.namespace)
            .with_ingress(IngressDescriptor::named(self.ingress.as_str()));
        let ctx = open_context(global, &descriptor, vec![("ingress", self.ingress.clone())])?;

        finish(
            remove_ingress(&ctx, &descriptor).await,
            "Ingress was removed",
            "Ingress was not removed",
        )?;
        Ok(())
    }
}

impl RemoveNamespaceCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let descriptor = base_descriptor(global, &self.namespace);
        let ctx = open_context(global, &descriptor, Vec::new())?;

        finish(
            remove_namespace(&ctx, &descriptor).await,
            "Namespace was removed",
            "Namespace was not removed",
        )?;
        Ok(())
    }
}

impl ExecCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let descriptor = base_descriptor(global, &self.namespace).with_service(self.service.as_str());
        let rows = vec![
            ("service", self.service.clone()),
            ("command", self.exec_command.clone()),
        ];
        let ctx = open_context(global, &descriptor, rows)?;

        let result = finish(
            exec_in_service(&ctx, &descriptor, &self.exec_command).await,
            "Command was executed",
            "Command was not executed",
        )?;
        println!("{}", format!("[{}]", result.pod).bright_black());
        println!("{}", result.output);
        Ok(())
    }
}

fn base_descriptor(global: &GlobalArgs, namespace: &str) -> ResourceDescriptor {
    ResourceDescriptor::new(namespace)
        .with_unique_id(global.unique_id.clone())
        .with_verbose(global.verbose)
}

/// Settings file, then `-D` overrides on top.
fn load_app_config(global: &GlobalArgs) -> anyhow::Result<AppConfig> {
    let mut config = match &global.config {
        Some(path) => AppConfig::from_file(path)?,
        None => {
            tracing::debug!("No configuration file specified, using default settings");
            AppConfig::default()
        }
    };

    if !global.properties.is_empty() {
        let dynamic = parse_dynamic_configs(&global.properties)
            .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
        apply_to_app_config(&dynamic, &mut config);
        config.validate()?;
    }

    Ok(config)
}

fn orchestrator_config(global: &GlobalArgs) -> anyhow::Result<OrchestratorConfig> {
    let orchestrator = OrchestratorConfig::new(
        global.orchestrator_url.as_str(),
        global.orchestrator_access_key.as_str(),
        global.orchestrator_secret_key.as_str(),
        global.project_id.as_str(),
    );
    orchestrator.validate()?;
    Ok(orchestrator)
}

/// Validate settings, print the startup summary and wire the workflow collaborators.
fn open_context(
    global: &GlobalArgs,
    descriptor: &ResourceDescriptor,
    extra_rows: Vec<(&'static str, String)>,
) -> anyhow::Result<WorkflowContext> {
    let config = load_app_config(global)?;
    let orchestrator = orchestrator_config(global)?;

    let mut rows = orchestrator.summary();
    rows.push(("unique-id", descriptor.unique_id.clone()));
    rows.push(("namespace", descriptor.namespace.clone()));
    rows.extend(extra_rows);
    println!("{}", "Starting with configuration:".bold());
    println!("{}", TableRenderer::new().render_settings(&rows));

    let ctx = WorkflowContext::new(
        Arc::new(config),
        orchestrator,
        Arc::new(ShellExecutor::new()),
        Arc::new(FsTemplateSource),
        Arc::new(ConsoleReporter::new()),
    )?;
    Ok(ctx)
}

fn ingress_rows(descriptor: &ResourceDescriptor) -> Vec<(&'static str, String)> {
    match &descriptor.ingress {
        Some(ingress) => vec![
            ("ingress-name", ingress.name.clone()),
            ("ingress-host", ingress.host.clone()),
            ("ingress-backend", format!("{}:{}", ingress.backend, ingress.port)),
            ("ingress-cert", ingress.cert.clone()),
            ("ingress-issuer", ingress.issuer.clone()),
        ],
        None => Vec::new(),
    }
}

/// Print the final status line of a command.
fn finish<T>(result: Result<T>, success: &str, failure: &str) -> anyhow::Result<T> {
    match result {
        Ok(value) => {
            println!("{} {}", StatusIcon::SUCCESS.green(), success.green());
            Ok(value)
        }
        Err(e) => {
            println!("{} {}", StatusIcon::ERROR.red(), failure.red());
            Err(anyhow::Error::from(e).context(failure.to_string()))
        }
    }
}

fn print_results(title: &str, results: &[ResourceResult]) {
    println!("{}", TableRenderer::new().render_results(title, results));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::DeployError;

    fn global(properties: &[&str]) -> GlobalArgs {
        GlobalArgs {
            orchestrator_url: "https://rancher.local".to_string(),
            orchestrator_access_key: "token-abc".to_string(),
            orchestrator_secret_key: "secret".to_string(),
            project_id: "c-1:p-1".to_string(),
            unique_id: Some("run-1".to_string()),
            config: None,
            properties: properties.iter().map(|s| s.to_string()).collect(),
            verbose: false,
        }
    }

    #[test]
    fn test_load_app_config_with_overrides() {
        let config = load_app_config(&global(&[
            "retry.timeout=2",
            "checks.deployment.max-retries=4",
        ]))
        .unwrap();
        assert_eq!(config.retry_timeout_secs, 2);
        assert_eq!(config.checks.deployment.max_retries, 4);
    }

    #[test]
    fn test_load_app_config_rejects_malformed_property() {
        assert!(load_app_config(&global(&["retry.timeout"])).is_err());
    }

    #[test]
    fn test_orchestrator_config_requires_credentials() {
        let mut args = global(&[]);
        args.orchestrator_access_key.clear();
        let err = orchestrator_config(&args).unwrap_err();
        assert!(err.to_string().contains("orchestrator-access-key"));
    }

    #[test]
    fn test_base_descriptor_keeps_unique_id() {
        let descriptor = base_descriptor(&global(&[]), "staging");
        assert_eq!(descriptor.namespace, "staging");
        assert_eq!(descriptor.unique_id, "run-1");
    }

    #[test]
    fn test_finish_wraps_failure() {
        let result: Result<()> = Err(DeployError::validation("boom"));
        let err = finish(result, "done", "Stack was not deployed").unwrap_err();
        assert_eq!(err.to_string(), "Stack was not deployed");
        assert!(format!("{:#}", err).contains("boom"));
    }

    #[test]
    fn test_ingress_rows() {
        let descriptor = base_descriptor(&global(&[]), "staging")
            .with_ingress(IngressDescriptor::named("web"));
        let rows = ingress_rows(&descriptor);
        assert_eq!(rows[0], ("ingress-name", "web".to_string()));
    }
}
