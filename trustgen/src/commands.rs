use anyhow::{Context, Result};
use clap::{Args, Parser};
use std::path::PathBuf;
use tracing::info;

use trustgen::common::{ConfigOverrides, OperatorConfig, RoleManifest};
use trustgen::policy::{serialize_document, TrustPolicyBuilder};
use trustgen::{AnnotationModeDetector, ConfigSnapshot, ModeDetector};

/// Where the operator configuration comes from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "TRUSTGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// AWS account ID owning the cluster OIDC provider
    #[arg(long, env = "AWS_ACCOUNT_ID")]
    pub aws_account_id: Option<String>,

    /// Cluster OIDC issuer URL
    #[arg(long, env = "OIDC_ISSUER_URL")]
    pub oidc_issuer_url: Option<String>,

    /// Comma separated ARNs trusted by default
    #[arg(long, env = "DEFAULT_TRUST_POLICY_ARNS")]
    pub default_trust_arns: Option<String>,
}

impl ConfigArgs {
    /// Load the file (if any) and layer command line values on top
    pub fn load(&self) -> Result<OperatorConfig> {
        let config = match &self.config {
            Some(path) => OperatorConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            // Command line and environment only
            None => OperatorConfig::default(),
        };

        Ok(config.apply_overrides(ConfigOverrides {
            aws_account_id: self.aws_account_id.clone(),
            oidc_issuer_url: self.oidc_issuer_url.clone(),
            default_trust_policy_arns: self.default_trust_arns.clone(),
        }))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Path to the Iamrole manifest
    #[arg(short, long)]
    pub role: PathBuf,

    /// Pretty print the generated document
    #[arg(long)]
    pub pretty: bool,
}

impl GenerateCommand {
    pub fn run(&self, config: &OperatorConfig) -> Result<()> {
        let request = RoleManifest::from_file(&self.role)
            .and_then(|manifest| manifest.into_request())
            .with_context(|| format!("Failed to load role from {}", self.role.display()))?;

        let mode = AnnotationModeDetector.detect(&request);
        config
            .validate_for_mode(&mode)
            .context("Invalid configuration")?;

        info!("Generating trust policy for namespace {}", request.namespace);

        let builder = TrustPolicyBuilder::new(AnnotationModeDetector);
        let output = if self.pretty {
            serialize_document(&builder.build_document(&request, config)?, true)?
        } else {
            builder.build(&request, config)?
        };

        println!("{}", output);
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CheckConfigCommand {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl CheckConfigCommand {
    pub fn run(&self, config: &OperatorConfig) -> Result<()> {
        config.validate().context("Invalid configuration")?;

        println!("✅ Configuration is valid");
        println!("   AWS account:      {}", config.aws_account_id());
        if config.oidc_issuer_url().is_empty() {
            println!("   OIDC issuer:      (not set, IRSA roles will not resolve)");
        } else {
            println!("   OIDC issuer:      {}", config.oidc_issuer_url());
        }
        println!(
            "   Default trust:    {} ARN(s)",
            config.trust_policy_arns().len()
        );
        for arn in config.trust_policy_arns() {
            println!("     - {}", arn);
        }
        Ok(())
    }
}
