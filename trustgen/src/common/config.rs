use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

use super::error::{LoadError, LoadResult};
use super::TrustMode;

static ACCOUNT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12}$").expect("account id regex is valid"));

static IAM_ARN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-z-]*:iam::\d{12}:\S+$").expect("iam arn regex is valid")
});

/// Read-only view of the settings the trust policy builder depends on.
///
/// The builder only reads through this trait within a single call, so a
/// snapshot may be swapped out between calls by whoever owns it.
pub trait ConfigSnapshot {
    /// OIDC issuer URL of the cluster, normally with an `https://` scheme
    fn oidc_issuer_url(&self) -> &str;

    /// Account that owns the OIDC provider
    fn aws_account_id(&self) -> &str;

    /// Principals trusted by default when a role brings no trust policy
    fn trust_policy_arns(&self) -> &[String];
}

/// Operator configuration, usually loaded from a YAML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// AWS account ID hosting the cluster's OIDC provider
    #[serde(default)]
    pub aws_account_id: String,

    /// Cluster OIDC issuer URL
    #[serde(default)]
    pub oidc_issuer_url: String,

    /// ARNs trusted by roles that do not carry their own trust policy
    #[serde(default)]
    pub default_trust_policy_arns: Vec<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

/// Values supplied on the command line or through the environment.
/// Any field that is set replaces the value from the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub aws_account_id: Option<String>,
    pub oidc_issuer_url: Option<String>,
    pub default_trust_policy_arns: Option<String>,
}

impl OperatorConfig {
    pub fn from_yaml_str(contents: &str) -> LoadResult<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(account_id) = overrides.aws_account_id {
            self.aws_account_id = account_id;
        }
        if let Some(issuer) = overrides.oidc_issuer_url {
            self.oidc_issuer_url = issuer;
        }
        if let Some(arns) = overrides.default_trust_policy_arns {
            self.default_trust_policy_arns = parse_arn_list(&arns);
        }
        self
    }

    /// Check the configuration before it is handed to the builder
    pub fn validate(&self) -> LoadResult<()> {
        if !ACCOUNT_ID_REGEX.is_match(&self.aws_account_id) {
            return Err(LoadError::invalid(format!(
                "aws_account_id must be a 12 digit account ID, got '{}'",
                self.aws_account_id
            )));
        }

        if !self.oidc_issuer_url.is_empty() && !self.oidc_issuer_url.starts_with("https://") {
            return Err(LoadError::invalid(format!(
                "oidc_issuer_url must use the https scheme, got '{}'",
                self.oidc_issuer_url
            )));
        }

        if let Some(arn) = self
            .default_trust_policy_arns
            .iter()
            .find(|arn| !IAM_ARN_REGEX.is_match(arn))
        {
            return Err(LoadError::invalid(format!(
                "default trust policy ARN is not an IAM ARN: '{}'",
                arn
            )));
        }

        Ok(())
    }

    /// Validate, then check the settings the detected trust mode relies on
    pub fn validate_for_mode(&self, mode: &TrustMode) -> LoadResult<()> {
        self.validate()?;

        if let TrustMode::Federated { identity_name } = mode {
            if self.oidc_issuer_url.is_empty() {
                return Err(LoadError::invalid(format!(
                    "oidc_issuer_url is required to trust service account '{}'",
                    identity_name
                )));
            }
        }

        Ok(())
    }
}

impl ConfigSnapshot for OperatorConfig {
    fn oidc_issuer_url(&self) -> &str {
        &self.oidc_issuer_url
    }

    fn aws_account_id(&self) -> &str {
        &self.aws_account_id
    }

    fn trust_policy_arns(&self) -> &[String] {
        &self.default_trust_policy_arns
    }
}

/// Split a comma separated ARN list, dropping blank entries
pub fn parse_arn_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|arn| !arn.is_empty())
        .map(String::from)
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> OperatorConfig {
        OperatorConfig {
            aws_account_id: "123456789012".to_string(),
            oidc_issuer_url: "https://oidc.eks.example.com/id/ABCD".to_string(),
            default_trust_policy_arns: vec!["arn:aws:iam::111111111111:root".to_string()],
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
aws_account_id: "123456789012"
oidc_issuer_url: https://oidc.eks.example.com/id/ABCD
default_trust_policy_arns:
  - arn:aws:iam::111111111111:root
  - arn:aws:iam::222222222222:role/deployer
"#;
        let config = OperatorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.aws_account_id(), "123456789012");
        assert_eq!(config.trust_policy_arns().len(), 2);
        assert_eq!(
            config.trust_policy_arns()[1],
            "arn:aws:iam::222222222222:role/deployer"
        );
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
    }

    #[test]
    fn test_missing_arns_default_to_empty() {
        let config = OperatorConfig::from_yaml_str("aws_account_id: \"123456789012\"").unwrap();
        assert!(config.trust_policy_arns().is_empty());
        assert!(config.oidc_issuer_url().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "aws_account_id: \"123456789012\"").unwrap();
        writeln!(file, "logging:\n  level: debug\n  json_format: true").unwrap();

        let config = OperatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.aws_account_id, "123456789012");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OperatorConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = valid_config().apply_overrides(ConfigOverrides {
            aws_account_id: Some("999999999999".to_string()),
            oidc_issuer_url: None,
            default_trust_policy_arns: Some(
                "arn:aws:iam::333333333333:root, ,arn:aws:iam::444444444444:root".to_string(),
            ),
        });

        assert_eq!(config.aws_account_id, "999999999999");
        assert_eq!(config.oidc_issuer_url, "https://oidc.eks.example.com/id/ABCD");
        assert_eq!(
            config.default_trust_policy_arns,
            vec![
                "arn:aws:iam::333333333333:root".to_string(),
                "arn:aws:iam::444444444444:root".to_string()
            ]
        );
    }

    #[test]
    fn test_validate() {
        assert!(valid_config().validate().is_ok());

        let mut config = valid_config();
        config.aws_account_id = "12345".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.oidc_issuer_url = "http://oidc.eks.example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.oidc_issuer_url.clear();
        assert!(config.validate().is_ok());

        let mut config = valid_config();
        config.default_trust_policy_arns.push("not-an-arn".to_string());
        assert!(matches!(
            config.validate(),
            Err(LoadError::Invalid { .. })
        ));
    }

    #[test]
    fn test_federated_mode_requires_issuer() {
        let federated = TrustMode::Federated {
            identity_name: "sa".to_string(),
        };

        let mut config = valid_config();
        assert!(config.validate_for_mode(&federated).is_ok());

        config.oidc_issuer_url.clear();
        assert!(config.validate_for_mode(&TrustMode::DefaultTrust).is_ok());

        let err = config.validate_for_mode(&federated).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
        assert!(err.to_string().contains("'sa'"));
    }
}
