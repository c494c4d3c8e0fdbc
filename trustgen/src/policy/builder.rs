//! Trust policy construction.
//!
//! A role is either federated (a service account assumes it through the
//! cluster OIDC provider) or trusted by the configured default ARNs. Statements
//! from the role's own trust policy are appended after the generated ones.

use tracing::{debug, error, warn};

use super::error::{TrustPolicyError, TrustPolicyResult};
use crate::common::{
    AnnotationModeDetector, AssumeRolePolicyDocument, Condition, ConfigSnapshot, Effect,
    ModeDetector, Principal, RoleRequest, TrustMode, TrustPolicyStatement, ACTION_ASSUME_ROLE,
    ACTION_ASSUME_ROLE_WITH_WEB_IDENTITY,
};

/// Build the trust policy for `request` using annotation based mode detection
pub fn build_trust_policy<C>(request: &RoleRequest, config: &C) -> TrustPolicyResult<String>
where
    C: ConfigSnapshot + ?Sized,
{
    TrustPolicyBuilder::new(AnnotationModeDetector).build(request, config)
}

/// Serialize a document, compact unless `pretty` is set
pub fn serialize_document(
    document: &AssumeRolePolicyDocument,
    pretty: bool,
) -> TrustPolicyResult<String> {
    let output = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    output.map_err(|e| {
        error!("malformed trust policy document, unable to serialize it: {}", e);
        TrustPolicyError::from(e)
    })
}

#[derive(Debug, Clone, Default)]
pub struct TrustPolicyBuilder<D = AnnotationModeDetector> {
    detector: D,
}

impl<D: ModeDetector> TrustPolicyBuilder<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    /// Build and serialize the trust policy as compact JSON
    pub fn build<C>(&self, request: &RoleRequest, config: &C) -> TrustPolicyResult<String>
    where
        C: ConfigSnapshot + ?Sized,
    {
        let document = self.build_document(request, config)?;
        let output = serialize_document(&document, false)?;
        debug!(
            namespace = %request.namespace,
            trust_policy = %output,
            "trust policy generated successfully"
        );
        Ok(output)
    }

    /// Assemble the trust policy document without serializing it
    pub fn build_document<C>(
        &self,
        request: &RoleRequest,
        config: &C,
    ) -> TrustPolicyResult<AssumeRolePolicyDocument>
    where
        C: ConfigSnapshot + ?Sized,
    {
        let user_statements = request.user_statements();
        let mut statements = Vec::with_capacity(user_statements.len() + 1);

        match self.detector.detect(request) {
            TrustMode::Federated { identity_name } => {
                statements.push(federated_statement(
                    config,
                    &request.namespace,
                    &identity_name,
                ));
                if !user_statements.is_empty() {
                    warn!(
                        namespace = %request.namespace,
                        service_account = %identity_name,
                        extra_statements = user_statements.len(),
                        "federated role also trusts statements from its own trust policy"
                    );
                }
            }
            TrustMode::DefaultTrust if user_statements.is_empty() => {
                let arns = config.trust_policy_arns();
                if arns.is_empty() {
                    error!(
                        namespace = %request.namespace,
                        "default trust policy is not configured and the role provides none"
                    );
                    return Err(TrustPolicyError::MissingDefaultTrustConfig);
                }
                statements.push(default_trust_statement(arns));
            }
            // The role's own statements stand in for the default trust
            TrustMode::DefaultTrust => {}
        }

        statements.extend_from_slice(user_statements);
        Ok(AssumeRolePolicyDocument::new(statements))
    }
}

/// Issuer URL without its `https://` scheme
pub fn issuer_host(issuer_url: &str) -> &str {
    issuer_url.strip_prefix("https://").unwrap_or(issuer_url)
}

fn federated_statement<C>(config: &C, namespace: &str, identity_name: &str) -> TrustPolicyStatement
where
    C: ConfigSnapshot + ?Sized,
{
    let host = issuer_host(config.oidc_issuer_url());
    TrustPolicyStatement {
        effect: Effect::Allow,
        action: ACTION_ASSUME_ROLE_WITH_WEB_IDENTITY.to_string(),
        principal: Principal::Federated(format!(
            "arn:aws:iam::{}:oidc-provider/{}",
            config.aws_account_id(),
            host
        )),
        condition: Some(Condition::string_equals(
            format!("{}:sub", host),
            format!("system:serviceaccount:{}:{}", namespace, identity_name),
        )),
    }
}

fn default_trust_statement(arns: &[String]) -> TrustPolicyStatement {
    TrustPolicyStatement {
        effect: Effect::Allow,
        action: ACTION_ASSUME_ROLE.to_string(),
        principal: Principal::Aws(arns.to_vec()),
        condition: None,
    }
}
