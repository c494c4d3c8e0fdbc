use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// IAM policy language version stamped on every generated document
pub const POLICY_VERSION: &str = "2012-10-17";

pub const ACTION_ASSUME_ROLE: &str = "sts:AssumeRole";
pub const ACTION_ASSUME_ROLE_WITH_WEB_IDENTITY: &str = "sts:AssumeRoleWithWebIdentity";

/// Role intent handed to the trust policy builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRequest {
    /// Kubernetes namespace the role belongs to
    pub namespace: String,

    /// Raw value of the federation annotation, if the role carries one
    pub federation_annotation: Option<String>,

    /// Trust policy supplied by the caller on the role spec
    pub user_trust_policy: Option<AssumeRolePolicyDocument>,
}

impl RoleRequest {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            federation_annotation: None,
            user_trust_policy: None,
        }
    }

    pub fn with_federation_annotation(mut self, value: impl Into<String>) -> Self {
        self.federation_annotation = Some(value.into());
        self
    }

    pub fn with_trust_policy(mut self, policy: AssumeRolePolicyDocument) -> Self {
        self.user_trust_policy = Some(policy);
        self
    }

    /// Statements from the caller's trust policy, empty when none was supplied
    pub fn user_statements(&self) -> &[TrustPolicyStatement] {
        self.user_trust_policy
            .as_ref()
            .map(|policy| policy.statement.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Who a statement grants access to. Exactly one principal kind per statement.
///
/// Read from a plain `{"AWS": ...}` style map so JSON and YAML documents
/// share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PrincipalFields")]
pub enum Principal {
    #[serde(rename = "AWS")]
    Aws(Vec<String>),
    Federated(String),
    Service(String),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PrincipalFields {
    #[serde(rename = "AWS", default, deserialize_with = "some_one_or_many")]
    aws: Option<Vec<String>>,
    #[serde(rename = "Federated", default)]
    federated: Option<String>,
    #[serde(rename = "Service", default)]
    service: Option<String>,
}

impl TryFrom<PrincipalFields> for Principal {
    type Error = String;

    fn try_from(fields: PrincipalFields) -> Result<Self, Self::Error> {
        match (fields.aws, fields.federated, fields.service) {
            (Some(arns), None, None) if !arns.is_empty() => Ok(Principal::Aws(arns)),
            (Some(_), None, None) => Err("AWS principal list must not be empty".to_string()),
            (None, Some(federated), None) => Ok(Principal::Federated(federated)),
            (None, None, Some(service)) => Ok(Principal::Service(service)),
            (None, None, None) => {
                Err("principal must set one of AWS, Federated or Service".to_string())
            }
            _ => Err("principal must set only one of AWS, Federated or Service".to_string()),
        }
    }
}

/// Condition block; unknown operators are rejected instead of being dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    #[serde(
        rename = "StringEquals",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub string_equals: BTreeMap<String, String>,

    #[serde(
        rename = "StringLike",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub string_like: BTreeMap<String, String>,
}

impl Condition {
    pub fn string_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut string_equals = BTreeMap::new();
        string_equals.insert(key.into(), value.into());
        Self {
            string_equals,
            string_like: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrustPolicyStatement {
    pub effect: Effect,
    pub action: String,
    pub principal: Principal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumeRolePolicyDocument {
    #[serde(default = "default_policy_version")]
    pub version: String,
    #[serde(default)]
    pub statement: Vec<TrustPolicyStatement>,
}

impl AssumeRolePolicyDocument {
    pub fn new(statement: Vec<TrustPolicyStatement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }
}

fn default_policy_version() -> String {
    POLICY_VERSION.to_string()
}

fn some_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    one_or_many(deserializer).map(Some)
}

// IAM accepts either a bare string or a list for AWS principals
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
