use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::annotations::IRSA_ANNOTATION;
use super::error::{LoadError, LoadResult};
use super::{AssumeRolePolicyDocument, RoleRequest};

/// Kubernetes `Iamrole` resource, reduced to the fields that shape trust
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleManifest {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: RoleSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    #[serde(
        rename = "AssumeRolePolicyDocument",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assume_role_policy_document: Option<AssumeRolePolicyDocument>,
}

impl RoleManifest {
    pub fn from_yaml_str(contents: &str) -> LoadResult<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn into_request(self) -> LoadResult<RoleRequest> {
        let namespace = self
            .metadata
            .namespace
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty())
            .ok_or_else(|| {
                LoadError::invalid(format!(
                    "role '{}' has no namespace",
                    self.metadata.name.as_deref().unwrap_or("<unnamed>")
                ))
            })?;

        let mut annotations = self.metadata.annotations;
        Ok(RoleRequest {
            namespace,
            federation_annotation: annotations.remove(IRSA_ANNOTATION),
            user_trust_policy: self.spec.assume_role_policy_document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Principal;

    const IRSA_ROLE: &str = r#"
apiVersion: iammanager.keikoproj.io/v1alpha1
kind: Iamrole
metadata:
  name: reader
  namespace: team-a
  annotations:
    iam.amazonaws.com/irsa-service-account: svc-reader
spec:
  AssumeRolePolicyDocument:
    Statement: []
"#;

    const CROSS_ACCOUNT_ROLE: &str = r#"
kind: Iamrole
metadata:
  name: deployer
  namespace: team-b
spec:
  AssumeRolePolicyDocument:
    Version: "2012-10-17"
    Statement:
      - Effect: Allow
        Action: sts:AssumeRole
        Principal:
          AWS: arn:aws:iam::222222222222:role/ci
"#;

    #[test]
    fn test_irsa_manifest_to_request() {
        let request = RoleManifest::from_yaml_str(IRSA_ROLE)
            .unwrap()
            .into_request()
            .unwrap();

        assert_eq!(request.namespace, "team-a");
        assert_eq!(request.federation_annotation.as_deref(), Some("svc-reader"));
        assert!(request.user_trust_policy.is_some());
        assert!(request.user_statements().is_empty());
    }

    #[test]
    fn test_manifest_with_trust_policy() {
        let request = RoleManifest::from_yaml_str(CROSS_ACCOUNT_ROLE)
            .unwrap()
            .into_request()
            .unwrap();

        assert!(request.federation_annotation.is_none());
        let statements = request.user_statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].principal,
            Principal::Aws(vec!["arn:aws:iam::222222222222:role/ci".to_string()])
        );
    }

    #[test]
    fn test_manifest_without_namespace() {
        let manifest = RoleManifest::from_yaml_str("metadata:\n  name: orphan\n").unwrap();
        let err = manifest.into_request().unwrap_err();
        assert!(err.to_string().contains("orphan"));
    }

    #[test]
    fn test_namespace_is_trimmed() {
        let request = RoleManifest::from_yaml_str("metadata:\n  namespace: \"  team-a \"\n")
            .unwrap()
            .into_request()
            .unwrap();
        assert_eq!(request.namespace, "team-a");

        let manifest =
            RoleManifest::from_yaml_str("metadata:\n  name: blank\n  namespace: \"   \"\n").unwrap();
        assert!(manifest.into_request().is_err());
    }

    #[test]
    fn test_malformed_manifest() {
        let err = RoleManifest::from_yaml_str("metadata: [").unwrap_err();
        assert!(matches!(err, LoadError::Yaml { .. }));
    }
}
