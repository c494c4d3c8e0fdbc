//! IAM trust policy generation for Kubernetes managed roles.
//!
//! - `common`: role requests, policy document types, configuration and manifests
//! - `policy`: the trust policy builder and its errors

pub mod common;
pub mod policy;

pub use common::{
    AnnotationModeDetector, AssumeRolePolicyDocument, ConfigSnapshot, ModeDetector,
    OperatorConfig, RoleManifest, RoleRequest, TrustMode, TrustPolicyStatement,
};
pub use policy::{build_trust_policy, TrustPolicyBuilder, TrustPolicyError, TrustPolicyResult};
