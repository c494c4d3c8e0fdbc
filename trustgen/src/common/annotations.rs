use super::RoleRequest;

/// Annotation that marks a role as assumable by a Kubernetes service account
pub const IRSA_ANNOTATION: &str = "iam.amazonaws.com/irsa-service-account";

/// Trust model chosen for a role request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustMode {
    /// Web identity federation through the cluster OIDC provider
    Federated { identity_name: String },
    /// Cross-account trust using the configured default ARNs
    DefaultTrust,
}

/// Decides which trust model applies to a request
pub trait ModeDetector {
    fn detect(&self, request: &RoleRequest) -> TrustMode;
}

/// Detects federation from the request's IRSA annotation value
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationModeDetector;

impl ModeDetector for AnnotationModeDetector {
    fn detect(&self, request: &RoleRequest) -> TrustMode {
        match request.federation_annotation.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => TrustMode::Federated {
                identity_name: name.to_string(),
            },
            _ => TrustMode::DefaultTrust,
        }
    }
}
