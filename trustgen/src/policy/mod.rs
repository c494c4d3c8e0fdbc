pub mod builder;
mod error;

pub use builder::{build_trust_policy, issuer_host, serialize_document, TrustPolicyBuilder};
pub use error::{TrustPolicyError, TrustPolicyResult};
