use thiserror::Error;

/// Errors that can occur while building a trust policy
#[derive(Error, Debug)]
pub enum TrustPolicyError {
    #[error(
        "default trust policy ARNs are not configured; configure default trust ARNs or provide a trust policy on the role"
    )]
    MissingDefaultTrustConfig,

    #[error("malformed trust policy document, unable to serialize it: {source}")]
    SerializationFailure {
        #[from]
        source: serde_json::Error,
    },
}

impl TrustPolicyError {
    /// Both kinds are deterministic in their inputs, so retrying never helps
    pub fn is_retryable(&self) -> bool {
        false
    }
}

pub type TrustPolicyResult<T> = Result<T, TrustPolicyError>;
