use solana_client::client_error::ClientError;
use solana_program::pubkey::Pubkey;

/// Errors surfaced by the SDK.
///
/// Decoding never fails with an error: an account that is missing, owned by
/// another program, or tagged with another discriminator comes back as `None`.
#[derive(Debug, thiserror::Error)]
pub enum StakingSdkError {
    #[error("No off-curve bump found for seeds {seeds:?}")]
    DerivationExhausted { seeds: Vec<Vec<u8>> },

    #[error("Value {value} for `{field}` exceeds maximum {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: u128,
        max: u128,
    },

    #[error("RPC request failed: {0}")]
    Rpc(#[from] ClientError),

    #[error("Global config {0} is missing or does not decode; wrong program id or cluster?")]
    DeploymentMismatch(Pubkey),

    #[error("Transaction must contain at least one instruction")]
    EmptyTransaction,

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StakingSdkError {
    fn from(e: std::io::Error) -> Self {
        StakingSdkError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for StakingSdkError {
    fn from(e: bincode::Error) -> Self {
        StakingSdkError::Serialization(e.to_string())
    }
}

impl StakingSdkError {
    /// Whether retrying the same read may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StakingSdkError::Rpc(_))
    }
}

pub type Result<T> = std::result::Result<T, StakingSdkError>;
