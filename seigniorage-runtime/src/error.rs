use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Wallet is not unlocked: {operation} requires a bound signer")]
    UnboundSigner { operation: String },

    #[error("A signer is already bound to this session")]
    SignerAlreadyBound,

    #[error("Unknown contract: {0}")]
    UnknownContract(String),

    #[error("Contract {name} is a {actual} contract, expected {expected}")]
    RoleMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Read failed: {contract}.{method}: {message}")]
    RemoteRead {
        contract: String,
        method: String,
        message: String,
    },

    #[error("Transaction failed: {contract}.{method}: {message}")]
    TransactionSubmission {
        contract: String,
        method: String,
        message: String,
    },

    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Malformed on-chain value: {0}")]
    MalformedValue(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProtocolError {
    pub fn unbound(operation: impl Into<String>) -> Self {
        ProtocolError::UnboundSigner {
            operation: operation.into(),
        }
    }

    /// True for failures caused by a missing signer rather than the network.
    pub fn is_unbound_signer(&self) -> bool {
        matches!(self, ProtocolError::UnboundSigner { .. })
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        ProtocolError::Config(e.to_string())
    }
}

/// Failure reported by the network transport, before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RpcError(pub String);

impl RpcError {
    pub fn new(message: impl Into<String>) -> Self {
        RpcError(message.into())
    }
}

/// Why a market price could not be obtained from the DEX route.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("No liquidity pair for {base}/{quote}")]
    NoPair { base: String, quote: String },

    #[error("Insufficient liquidity in pair {0}")]
    InsufficientLiquidity(String),

    #[error("Price route network error: {0}")]
    Network(String),
}

impl From<RpcError> for RouteError {
    fn from(e: RpcError) -> Self {
        RouteError::Network(e.0)
    }
}
