use chain_xvg::XvgError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unexpected fields: {}", .0.join(", "))]
    UnexpectedFields(Vec<String>),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Public key does not match private key")]
    KeyMismatch,

    #[error("Private key not found for address {0}")]
    MissingPrivateKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crypto_utils::error::CryptoError> for WalletError {
    fn from(e: crypto_utils::error::CryptoError) -> Self {
        WalletError::InvalidPrivateKey(e.to_string())
    }
}

impl From<XvgError> for WalletError {
    fn from(e: XvgError) -> Self {
        let message = format!("XVG: {e}");
        match e {
            XvgError::UnsupportedTicker(ticker) => WalletError::UnsupportedChain(ticker),
            XvgError::UnexpectedFields(fields) => WalletError::UnexpectedFields(fields),
            XvgError::InvalidAddress(reason) => WalletError::InvalidAddress(reason.to_string()),
            XvgError::KeyMismatch => WalletError::KeyMismatch,
            XvgError::MissingPrivateKey(address) => WalletError::MissingPrivateKey(address),
            XvgError::InvalidParams(_) => WalletError::InvalidParams(message),
            XvgError::InsufficientFunds { .. } => WalletError::InsufficientFunds(message),
            XvgError::InvalidPrivateKey(_) | XvgError::InvalidPublicKey(_) => {
                WalletError::InvalidPrivateKey(message)
            }
            XvgError::SigningError(_) => WalletError::SigningFailed(message),
            XvgError::Network { .. } => WalletError::Network(message),
            XvgError::NotFound(_) => WalletError::NotFound(message),
            XvgError::Config(_) | XvgError::NoNodeConfigured => WalletError::Config(message),
        }
    }
}
