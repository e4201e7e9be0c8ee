use rust_decimal::Decimal;
use thiserror::Error;

/// Verge chain operation errors.
#[derive(Debug, Error)]
pub enum XvgError {
    #[error("unsupported ticker: {0}")]
    UnsupportedTicker(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("transaction contains unexpected fields: {}", .0.join(", "))]
    UnexpectedFields(Vec<String>),

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("public key does not match private key")]
    KeyMismatch,

    #[error("private key not found for address {0}")]
    MissingPrivateKey(String),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    #[error("network error: {message} | URL: {endpoint} | Status: {}", .status.map(|s| s.to_string()).unwrap_or_else(|| "none".into()))]
    Network {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no node adapter configured")]
    NoNodeConfigured,
}

/// Structural failures when decoding a Base58Check address.
///
/// The `Display` text doubles as the reason string reported by address
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid XVG address format")]
    InvalidFormat,

    #[error("Invalid XVG address version")]
    InvalidVersion { expected: u8, actual: u8 },

    #[error("Invalid checksum")]
    InvalidChecksum,
}
