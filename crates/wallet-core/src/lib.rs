//! Multi-coin wallet framework.
//!
//! Coins plug in through [`CoinService`] and are reached by ticker through a
//! [`CoinRegistry`]. Verge is provided by `chain-xvg`.

pub mod coin;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod types;

pub use coin::CoinService;
pub use config::WalletConfig;
pub use error::WalletError;
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use registry::CoinRegistry;
pub use types::{AddressCheck, Coin, GeneratedAddress, SignedPayload};

/// Load configuration, install logging, and register the configured coins.
pub fn bootstrap(config: &WalletConfig) -> Result<CoinRegistry, WalletError> {
    config.validate()?;
    if let Err(e) = init_logging(&config.logging) {
        // Host applications may own the subscriber already.
        tracing::debug!(error = %e, "keeping existing tracing subscriber");
    }
    CoinRegistry::from_config(config)
}

/// Coins this build can serve.
pub fn supported_coins() -> Vec<Coin> {
    Coin::ALL.to_vec()
}
