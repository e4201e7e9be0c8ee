//! Verge (XVG) chain support for the wallet framework.
//!
//! Provides secp256k1 key generation, Base58Check P2PKH addresses, UTXO-funded
//! transaction building with exact-decimal balance checks, per-input ECDSA
//! signing, and the node access contract the builder reads UTXOs through.

pub mod address;
pub mod amount;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod keys;
pub mod network;
pub mod service;
pub mod signer;
pub mod types;
pub mod utxo;

pub use client::NodeClient;
pub use config::{NodeConfig, XvgConfig};
pub use error::{AddressError, XvgError};
pub use network::{XvgNetwork, TICKER};
pub use service::XvgCoinService;
