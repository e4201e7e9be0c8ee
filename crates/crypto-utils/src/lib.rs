//! # crypto-utils
//!
//! Hashing primitives, secure random generation, and zeroizing key storage
//! shared by the chain crates.

pub mod error;
pub mod hash;
pub mod random;
pub mod secret;

pub use error::CryptoError;
