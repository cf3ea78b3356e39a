//! Key material: kinds, zeroizing buffers, generation, and supply.
//!
//! # Security invariants
//!
//! - Key bytes are **never** logged or included in error messages; the
//!   `Debug` impl of [`SecretKey`] is redacted.
//! - Every [`SecretKey`] buffer, including clones handed to a single
//!   encrypt/decrypt call, is zeroized on drop.
//! - Storage and rotation of long-lived keys belong to whoever implements
//!   [`KeySupply`]; this module only generates and caches.

pub mod manager;
pub mod material;
pub mod supply;

pub use manager::KeyManager;
pub use material::{KeyKind, KeyPair, SecretKey};
pub use supply::{FixedMode, GeneratedKeySupply, KeySupply, ModePolicy, StaticKeySupply};

#[cfg(test)]
pub use supply::{MockKeySupply, MockModePolicy};
