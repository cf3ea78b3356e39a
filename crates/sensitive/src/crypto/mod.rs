//! Authenticated field encryption: suites, strategies, and the envelope format.
//!
//! This module is free of masking and JSON concerns. It provides the
//! algorithm-agnostic encrypt/decrypt layer used by [`crate::EnvelopeService`].
//!
//! # Envelope format
//!
//! ```text
//! _mask|<GM|MODERN>|<base64url(nonce)>|<base64url(ciphertext)>|<base64url(tag)>|<display mask>
//! ```
//!
//! The algorithm code lets decryption pick the right suite without being told,
//! so GM and Modern envelopes can sit side by side in one store.

pub mod context;
pub mod envelope;
pub mod gm;
pub mod mode;
pub mod modern;
pub mod registry;
pub mod strategy;

pub use context::EncryptionContext;
pub use envelope::EncryptionResult;
pub use gm::GmStrategy;
pub use mode::AlgorithmMode;
pub use modern::ModernStrategy;
pub use registry::StrategyRegistry;
pub use strategy::EncryptionStrategy;
