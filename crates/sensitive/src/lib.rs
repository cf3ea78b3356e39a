//! Field-level protection for sensitive values.
//!
//! Values are masked for display, encrypted under one of two authenticated
//! suites, and stored as a single self-describing string:
//!
//! ```text
//! _mask|MODERN|<nonce>|<ciphertext>|<tag>|138****8000
//! ```
//!
//! - [`crypto`]: suites, strategies, the envelope wire format.
//! - [`keys`]: key material, generation, and the supply/policy seams.
//! - [`service`]: [`EnvelopeService`], the encrypt/decrypt entry point.
//! - [`mask`]: display masks and validation patterns.
//! - [`fields`]: protecting and revealing fields of JSON documents.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sensitive::{AlgorithmMode, EnvelopeService, FixedMode, GeneratedKeySupply};
//!
//! let service = EnvelopeService::new(
//!     Arc::new(FixedMode(AlgorithmMode::Gm)),
//!     Arc::new(GeneratedKeySupply::new()),
//! );
//! let wire = service.encrypt("13800138000")?;
//! assert_eq!(service.decrypt(&wire)?, "13800138000");
//! # Ok::<(), sensitive::EnvelopeError>(())
//! ```

pub mod crypto;
pub mod error;
pub mod fields;
pub mod keys;
pub mod mask;
pub mod service;

pub use crypto::{AlgorithmMode, EncryptionContext, EncryptionResult, EncryptionStrategy};
pub use error::{EnvelopeError, FieldError, MaskError, Result};
pub use fields::{protect_fields, reveal_fields, FieldCodec, FieldRule};
pub use keys::{
    FixedMode, GeneratedKeySupply, KeyKind, KeyManager, KeyPair, KeySupply, ModePolicy, SecretKey,
    StaticKeySupply,
};
pub use mask::{MaskRule, Masker, SensitiveType};
pub use service::EnvelopeService;
