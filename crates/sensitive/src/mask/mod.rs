//! Display masks for sensitive values.
//!
//! A mask is the human-readable stand-in appended to an envelope, e.g.
//! `138****8000` for a mobile number. Masks are derived from the plaintext,
//! so they are computed before encryption and never from decrypted output.

pub mod kind;
pub mod masker;
pub mod rule;

pub use kind::{SensitiveType, UnknownSensitiveType};
pub use masker::{mask_with_index, Masker};
pub use rule::MaskRule;
