//! [`EncryptionContext`]: a dispatcher bound to one strategy at a time.

use std::sync::Arc;

use super::{
    envelope::EncryptionResult, mode::AlgorithmMode, registry::StrategyRegistry,
    strategy::EncryptionStrategy,
};
use crate::error::Result;
use crate::keys::KeyPair;

/// Binds the current mode to its strategy and forwards calls to it.
///
/// Re-binding takes `&mut self`; share a context between threads only behind
/// your own lock, or keep one context per mode as [`crate::EnvelopeService`]
/// does.
#[derive(Debug, Clone)]
pub struct EncryptionContext {
    registry: Arc<StrategyRegistry>,
    strategy: Arc<dyn EncryptionStrategy>,
}

impl EncryptionContext {
    /// Bind to the strategy registered for `mode`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedAlgorithm` if `registry` has no strategy for `mode`.
    pub fn new(registry: Arc<StrategyRegistry>, mode: AlgorithmMode) -> Result<Self> {
        let strategy = registry.get(mode)?;
        Ok(Self { registry, strategy })
    }

    pub fn current_mode(&self) -> AlgorithmMode {
        self.strategy.algorithm_mode()
    }

    pub fn strategy(&self) -> &Arc<dyn EncryptionStrategy> {
        &self.strategy
    }

    /// Re-bind to the strategy for `mode`. On error the binding is unchanged.
    pub fn set_mode(&mut self, mode: AlgorithmMode) -> Result<()> {
        self.strategy = self.registry.get(mode)?;
        Ok(())
    }

    pub fn encrypt(&self, plaintext: &str, keys: &KeyPair) -> Result<EncryptionResult> {
        self.strategy.encrypt(plaintext, keys)
    }

    /// Decrypt with the currently bound strategy.
    pub fn decrypt(&self, result: &EncryptionResult, keys: &KeyPair) -> Result<String> {
        self.strategy.decrypt(result, keys)
    }

    /// Parse `wire`, re-bind to the suite it is tagged with, and decrypt.
    ///
    /// `keys` must belong to the envelope's suite, not to the previous binding.
    pub fn decrypt_wire(&mut self, wire: &str, keys: &KeyPair) -> Result<String> {
        let result = EncryptionResult::parse(wire)?;
        self.strategy = self.registry.for_envelope(wire)?;
        self.strategy.decrypt(&result, keys)
    }
}
