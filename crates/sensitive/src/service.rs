//! [`EnvelopeService`]: the top-level encrypt/decrypt entry point.
//!
//! Construct one per process and pass it (usually in an `Arc`) to whatever
//! needs it. There is no global instance.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, warn};

use crate::crypto::{
    AlgorithmMode, EncryptionContext, EncryptionResult, EncryptionStrategy, StrategyRegistry,
};
use crate::error::{EnvelopeError, Result};
use crate::keys::{KeyPair, KeySupply, ModePolicy};

/// Ties the mode policy, key supply, and strategy registry together.
///
/// - `encrypt` uses whatever suite the [`ModePolicy`] currently answers.
/// - `decrypt` ignores the policy and uses the suite named in the envelope,
///   so stores holding a mix of GM and Modern envelopes decrypt without help.
///
/// One [`EncryptionContext`] is built per mode on first use and reused.
pub struct EnvelopeService {
    registry: Arc<StrategyRegistry>,
    policy: Arc<dyn ModePolicy>,
    keys: Arc<dyn KeySupply>,
    contexts: RwLock<HashMap<AlgorithmMode, Arc<EncryptionContext>>>,
}

impl EnvelopeService {
    /// Build a service over the default GM + Modern registry.
    pub fn new(policy: Arc<dyn ModePolicy>, keys: Arc<dyn KeySupply>) -> Self {
        Self::with_registry(Arc::new(StrategyRegistry::with_defaults()), policy, keys)
    }

    pub fn with_registry(
        registry: Arc<StrategyRegistry>,
        policy: Arc<dyn ModePolicy>,
        keys: Arc<dyn KeySupply>,
    ) -> Self {
        Self {
            registry,
            policy,
            keys,
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// The suite new encryptions will use right now.
    pub fn active_mode(&self) -> AlgorithmMode {
        self.policy.current_mode()
    }

    pub fn supported_modes(&self) -> Vec<AlgorithmMode> {
        self.registry.supported_modes()
    }

    /// Register (or replace) a strategy and drop any cached context for its mode.
    pub fn register(&self, strategy: Arc<dyn EncryptionStrategy>) {
        let mode = strategy.algorithm_mode();
        let mut contexts = self.contexts.write().unwrap_or_else(PoisonError::into_inner);
        self.registry.register(strategy);
        contexts.remove(&mode);
    }

    /// Encrypt under the active suite and return the envelope value.
    pub fn encrypt_result(&self, plaintext: &str) -> Result<EncryptionResult> {
        let mode = self.policy.current_mode();
        let context = self.context_for(mode)?;
        let keys = self.keys.pair_for(mode)?;
        let result = context.encrypt(plaintext, &keys)?;
        debug!(mode = %mode, "encrypted value");
        Ok(result)
    }

    /// Encrypt under the active suite and return the wire string (empty mask).
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        Ok(self.encrypt_result(plaintext)?.to_wire())
    }

    /// Encrypt under the active suite and append `mask` as the display field.
    ///
    /// # Errors
    ///
    /// Besides encryption errors, `MalformedEnvelope` if `mask` contains `|`.
    pub fn encrypt_with_mask(&self, plaintext: &str, mask: &str) -> Result<String> {
        self.encrypt_result(plaintext)?.with_mask(mask)
    }

    /// Decrypt a wire string, detecting the suite from its algorithm tag.
    pub fn decrypt(&self, wire: &str) -> Result<String> {
        let result = EncryptionResult::parse(wire)?;
        self.decrypt_result(&result)
    }

    /// Decrypt a parsed envelope with keys for its own suite.
    pub fn decrypt_result(&self, result: &EncryptionResult) -> Result<String> {
        let keys = self.keys.pair_for(result.mode())?;
        self.decrypt_with(result, &keys)
    }

    /// Decrypt with caller-supplied keys, bypassing the key supply.
    pub fn decrypt_with(&self, result: &EncryptionResult, keys: &KeyPair) -> Result<String> {
        let mode = result.mode();
        let context = self.context_for(mode)?;
        match context.decrypt(result, keys) {
            Ok(plaintext) => {
                debug!(mode = %mode, "decrypted value");
                Ok(plaintext)
            }
            Err(e @ EnvelopeError::IntegrityViolation(_)) => {
                warn!(mode = %mode, "envelope failed authentication");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// The memoised context for `mode`, built on first use.
    ///
    /// Concurrent first callers serialise on the write lock and all receive
    /// the same context. Failures are not cached.
    pub fn context_for(&self, mode: AlgorithmMode) -> Result<Arc<EncryptionContext>> {
        if let Some(context) = self
            .contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&mode)
        {
            return Ok(Arc::clone(context));
        }

        let mut contexts = self.contexts.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(context) = contexts.get(&mode) {
            return Ok(Arc::clone(context));
        }
        let context = Arc::new(EncryptionContext::new(Arc::clone(&self.registry), mode)?);
        contexts.insert(mode, Arc::clone(&context));
        Ok(context)
    }
}

impl std::fmt::Debug for EnvelopeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::GmStrategy;
    use crate::keys::{FixedMode, GeneratedKeySupply, KeyManager, MockKeySupply, MockModePolicy};
    use std::sync::Barrier;

    fn service(mode: AlgorithmMode, keys: Arc<dyn KeySupply>) -> EnvelopeService {
        EnvelopeService::new(Arc::new(FixedMode(mode)), keys)
    }

    #[test]
    fn encrypts_with_active_mode() {
        let keys: Arc<dyn KeySupply> = Arc::new(GeneratedKeySupply::new());
        let gm = service(AlgorithmMode::Gm, Arc::clone(&keys));
        let wire = gm.encrypt("13800138000").unwrap();
        assert!(wire.starts_with("_mask|GM|"));
        assert_eq!(gm.decrypt(&wire).unwrap(), "13800138000");
    }

    #[test]
    fn decrypt_detects_mode_regardless_of_policy() {
        let keys: Arc<dyn KeySupply> = Arc::new(GeneratedKeySupply::new());
        let gm = service(AlgorithmMode::Gm, Arc::clone(&keys));
        let modern = service(AlgorithmMode::Modern, Arc::clone(&keys));

        let batch = [
            gm.encrypt("alice").unwrap(),
            modern.encrypt("bob").unwrap(),
            gm.encrypt("carol").unwrap(),
        ];
        let plain: Vec<_> = batch.iter().map(|w| modern.decrypt(w).unwrap()).collect();
        assert_eq!(plain, ["alice", "bob", "carol"]);
    }

    #[test]
    fn decrypt_does_not_consult_policy() {
        let mut policy = MockModePolicy::new();
        policy
            .expect_current_mode()
            .times(1)
            .return_const(AlgorithmMode::Modern);

        let service = EnvelopeService::new(Arc::new(policy), Arc::new(GeneratedKeySupply::new()));
        let wire = service.encrypt("once").unwrap();
        assert_eq!(service.decrypt(&wire).unwrap(), "once");
    }

    #[test]
    fn key_supply_is_asked_for_the_envelope_mode() {
        let manager = Arc::new(KeyManager::new());
        let gm_wire = service(AlgorithmMode::Gm, Arc::new(GeneratedKeySupply::new()))
            .context_for(AlgorithmMode::Gm)
            .unwrap()
            .encrypt("x", &manager.pair_for(AlgorithmMode::Gm))
            .unwrap()
            .to_wire();

        let mut supply = MockKeySupply::new();
        let keys = Arc::clone(&manager);
        supply
            .expect_pair_for()
            .withf(|mode| *mode == AlgorithmMode::Gm)
            .times(1)
            .returning(move |mode| Ok(keys.pair_for(mode)));

        let modern = service(AlgorithmMode::Modern, Arc::new(supply));
        assert_eq!(modern.decrypt(&gm_wire).unwrap(), "x");
    }

    #[test]
    fn key_supply_errors_propagate() {
        let mut supply = MockKeySupply::new();
        supply.expect_pair_for().returning(|mode| {
            Err(EnvelopeError::MissingKeyMaterial {
                mode,
                kind: crate::keys::KeyKind::ModernEncryption,
            })
        });
        let service = service(AlgorithmMode::Modern, Arc::new(supply));
        assert!(matches!(
            service.encrypt("x"),
            Err(EnvelopeError::MissingKeyMaterial { .. })
        ));
    }

    #[test]
    fn unsupported_mode_is_reported() {
        let registry = Arc::new(StrategyRegistry::empty());
        registry.register(Arc::new(GmStrategy));
        let service = EnvelopeService::with_registry(
            registry,
            Arc::new(FixedMode(AlgorithmMode::Modern)),
            Arc::new(GeneratedKeySupply::new()),
        );
        assert!(matches!(
            service.encrypt("x"),
            Err(EnvelopeError::UnsupportedAlgorithm(AlgorithmMode::Modern))
        ));
    }

    #[test]
    fn wrong_keys_fail_integrity() {
        let a = service(AlgorithmMode::Modern, Arc::new(GeneratedKeySupply::new()));
        let b = service(AlgorithmMode::Modern, Arc::new(GeneratedKeySupply::new()));
        let wire = a.encrypt("secret").unwrap();
        assert!(matches!(
            b.decrypt(&wire),
            Err(EnvelopeError::IntegrityViolation(AlgorithmMode::Modern))
        ));
    }

    #[test]
    fn encrypt_with_mask_appends_display_field() {
        let service = service(AlgorithmMode::Modern, Arc::new(GeneratedKeySupply::new()));
        let wire = service.encrypt_with_mask("13800138000", "138****8000").unwrap();
        assert!(wire.ends_with("|138****8000"));
        assert_eq!(service.decrypt(&wire).unwrap(), "13800138000");
        assert!(service.encrypt_with_mask("x", "a|b").is_err());
    }

    #[test]
    fn contexts_are_built_once_under_contention() {
        const THREADS: usize = 12;
        let service = service(AlgorithmMode::Modern, Arc::new(GeneratedKeySupply::new()));
        let barrier = Barrier::new(THREADS);

        let contexts: Vec<Arc<EncryptionContext>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        service.context_for(AlgorithmMode::Modern).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(contexts.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn register_evicts_cached_context() {
        let service = service(AlgorithmMode::Gm, Arc::new(GeneratedKeySupply::new()));
        let before = service.context_for(AlgorithmMode::Gm).unwrap();
        service.register(Arc::new(GmStrategy));
        let after = service.context_for(AlgorithmMode::Gm).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
