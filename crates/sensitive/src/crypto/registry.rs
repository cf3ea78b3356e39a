//! [`StrategyRegistry`]: the mode → strategy lookup table.
//!
//! Backed by `arc-swap` so lookups on the hot path never block, while
//! [`StrategyRegistry::register`] swaps in a whole new map.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use tracing::info;

use super::{
    envelope::EncryptionResult, gm::GmStrategy, mode::AlgorithmMode, modern::ModernStrategy,
    strategy::EncryptionStrategy,
};
use crate::error::{EnvelopeError, Result};

type StrategyMap = HashMap<AlgorithmMode, Arc<dyn EncryptionStrategy>>;

/// Registered strategies, at most one per [`AlgorithmMode`].
#[derive(Debug)]
pub struct StrategyRegistry {
    inner: ArcSwap<StrategyMap>,
}

impl StrategyRegistry {
    /// A registry with no strategies.
    pub fn empty() -> Self {
        Self {
            inner: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// A registry with the GM and Modern suites.
    pub fn with_defaults() -> Self {
        let registry = Self::empty();
        registry.register(Arc::new(GmStrategy));
        registry.register(Arc::new(ModernStrategy));
        registry
    }

    /// Register `strategy` under its own mode, returning any strategy it replaced.
    pub fn register(
        &self,
        strategy: Arc<dyn EncryptionStrategy>,
    ) -> Option<Arc<dyn EncryptionStrategy>> {
        let mode = strategy.algorithm_mode();
        let previous = self.inner.rcu(|current| {
            let mut next = StrategyMap::clone(current);
            next.insert(mode, Arc::clone(&strategy));
            next
        });
        info!(mode = %mode, "registered encryption strategy");
        previous.get(&mode).cloned()
    }

    /// Look up the strategy for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::UnsupportedAlgorithm`] if none is registered.
    pub fn get(&self, mode: AlgorithmMode) -> Result<Arc<dyn EncryptionStrategy>> {
        self.inner
            .load()
            .get(&mode)
            .cloned()
            .ok_or(EnvelopeError::UnsupportedAlgorithm(mode))
    }

    /// Pick the strategy whose `supports` accepts `wire`.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MalformedEnvelope`] if `wire` is not an envelope.
    /// - [`EnvelopeError::UnknownAlgorithm`] if its code is not recognised.
    /// - [`EnvelopeError::UnsupportedAlgorithm`] if the code is known but no
    ///   strategy is registered for it.
    pub fn for_envelope(&self, wire: &str) -> Result<Arc<dyn EncryptionStrategy>> {
        if let Some(strategy) = self.inner.load().values().find(|s| s.supports(wire)) {
            return Ok(Arc::clone(strategy));
        }
        let mode = EncryptionResult::peek_mode(wire)?;
        Err(EnvelopeError::UnsupportedAlgorithm(mode))
    }

    /// Modes with a registered strategy, in mode order.
    pub fn supported_modes(&self) -> Vec<AlgorithmMode> {
        let mut modes: Vec<_> = self.inner.load().keys().copied().collect();
        modes.sort();
        modes
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_suites() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(
            registry.supported_modes(),
            vec![AlgorithmMode::Gm, AlgorithmMode::Modern]
        );
        assert_eq!(registry.get(AlgorithmMode::Gm).unwrap().algorithm_mode(), AlgorithmMode::Gm);
    }

    #[test]
    fn empty_registry_reports_unsupported() {
        let registry = StrategyRegistry::empty();
        assert!(matches!(
            registry.get(AlgorithmMode::Modern),
            Err(EnvelopeError::UnsupportedAlgorithm(AlgorithmMode::Modern))
        ));
    }

    #[test]
    fn register_replaces_existing() {
        let registry = StrategyRegistry::empty();
        assert!(registry.register(Arc::new(GmStrategy)).is_none());
        assert!(registry.register(Arc::new(GmStrategy)).is_some());
        assert_eq!(registry.supported_modes(), vec![AlgorithmMode::Gm]);
    }

    #[test]
    fn for_envelope_picks_by_code() {
        let registry = StrategyRegistry::with_defaults();
        let gm = registry.for_envelope("_mask|GM|a|b|c|").unwrap();
        assert_eq!(gm.algorithm_mode(), AlgorithmMode::Gm);
        let modern = registry.for_envelope("_mask|MODERN|a|b|c|m").unwrap();
        assert_eq!(modern.algorithm_mode(), AlgorithmMode::Modern);
    }

    #[test]
    fn for_envelope_explains_failures() {
        let registry = StrategyRegistry::empty();
        registry.register(Arc::new(GmStrategy));

        assert!(matches!(
            registry.for_envelope("plain text"),
            Err(EnvelopeError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            registry.for_envelope("_mask|XX|a|b|c|"),
            Err(EnvelopeError::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            registry.for_envelope("_mask|MODERN|a|b|c|"),
            Err(EnvelopeError::UnsupportedAlgorithm(AlgorithmMode::Modern))
        ));
    }
}
