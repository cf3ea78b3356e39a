//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use sensitive::{
    AlgorithmMode, EnvelopeService, FieldCodec, FixedMode, GeneratedKeySupply, KeySupply, Masker,
    ModePolicy,
};

/// Application state shared across all request handlers.
///
/// Cloning is cheap: the codec holds the envelope service and masker behind
/// `Arc`s, so every request sees the same memoised contexts and pattern cache.
#[derive(Clone, Debug)]
pub struct AppState {
    pub codec: FieldCodec,
}

impl AppState {
    /// Wire a mode policy and key supply into a fresh service and codec.
    pub fn new(policy: Arc<dyn ModePolicy>, keys: Arc<dyn KeySupply>) -> Self {
        let service = Arc::new(EnvelopeService::new(policy, keys));
        Self {
            codec: FieldCodec::new(service, Arc::new(Masker::new())),
        }
    }

    pub fn service(&self) -> &EnvelopeService {
        self.codec.service()
    }
}

impl Default for AppState {
    /// Modern suite with generated keys, suitable for tests.
    fn default() -> Self {
        Self::new(
            Arc::new(FixedMode(AlgorithmMode::Modern)),
            Arc::new(GeneratedKeySupply::new()),
        )
    }
}
