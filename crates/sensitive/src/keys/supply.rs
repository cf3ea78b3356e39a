//! Collaborator traits for key supply and mode selection, with default
//! implementations.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::warn;

use super::{manager::KeyManager, material::KeyPair};
use crate::crypto::AlgorithmMode;
use crate::error::Result;

/// Decides which suite new encryptions use.
#[cfg_attr(test, mockall::automock)]
pub trait ModePolicy: Send + Sync {
    fn current_mode(&self) -> AlgorithmMode;
}

/// Hands out the key pair for a suite.
///
/// Implementations are called once per encrypt or decrypt and must be safe to
/// call concurrently. The returned pair is dropped (and zeroized) when the
/// call finishes.
#[cfg_attr(test, mockall::automock)]
pub trait KeySupply: Send + Sync {
    fn pair_for(&self, mode: AlgorithmMode) -> Result<KeyPair>;
}

/// A policy that always answers the same suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMode(pub AlgorithmMode);

impl ModePolicy for FixedMode {
    fn current_mode(&self) -> AlgorithmMode {
        self.0
    }
}

impl<F> ModePolicy for F
where
    F: Fn() -> AlgorithmMode + Send + Sync,
{
    fn current_mode(&self) -> AlgorithmMode {
        self()
    }
}

/// Key supply backed by process-local generated keys.
///
/// Keys live only as long as the process. Anything encrypted with them is
/// unreadable after a restart, so a warning is logged on first use.
#[derive(Debug, Default)]
pub struct GeneratedKeySupply {
    manager: KeyManager,
    warned: AtomicBool,
}

impl GeneratedKeySupply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manager(&self) -> &KeyManager {
        &self.manager
    }
}

impl KeySupply for GeneratedKeySupply {
    fn pair_for(&self, mode: AlgorithmMode) -> Result<KeyPair> {
        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!("using process-local generated keys; data encrypted now cannot be decrypted after restart");
        }
        Ok(self.manager.pair_for(mode))
    }
}

/// Key supply with fixed pairs provided up front.
///
/// A suite without a pair gets an empty one, which the strategy rejects with
/// `MissingKeyMaterial`.
#[derive(Debug, Default, Clone)]
pub struct StaticKeySupply {
    pairs: HashMap<AlgorithmMode, KeyPair>,
}

impl StaticKeySupply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(mut self, mode: AlgorithmMode, pair: KeyPair) -> Self {
        self.pairs.insert(mode, pair);
        self
    }

    /// Suites that have a configured pair.
    pub fn modes(&self) -> Vec<AlgorithmMode> {
        let mut modes: Vec<_> = self.pairs.keys().copied().collect();
        modes.sort();
        modes
    }
}

impl KeySupply for StaticKeySupply {
    fn pair_for(&self, mode: AlgorithmMode) -> Result<KeyPair> {
        Ok(self.pairs.get(&mode).cloned().unwrap_or_default())
    }
}
