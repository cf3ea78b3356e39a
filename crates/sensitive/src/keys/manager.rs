//! [`KeyManager`]: key generation and a process-lifetime key cache.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use rand::{rngs::OsRng, RngCore};
use tracing::info;

use super::material::{KeyKind, KeyPair, SecretKey};
use crate::crypto::AlgorithmMode;

/// Generates key material and memoises one key per [`KeyKind`].
///
/// Reads take a shared lock. On a miss the write lock is held across the
/// check-generate-publish sequence, so racing first callers see exactly one
/// generated key and every later caller gets the same bytes.
#[derive(Debug, Default)]
pub struct KeyManager {
    cache: RwLock<HashMap<KeyKind, SecretKey>>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh key for `kind` from the OS CSPRNG. Not cached.
    pub fn generate(kind: KeyKind) -> SecretKey {
        let mut bytes = vec![0u8; kind.len()];
        OsRng.fill_bytes(&mut bytes);
        SecretKey::from_vec(bytes)
    }

    /// Return the cached key for `kind`, generating it on first use.
    pub fn get_or_generate(&self, kind: KeyKind) -> SecretKey {
        if let Some(key) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
        {
            return key.clone();
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(kind)
            .or_insert_with(|| {
                info!(kind = %kind, "generated key material");
                Self::generate(kind)
            })
            .clone()
    }

    /// Assemble the full key pair `mode` needs from cached keys.
    pub fn pair_for(&self, mode: AlgorithmMode) -> KeyPair {
        match mode {
            AlgorithmMode::Modern => KeyPair::modern(self.get_or_generate(KeyKind::ModernEncryption)),
            AlgorithmMode::Gm => KeyPair::gm(
                self.get_or_generate(KeyKind::GmEncryption),
                self.get_or_generate(KeyKind::GmMac),
            ),
        }
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    #[test]
    fn generate_uses_kind_length() {
        for kind in KeyKind::ALL {
            assert_eq!(KeyManager::generate(kind).len(), kind.len());
        }
    }

    #[test]
    fn generate_is_random() {
        let a = KeyManager::generate(KeyKind::ModernEncryption);
        let b = KeyManager::generate(KeyKind::ModernEncryption);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn get_or_generate_is_memoised() {
        let manager = KeyManager::new();
        assert!(manager.is_empty());
        let first = manager.get_or_generate(KeyKind::GmMac);
        let second = manager.get_or_generate(KeyKind::GmMac);
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn kinds_are_cached_independently() {
        let manager = KeyManager::new();
        let enc = manager.get_or_generate(KeyKind::GmEncryption);
        let mac = manager.get_or_generate(KeyKind::GmMac);
        assert_ne!(enc.len(), mac.len());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn concurrent_first_access_yields_one_key() {
        const THREADS: usize = 16;
        let manager = KeyManager::new();
        let barrier = Barrier::new(THREADS);

        let keys: Vec<Vec<u8>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        manager
                            .get_or_generate(KeyKind::ModernEncryption)
                            .as_bytes()
                            .to_vec()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(keys.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn pair_for_gm_has_both_keys() {
        let manager = KeyManager::new();
        let pair = manager.pair_for(AlgorithmMode::Gm);
        assert_eq!(pair.encryption_key().unwrap().len(), 16);
        assert_eq!(pair.mac_key().unwrap().len(), 32);

        let modern = manager.pair_for(AlgorithmMode::Modern);
        assert!(modern.mac_key().is_none());
    }
}
