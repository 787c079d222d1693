//! Deterministic RNG hierarchy.
//!
//! A master seed is expanded into one sub-seed per `(strategy, symbol)` key.
//! Derivation hashes the key with BLAKE3, so a strategy's failure draws depend
//! only on the master seed, its key, and its own order flow.

use crate::domain::StrategyKey;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Draw a fresh master seed from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Sub-seed for one ledger key. Independent of derivation order.
    pub fn sub_seed(&self, key: &StrategyKey) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(key.strategy.as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") apart.
        hasher.update(&[0]);
        hasher.update(key.symbol.as_bytes());
        let hash = hasher.finalize();
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(seed)
    }

    pub fn rng_for(&self, key: &StrategyKey) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(key))
    }
}
