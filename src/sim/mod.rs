//! Animation engines
//!
//! Each engine owns its state and advances one frame per `update`. Engines
//! are deterministic for a given seed and never touch the platform:
//! - Seeded RNG only
//! - Time comes in as a parameter
//! - Drawing goes through `Painter`

pub mod collision;
pub mod feed;
pub mod growth;
pub mod network;
pub mod runner;

use rand::SeedableRng;
use rand_pcg::Pcg32;

pub use collision::Aabb;
pub use feed::{FeedCard, FeedPhase, ScrollFeed};
pub use growth::{Bar, GrowthGraph, Runner, TrailParticle};
pub use network::{NetworkGraph, Node};
pub use runner::{Activation, Obstacle, Player, RunPhase, RunnerGame};

/// RNG for an engine seed
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        for _ in 0..16 {
            assert_eq!(a.random::<u32>(), b.random::<u32>());
        }
    }
}
