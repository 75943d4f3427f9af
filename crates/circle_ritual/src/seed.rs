//! # Ritual Seeding
//!
//! Every ritual gets its own independently seeded RNG so consecutive
//! rituals never share a random stream.
//!
//! ```text
//! seed = SipHash-2-4(
//!     keys(server_secret, nonce),   // Secret: never leaves the server
//!     profile_id,                   // Per player
//!     timestamp,                    // Per request
//!     nonce                         // Monotonic, never reused
//! )
//! ```
//!
//! Randomness here does not need to be cryptographically secure, but the
//! secret keeps clients from replaying a known seed.

use std::hash::Hasher;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use siphasher::sip128::{Hasher128, SipHasher24};

/// The RNG every ritual component draws from.
pub type RitualRng = ChaCha8Rng;

/// Server-side seed source.
#[derive(Clone)]
pub struct RitualSeed {
    /// Server-side secret. Never logged.
    secret: [u64; 4],
    /// Incremented on every derived seed.
    nonce: u64,
}

impl RitualSeed {
    /// Creates a seed source from 32 secret bytes.
    #[must_use]
    pub fn new(secret: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(secret.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_le_bytes(bytes);
        }
        Self {
            secret: words,
            nonce: 0,
        }
    }

    /// Creates a fixed seed source (NOT FOR PRODUCTION).
    #[must_use]
    pub const fn test_seed() -> Self {
        Self {
            secret: [
                0x1234_5678_9ABC_DEF0,
                0xFEDC_BA98_7654_3210,
                0xAAAA_BBBB_CCCC_DDDD,
                0x1111_2222_3333_4444,
            ],
            nonce: 0,
        }
    }

    /// Number of seeds derived so far.
    #[must_use]
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Derives a fresh RNG for one ritual.
    pub fn rng_for(&mut self, profile_id: &str, timestamp: u64) -> RitualRng {
        let nonce = self.nonce;
        self.nonce = self.nonce.wrapping_add(1);

        let k1 = self.secret[0].wrapping_add(nonce).rotate_left(13) ^ self.secret[1];
        let k2 = self.secret[2].rotate_left(17) ^ self.secret[3] ^ nonce;

        let mut hasher = SipHasher24::new_with_keys(k1, k2);
        hasher.write(profile_id.as_bytes());
        hasher.write_u64(timestamp);
        hasher.write_u64(nonce);
        let hash = hasher.finish128();

        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&hash.h1.to_le_bytes());
        seed[8..16].copy_from_slice(&hash.h2.to_le_bytes());
        seed[16..24].copy_from_slice(&(hash.h1 ^ self.secret[0]).to_le_bytes());
        seed[24..].copy_from_slice(&(hash.h2 ^ self.secret[2]).to_le_bytes());

        ChaCha8Rng::from_seed(seed)
    }
}

impl Default for RitualSeed {
    fn default() -> Self {
        Self::test_seed()
    }
}

impl std::fmt::Debug for RitualSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RitualSeed")
            .field("secret", &"[REDACTED]")
            .field("nonce", &self.nonce)
            .finish()
    }
}
