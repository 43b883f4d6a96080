//! Seeded, platform-independent shuffling of the job list.
//!
//! Every host computes the same global order on its own and then takes its
//! slice of it, so the permutation must depend only on the list length and
//! the seed. The order matches the classic Mersenne Twister sweep tools: an
//! MT19937 stream seeded through `init_by_array` with the seed's 32-bit
//! words, bounded draws by masked rejection, swaps from the back.

use rand_mt::Mt19937GenRand32;

/// Seed used when the run configuration does not override it.
pub const DEFAULT_SHUFFLE_SEED: u64 = 0;

/// Owns the generator for one run. Build it once per process and never
/// reseed it mid-run.
#[derive(Debug, Clone)]
pub struct Shuffler {
    rng: Mt19937GenRand32,
}

impl Shuffler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand32::new_with_key(seed_key(seed)),
        }
    }

    /// Fisher-Yates from the back: position `i` swaps with a uniform pick
    /// from `0..=i`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Uniform draw from `0..n` using the top `bit_length(n)` bits of the
    /// stream and rejecting anything out of range. `n` must be non-zero.
    fn below(&mut self, n: u64) -> u64 {
        let bits = u64::BITS - n.leading_zeros();
        loop {
            let r = self.random_bits(bits);
            if r < n {
                return r;
            }
        }
    }

    /// `bits` random bits, low word first when more than 32 are needed.
    fn random_bits(&mut self, bits: u32) -> u64 {
        if bits <= 32 {
            return u64::from(self.rng.next_u32() >> (32 - bits));
        }
        let low = u64::from(self.rng.next_u32());
        let high = u64::from(self.rng.next_u32() >> (64 - bits));
        (high << 32) | low
    }
}

impl Default for Shuffler {
    fn default() -> Self {
        Self::seeded(DEFAULT_SHUFFLE_SEED)
    }
}

/// Key words for `init_by_array`: the seed split into 32-bit words, least
/// significant first, with zero mapped to a single zero word.
fn seed_key(seed: u64) -> Vec<u32> {
    let low = seed as u32;
    let high = (seed >> 32) as u32;
    if high == 0 {
        vec![low]
    } else {
        vec![low, high]
    }
}

/// Shuffle a fresh copy with a generator seeded from `seed`.
pub fn shuffled<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    Shuffler::seeded(seed).shuffle(&mut items);
    items
}
