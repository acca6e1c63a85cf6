use uuid::Uuid;

/// Small xorshift64* generator for synthetic analytics series. Not suitable
/// for anything security related.
#[derive(Debug, Clone)]
pub struct SampleRng {
    state: u64,
}

impl SampleRng {
    pub fn seeded(seed: u64) -> Self {
        // splitmix64 scramble so nearby seeds diverge; state must be non-zero.
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self {
            state: if z == 0 { 0x2545_F491_4F6C_DD1D } else { z },
        }
    }

    pub fn from_entropy() -> Self {
        Self::seeded(Uuid::new_v4().as_u128() as u64)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[low, high)`.
    pub fn range(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_f64() * items.len() as f64) as usize;
        items.get(index.min(items.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SampleRng::seeded(7);
        let mut b = SampleRng::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = SampleRng::seeded(0);
        for _ in 0..1000 {
            let v = rng.range(10.0, 20.0);
            assert!((10.0..20.0).contains(&v));
        }
        assert_eq!(rng.pick::<u8>(&[]), None);
        assert!(rng.pick(&["a", "b"]).is_some());
    }
}
