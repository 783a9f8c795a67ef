//! Randomized synthetic URL paths for load generation.
//!
//! The sampler is a pure function of its inputs plus the supplied RNG:
//! a seeded RNG reproduces the exact same batch, which is what the test
//! suite relies on. The whole batch is materialized up front because
//! the probe runner needs it for concurrent dispatch.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed literal first segment of every generated path.
pub const SAMPLE_PREFIX: &str = "api";

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Shape of a generated sample batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSpec {
    /// Maximum number of pool-drawn segments per path (minimum is 1).
    pub max_segments: usize,
    /// Number of random strings in the segment pool.
    pub pool_size: usize,
    /// Length of each pool string.
    pub segment_length: usize,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            max_segments: 6,
            pool_size: 3,
            segment_length: 3,
        }
    }
}

/// Generate `count` randomized paths of the form
/// `/api/<seg>/<seg>/.../` with 1..=max_segments segments drawn from a
/// small pool of random alphabetic strings.
pub fn generate_sample<R: Rng>(rng: &mut R, count: usize, spec: &SampleSpec) -> Vec<String> {
    let pool_size = spec.pool_size.max(1);
    let max_segments = spec.max_segments.max(1);

    let pool: Vec<String> = (0..pool_size)
        .map(|_| {
            (0..spec.segment_length)
                .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
                .collect()
        })
        .collect();

    (0..count)
        .map(|_| {
            let segment_count = rng.gen_range(1..=max_segments);
            let mut segments = Vec::with_capacity(segment_count + 1);
            segments.push(SAMPLE_PREFIX);
            for _ in 0..segment_count {
                segments.push(pool[rng.gen_range(0..pool_size)].as_str());
            }
            format!("/{}/", segments.join("/"))
        })
        .collect()
}
