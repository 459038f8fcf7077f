//! Sliding-window HeavyKeeper sketch
//!
//! A `depth x width` grid of buckets. Each bucket is owned by one item
//! fingerprint and keeps a ring of per-tick counts covering the window.
//! Colliding items decay the owner's count with probability
//! `decay^count`, so heavy items keep their buckets and light ones lose
//! them. A bounded heap tracks the current top-K.

mod bucket;
mod heap;

pub use bucket::Bucket;
pub use heap::{rank_order, Item, TopK};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

const FINGERPRINT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Sketch shape and decay parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchOptions {
    pub width: usize,
    pub depth: usize,
    pub decay: f32,
    pub decay_lut_size: usize,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SketchOptions {
    fn default() -> Self {
        Self {
            width: 3000,
            depth: 3,
            decay: 0.9,
            decay_lut_size: 8192,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sketch {
    width: usize,
    depth: usize,
    history_len: usize,
    decay_lut: Vec<f32>,
    buckets: Vec<Bucket>,
    heap: TopK,
    rng: StdRng,
}

impl Sketch {
    pub fn new(k: usize, history_len: usize, options: SketchOptions) -> Self {
        let width = options.width.max(1);
        let depth = options.depth.max(1);
        let history_len = history_len.max(1);
        let decay_lut = (0..options.decay_lut_size.max(1))
            .map(|i| options.decay.powi(i as i32))
            .collect();
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        debug!(k, width, depth, history_len, decay = options.decay, "sketch allocated");
        Self {
            width,
            depth,
            history_len,
            decay_lut,
            buckets: vec![Bucket::new(history_len); width * depth],
            heap: TopK::new(k),
            rng,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Fingerprint stored in the buckets an item owns.
    pub fn fingerprint(item: &str) -> u32 {
        hash_with_seed(item, FINGERPRINT_SEED) as u32
    }

    /// The bucket `item` hashes to in `row`.
    pub fn bucket(&self, item: &str, row: usize) -> &Bucket {
        &self.buckets[self.bucket_index(item, row)]
    }

    fn bucket_index(&self, item: &str, row: usize) -> usize {
        let seed = 0x517c_c1b7_2722_0a95_u64.wrapping_mul(row as u64 + 1);
        row * self.width + (hash_with_seed(item, seed) % self.width as u64) as usize
    }

    /// Count one occurrence of `item` in the current tick.
    pub fn incr(&mut self, item: &str) -> bool {
        self.add(item, 1)
    }

    /// Count `count` occurrences of `item` in the current tick. Returns
    /// whether the item is in the top-K afterwards.
    pub fn add(&mut self, item: &str, count: u32) -> bool {
        if count == 0 {
            return self.heap.contains(item);
        }
        let fingerprint = Self::fingerprint(item);
        let mut estimate = 0;
        for row in 0..self.depth {
            let index = self.bucket_index(item, row);
            let bucket = &mut self.buckets[index];
            if bucket.is_empty() {
                bucket.claim(fingerprint, count);
                estimate = estimate.max(count);
                continue;
            }
            if bucket.fingerprint == fingerprint {
                bucket.add(count);
                estimate = estimate.max(bucket.total());
                continue;
            }
            let mut remaining = count;
            loop {
                let p = decay_probability(&self.decay_lut, bucket.counts_sum);
                // a draw with p == 0 keeps the owner for every remaining unit
                let Some(misses) = misses_before_decay(&mut self.rng, p) else {
                    break;
                };
                if misses >= u64::from(remaining) {
                    break;
                }
                remaining -= misses as u32;
                bucket.decrement();
                if bucket.is_empty() {
                    bucket.claim(fingerprint, remaining);
                    estimate = estimate.max(remaining);
                    break;
                }
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }
        if estimate == 0 {
            return self.heap.contains(item);
        }
        self.heap.update(item, fingerprint, estimate)
    }

    /// Advance the window by `n` ticks and re-estimate the top-K.
    pub fn ticks(&mut self, n: usize) {
        let steps = n.min(self.history_len);
        if steps == 0 {
            return;
        }
        for bucket in &mut self.buckets {
            for _ in 0..steps {
                bucket.tick();
            }
        }
        let counts: Vec<u32> = self
            .heap
            .items()
            .iter()
            .map(|item| self.count_fingerprint(&item.item, item.fingerprint))
            .collect();
        self.heap.recount(&counts);
    }

    /// Estimated windowed count of `item`.
    pub fn count(&self, item: &str) -> u32 {
        self.count_fingerprint(item, Self::fingerprint(item))
    }

    fn count_fingerprint(&self, item: &str, fingerprint: u32) -> u32 {
        (0..self.depth)
            .map(|row| self.bucket(item, row))
            .filter(|b| b.fingerprint == fingerprint)
            .map(Bucket::total)
            .max()
            .unwrap_or(0)
    }

    /// Whether `item` is currently in the top-K.
    pub fn query(&self, item: &str) -> bool {
        self.heap.contains(item)
    }

    /// Current top-K, best first.
    pub fn sorted_slice(&self) -> Vec<Item> {
        self.heap.sorted()
    }
}

/// `decay^count`; counts past the table never decay.
fn decay_probability(lut: &[f32], count: u64) -> f32 {
    usize::try_from(count)
        .ok()
        .and_then(|i| lut.get(i))
        .copied()
        .unwrap_or(0.0)
}

/// Colliding units that pass before one decays the owner, drawn from the
/// geometric distribution with success probability `p`. `None` when `p` is 0.
fn misses_before_decay(rng: &mut StdRng, p: f32) -> Option<u64> {
    if p <= 0.0 {
        return None;
    }
    if p >= 1.0 {
        return Some(0);
    }
    let u: f64 = rng.random();
    let misses = ((1.0 - u).ln() / (1.0 - f64::from(p)).ln()).floor();
    Some(misses as u64)
}

fn hash_with_seed(item: &str, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    item.hash(&mut hasher);
    hasher.finish()
}
