//! Sketch buckets: a fingerprint plus a circular per-tick count history

/// One bucket of a hash row.
///
/// `counts` is a ring of per-tick counts. `first` is the slot of the current
/// tick; the slot `j` ticks ago is `(first + j) % counts.len()`.
/// `counts_sum` is the exact sum of `counts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub fingerprint: u32,
    pub first: usize,
    pub counts: Vec<u32>,
    pub counts_sum: u64,
}

impl Bucket {
    pub fn new(history_len: usize) -> Self {
        Self {
            fingerprint: 0,
            first: 0,
            counts: vec![0; history_len.max(1)],
            counts_sum: 0,
        }
    }

    /// An empty bucket is owned by nobody, whatever its fingerprint says.
    pub fn is_empty(&self) -> bool {
        self.counts_sum == 0
    }

    /// Windowed count, saturated to `u32`.
    pub fn total(&self) -> u32 {
        u32::try_from(self.counts_sum).unwrap_or(u32::MAX)
    }

    /// Count recorded `offset` ticks ago.
    pub fn count_at(&self, offset: usize) -> u32 {
        self.counts[(self.first + offset) % self.counts.len()]
    }

    pub(crate) fn claim(&mut self, fingerprint: u32, count: u32) {
        self.fingerprint = fingerprint;
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.counts[self.first] = count;
        self.counts_sum = u64::from(count);
    }

    pub(crate) fn add(&mut self, count: u32) {
        let slot = &mut self.counts[self.first];
        let before = *slot;
        *slot = slot.saturating_add(count);
        self.counts_sum += u64::from(*slot - before);
    }

    /// Remove one unit from the newest non-empty tick.
    pub(crate) fn decrement(&mut self) {
        let len = self.counts.len();
        for offset in 0..len {
            let slot = (self.first + offset) % len;
            if self.counts[slot] > 0 {
                self.counts[slot] -= 1;
                self.counts_sum -= 1;
                return;
            }
        }
    }

    /// Start a new tick: the oldest slot becomes the current one, cleared.
    pub(crate) fn tick(&mut self) {
        let len = self.counts.len();
        self.first = (self.first + len - 1) % len;
        self.counts_sum -= u64::from(self.counts[self.first]);
        self.counts[self.first] = 0;
    }
}
