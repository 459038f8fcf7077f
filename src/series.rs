//! Per-item count history read out of the sketch

use crate::ranked::TrackedItem;
use crate::sketch::Sketch;
use parking_lot::Mutex;

/// Count for `fingerprint` recorded `offset` ticks ago: the largest value
/// among the rows whose bucket for `label` carries that fingerprint.
pub fn count_at_offset(sketch: &Sketch, label: &str, fingerprint: u32, offset: usize) -> u32 {
    (0..sketch.depth())
        .map(|row| sketch.bucket(label, row))
        .filter(|bucket| bucket.fingerprint == fingerprint)
        .map(|bucket| bucket.count_at(offset))
        .max()
        .unwrap_or(0)
}

/// Oldest-first history of length `history_len` for `item`.
///
/// The sketch lock is taken once per offset so ingestion is never held up
/// for a whole series; adjacent samples may straddle a tick.
pub fn extract(sketch: &Mutex<Sketch>, item: &TrackedItem, history_len: usize) -> Vec<u32> {
    let mut series = vec![0; history_len];
    for offset in 0..history_len {
        let count = {
            let sketch = sketch.lock();
            count_at_offset(&sketch, &item.label, item.fingerprint, offset)
        };
        series[history_len - 1 - offset] = count;
    }
    series
}

/// Value shown on the log scale: `ln(max(1, v))`.
pub fn log_value(v: u32) -> f64 {
    f64::from(v.max(1)).ln()
}

/// Convert a raw series into plot values, in place.
pub fn to_plot_values(counts: &[u32], log_scale: bool, out: &mut Vec<f64>) {
    out.clear();
    out.extend(counts.iter().map(|&c| {
        if log_scale {
            log_value(c)
        } else {
            f64::from(c)
        }
    }));
}
