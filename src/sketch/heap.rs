//! Bounded min-heap of the current top-K items

use std::cmp::Ordering;
use std::collections::HashMap;

/// A tracked item with its estimated count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub item: String,
    pub fingerprint: u32,
    pub count: u32,
}

/// Ranking order: higher counts first, ties by label.
pub fn rank_order(a: &Item, b: &Item) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item))
}

/// Min-heap keyed on [`rank_order`] (the root is the worst-ranked item),
/// with a label index for in-place updates.
#[derive(Debug, Clone)]
pub struct TopK {
    k: usize,
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k),
            index: HashMap::with_capacity(k),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn contains(&self, item: &str) -> bool {
        self.index.contains_key(item)
    }

    /// Record a new estimate for `item`. Returns whether it is tracked
    /// afterwards.
    pub fn update(&mut self, item: &str, fingerprint: u32, count: u32) -> bool {
        if let Some(&i) = self.index.get(item) {
            self.items[i].count = count;
            self.items[i].fingerprint = fingerprint;
            self.sift_down(i);
            self.sift_up(i);
            return true;
        }
        let candidate = Item {
            item: item.to_string(),
            fingerprint,
            count,
        };
        if self.items.len() < self.k {
            self.index.insert(candidate.item.clone(), self.items.len());
            self.items.push(candidate);
            self.sift_up(self.items.len() - 1);
            return true;
        }
        match self.items.first() {
            Some(min) if rank_order(&candidate, min) == Ordering::Less => {
                self.index.remove(&min.item);
                self.index.insert(candidate.item.clone(), 0);
                self.items[0] = candidate;
                self.sift_down(0);
                true
            }
            _ => false,
        }
    }

    /// Replace every count (in `items()` order) and drop items at zero.
    pub fn recount(&mut self, counts: &[u32]) {
        for (item, &count) in self.items.iter_mut().zip(counts) {
            item.count = count;
        }
        self.items.retain(|item| item.count > 0);
        self.reindex();
        for i in (0..self.items.len() / 2).rev() {
            self.sift_down(i);
        }
    }

    /// Items sorted best first.
    pub fn sorted(&self) -> Vec<Item> {
        let mut items = self.items.clone();
        items.sort_by(rank_order);
        items
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, item) in self.items.iter().enumerate() {
            self.index.insert(item.item.clone(), i);
        }
    }

    /// `a` ranks below `b`
    fn worse(&self, a: usize, b: usize) -> bool {
        rank_order(&self.items[a], &self.items[b]) == Ordering::Greater
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.index.insert(self.items[a].item.clone(), a);
        self.index.insert(self.items[b].item.clone(), b);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.worse(i, parent) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let (left, right) = (2 * i + 1, 2 * i + 2);
            let mut worst = i;
            if left < self.items.len() && self.worse(left, worst) {
                worst = left;
            }
            if right < self.items.len() && self.worse(right, worst) {
                worst = right;
            }
            if worst == i {
                break;
            }
            self.swap(i, worst);
            i = worst;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[Item]) -> Vec<(&str, u32)> {
        items.iter().map(|i| (i.item.as_str(), i.count)).collect()
    }

    #[test]
    fn test_keeps_best_k() {
        let mut heap = TopK::new(2);
        assert!(heap.update("a", 1, 1));
        assert!(heap.update("b", 2, 5));
        assert!(!heap.update("c", 3, 1));
        assert!(heap.update("d", 4, 3));
        assert_eq!(labels(&heap.sorted()), vec![("b", 5), ("d", 3)]);
        assert!(!heap.contains("a"));
    }

    #[test]
    fn test_update_in_place_reorders() {
        let mut heap = TopK::new(3);
        heap.update("a", 1, 1);
        heap.update("b", 2, 2);
        heap.update("c", 3, 3);
        heap.update("a", 1, 10);
        assert_eq!(labels(&heap.sorted()), vec![("a", 10), ("c", 3), ("b", 2)]);
        assert!(heap.update("d", 4, 4));
        assert_eq!(labels(&heap.sorted()), vec![("a", 10), ("d", 4), ("c", 3)]);
    }

    #[test]
    fn test_ties_sort_by_label() {
        let mut heap = TopK::new(3);
        heap.update("z", 1, 2);
        heap.update("m", 2, 2);
        heap.update("a", 3, 2);
        assert_eq!(labels(&heap.sorted()), vec![("a", 2), ("m", 2), ("z", 2)]);
    }

    #[test]
    fn test_recount_drops_zeroes() {
        let mut heap = TopK::new(3);
        heap.update("a", 1, 4);
        heap.update("b", 2, 2);
        heap.update("c", 3, 1);
        let counts: Vec<u32> = heap
            .items()
            .iter()
            .map(|i| if i.item == "b" { 0 } else { i.count * 2 })
            .collect();
        heap.recount(&counts);
        assert_eq!(heap.len(), 2);
        assert_eq!(labels(&heap.sorted()), vec![("a", 8), ("c", 2)]);
        // index still consistent after the rebuild
        assert!(heap.update("c", 3, 9));
        assert_eq!(labels(&heap.sorted()), vec![("c", 9), ("a", 8)]);
    }
}
