//! The ranked list shown in the left pane

use crate::sketch::Sketch;

/// A displayed top-K entry. `rank` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    pub label: String,
    pub fingerprint: u32,
    pub rank: usize,
    pub count: u32,
}

/// Snapshot the sketch's current ranking.
pub fn refresh_ranked(sketch: &Sketch) -> Vec<TrackedItem> {
    sketch
        .sorted_slice()
        .into_iter()
        .enumerate()
        .map(|(i, item)| TrackedItem {
            label: item.item,
            fingerprint: item.fingerprint,
            rank: i + 1,
            count: item.count,
        })
        .collect()
}

/// Update counts in place from point lookups; order and length are kept.
pub fn refresh_counts(sketch: &Sketch, items: &mut [TrackedItem]) {
    for item in items {
        item.count = sketch.count(&item.label);
    }
}

/// Index of the entry labelled `label`.
pub fn position_of(items: &[TrackedItem], label: &str) -> Option<usize> {
    items.iter().position(|item| item.label == label)
}

/// Ranked entries plus the selection cursor.
#[derive(Debug, Clone, Default)]
pub struct RankedSetView {
    items: Vec<TrackedItem>,
    selected: usize,
}

impl RankedSetView {
    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cursor index; only meaningful when the list is not empty.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&TrackedItem> {
        self.items.get(self.selected)
    }

    /// Install a fresh ranking. With `track` set the cursor follows the
    /// previously selected label to its new position; otherwise it keeps its
    /// index.
    pub fn replace(&mut self, items: Vec<TrackedItem>, track: bool) {
        let followed = if track {
            self.selected_item().map(|item| item.label.clone())
        } else {
            None
        };
        self.items = items;
        if let Some(index) = followed.and_then(|label| position_of(&self.items, &label)) {
            self.selected = index;
        }
        self.clamp();
    }

    /// Update counts in place without reordering.
    pub fn refresh_counts(&mut self, sketch: &Sketch) {
        refresh_counts(sketch, &mut self.items);
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index;
        self.clamp();
    }

    pub fn select_next(&mut self) {
        self.select(self.selected.saturating_add(1));
    }

    pub fn select_previous(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn page_down(&mut self, page: usize) {
        self.select(self.selected.saturating_add(page.max(1)));
    }

    pub fn page_up(&mut self, page: usize) {
        self.select(self.selected.saturating_sub(page.max(1)));
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(self.items.len().saturating_sub(1));
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::SketchOptions;

    fn item(label: &str, rank: usize, count: u32) -> TrackedItem {
        TrackedItem {
            label: label.to_string(),
            fingerprint: Sketch::fingerprint(label),
            rank,
            count,
        }
    }

    fn sketch() -> Sketch {
        Sketch::new(
            10,
            5,
            SketchOptions {
                width: 500,
                seed: Some(3),
                ..SketchOptions::default()
            },
        )
    }

    #[test]
    fn test_refresh_ranked_orders_by_count() {
        let mut s = sketch();
        s.add("a", 3);
        s.add("b", 1);
        let items = refresh_ranked(&s);
        assert_eq!(items, vec![item("a", 1, 3), item("b", 2, 1)]);
    }

    #[test]
    fn test_tracking_follows_label() {
        let mut view = RankedSetView::default();
        view.replace(vec![item("a", 1, 3), item("b", 2, 2), item("c", 3, 1)], true);
        view.select(1);
        view.replace(vec![item("b", 1, 9), item("a", 2, 3), item("c", 3, 1)], true);
        assert_eq!(view.selected(), 0);
        assert_eq!(view.selected_item().map(|i| i.label.as_str()), Some("b"));
    }

    #[test]
    fn test_untracked_keeps_index() {
        let mut view = RankedSetView::default();
        view.replace(vec![item("a", 1, 3), item("b", 2, 2)], false);
        view.select(1);
        view.replace(vec![item("b", 1, 9), item("a", 2, 3)], false);
        assert_eq!(view.selected(), 1);
        assert_eq!(view.selected_item().map(|i| i.label.as_str()), Some("a"));
    }

    #[test]
    fn test_selection_clamps_when_list_shrinks() {
        let mut view = RankedSetView::default();
        view.replace(vec![item("a", 1, 3), item("b", 2, 2), item("c", 3, 1)], true);
        view.select_last();
        assert_eq!(view.selected(), 2);
        view.replace(vec![item("a", 1, 3)], true);
        assert_eq!(view.selected(), 0);
        view.replace(Vec::new(), true);
        assert!(view.selected_item().is_none());
    }

    #[test]
    fn test_refresh_counts_keeps_order() {
        let mut s = sketch();
        s.add("a", 3);
        s.add("b", 1);
        let mut view = RankedSetView::default();
        view.replace(refresh_ranked(&s), false);
        s.add("b", 10);
        view.refresh_counts(&s);
        let labels: Vec<_> = view.items().iter().map(|i| (i.label.as_str(), i.count)).collect();
        assert_eq!(labels, vec![("a", 3), ("b", 11)]);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut view = RankedSetView::default();
        view.select_next();
        assert_eq!(view.selected(), 0);
        view.replace((1..=10).map(|r| item(&r.to_string(), r, 1)).collect(), false);
        view.page_down(4);
        assert_eq!(view.selected(), 4);
        view.page_down(20);
        assert_eq!(view.selected(), 9);
        view.select_previous();
        view.page_up(3);
        assert_eq!(view.selected(), 5);
        view.select_first();
        view.select_previous();
        assert_eq!(view.selected(), 0);
        assert_eq!(position_of(view.items(), "7"), Some(6));
        assert_eq!(position_of(view.items(), "x"), None);
    }
}
