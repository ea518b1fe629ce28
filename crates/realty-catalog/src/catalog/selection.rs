use std::collections::HashSet;

use super::domain::ListingId;

/// Client-side set of marked (favorited) listing identifiers. Independent
/// of the filtered view: a marked listing may not be currently visible.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    marked: HashSet<ListingId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the mark for `id`, returning true when it is now marked.
    pub fn toggle(&mut self, id: &ListingId) -> bool {
        if self.marked.remove(id) {
            false
        } else {
            self.marked.insert(id.clone());
            true
        }
    }

    pub fn is_marked(&self, id: &ListingId) -> bool {
        self.marked.contains(id)
    }

    pub fn marked(&self) -> Vec<ListingId> {
        self.marked.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_the_original_state() {
        let mut tracker = SelectionTracker::new();
        let id = ListingId("lst-000007".to_string());

        assert!(tracker.toggle(&id));
        assert!(tracker.is_marked(&id));
        assert!(!tracker.toggle(&id));
        assert!(!tracker.is_marked(&id));
        assert!(tracker.is_empty());
    }

    #[test]
    fn clear_unmarks_everything_at_once() {
        let mut tracker = SelectionTracker::new();
        tracker.toggle(&ListingId("lst-000001".to_string()));
        tracker.toggle(&ListingId("lst-000002".to_string()));
        assert_eq!(tracker.len(), 2);

        tracker.clear();
        assert!(tracker.is_empty());
        assert!(!tracker.is_marked(&ListingId("lst-000001".to_string())));
    }

    #[test]
    fn marks_are_independent_of_any_visible_view() {
        let mut tracker = SelectionTracker::new();
        // Identifier never loaded into any store.
        let ghost = ListingId("not-in-catalog".to_string());
        assert!(tracker.toggle(&ghost));
        assert_eq!(tracker.len(), 1);
    }
}
