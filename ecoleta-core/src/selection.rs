//! Toggle set of selected category ids.

use crate::model::CategoryId;

/// Selected categories, kept as an immutable value.
///
/// Every change produces a new set, so callers can compare the previous and
/// the current selection directly. Ids keep their insertion order for display,
/// while equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: Vec<CategoryId>,
}

impl SelectionSet {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new set with `id` removed if present, added otherwise.
    #[must_use]
    pub fn toggle(&self, id: CategoryId) -> Self {
        let ids = if self.contains(id) {
            self.ids
                .iter()
                .copied()
                .filter(|selected| *selected != id)
                .collect()
        } else {
            let mut ids = self.ids.clone();
            ids.push(id);
            ids
        };
        Self { ids }
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: CategoryId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.ids.iter().copied()
    }

    /// Selected ids in ascending order.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<CategoryId> {
        let mut ids = self.ids.clone();
        ids.sort_unstable();
        ids
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl Eq for SelectionSet {}
