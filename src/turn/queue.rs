//! The unit activation queue.
//!
//! FIFO of units waiting for orders during a nation's units phase. The only
//! reorderings are `prioritize` (move to front) and `append` (move to back),
//! and a unit never appears twice.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::world::UnitId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationQueue {
    units: VecDeque<UnitId>,
}

impl ActivationQueue {
    /// Builds a queue in ascending id order, dropping duplicates.
    pub fn from_units(units: impl IntoIterator<Item = UnitId>) -> Self {
        let mut ids: Vec<UnitId> = units.into_iter().collect();
        ids.sort();
        ids.dedup();
        ActivationQueue { units: ids.into() }
    }

    pub fn front(&self) -> Option<UnitId> {
        self.units.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<UnitId> {
        self.units.pop_front()
    }

    /// Moves (or inserts) `unit` to the front.
    pub fn prioritize(&mut self, unit: UnitId) {
        self.remove(unit);
        self.units.push_front(unit);
    }

    /// Moves (or inserts) `unit` to the back.
    pub fn append(&mut self, unit: UnitId) {
        self.remove(unit);
        self.units.push_back(unit);
    }

    pub fn remove(&mut self, unit: UnitId) {
        self.units.retain(|u| *u != unit);
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn built_sorted_and_unique() {
        let q = ActivationQueue::from_units([UnitId(5), UnitId(2), UnitId(5), UnitId(9)]);
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![UnitId(2), UnitId(5), UnitId(9)]);
    }

    #[test]
    fn append_moves_to_back() {
        let mut q = ActivationQueue::from_units([UnitId(1), UnitId(2), UnitId(3)]);
        q.append(UnitId(1));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![UnitId(2), UnitId(3), UnitId(1)]);
    }

    proptest! {
        #[test]
        fn prioritize_leaves_one_occurrence_at_front(
            ids in proptest::collection::vec(0u32..50, 0..30),
            target in 0u32..50,
        ) {
            let mut q = ActivationQueue::from_units(ids.iter().map(|i| UnitId(*i)));
            let before = q.len();
            let present = q.contains(UnitId(target));
            q.prioritize(UnitId(target));
            prop_assert_eq!(q.front(), Some(UnitId(target)));
            prop_assert_eq!(q.iter().filter(|u| *u == UnitId(target)).count(), 1);
            prop_assert_eq!(q.len(), if present { before } else { before + 1 });
        }

        #[test]
        fn reordering_preserves_membership(
            ids in proptest::collection::vec(0u32..50, 1..30),
            pick in 0usize..30,
        ) {
            let mut q = ActivationQueue::from_units(ids.iter().map(|i| UnitId(*i)));
            let mut before: Vec<_> = q.iter().collect();
            let target = before[pick % before.len()];
            q.append(target);
            q.prioritize(target);
            let mut after: Vec<_> = q.iter().collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
