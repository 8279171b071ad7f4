//! Constant-time set of cell indices with uniform sampling.

use std::{iter::Copied, slice};

use rand::Rng;

use crate::{error::SetError, CellIndex};

const VACANT: usize = usize::MAX;

/// Set of cell indices supporting O(1) insertion, removal, membership and
/// uniform sampling.
///
/// Members live in a dense `values` vector; `slots` is a reverse index mapping
/// each value to its position in `values`. Removal swaps the last member into
/// the vacated slot so both vectors stay compact. The reverse index is sized by
/// the largest value ever stored, which keeps it bounded by the grid area when
/// the set tracks cells.
#[derive(Clone, Debug, Default)]
pub struct RandomizedSet {
    values: Vec<CellIndex>,
    slots: Vec<usize>,
}

impl RandomizedSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Creates an empty set whose reverse index already covers `0..bound`.
    #[must_use]
    pub fn with_bound(bound: usize) -> Self {
        Self {
            values: Vec::with_capacity(bound),
            slots: vec![VACANT; bound],
        }
    }

    /// Inserts `value`; does nothing when it is already a member.
    pub fn add(&mut self, value: CellIndex) {
        if self.contains(value) {
            return;
        }
        if value >= self.slots.len() {
            self.slots.resize(value + 1, VACANT);
        }
        self.slots[value] = self.values.len();
        self.values.push(value);
    }

    /// Removes `value`; does nothing when it is not a member.
    pub fn remove(&mut self, value: CellIndex) {
        let Some(slot) = self.slot_of(value) else {
            return;
        };
        let _ = self.values.swap_remove(slot);
        if let Some(&moved) = self.values.get(slot) {
            self.slots[moved] = slot;
        }
        self.slots[value] = VACANT;
    }

    /// Reports whether `value` is a member.
    #[must_use]
    pub fn contains(&self, value: CellIndex) -> bool {
        self.slot_of(value).is_some()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Reports whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes every member while keeping the allocated reverse index.
    pub fn clear(&mut self) {
        for &value in &self.values {
            self.slots[value] = VACANT;
        }
        self.values.clear();
    }

    /// Picks a member uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`SetError::Empty`] when the set has no members.
    pub fn random_element<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<CellIndex, SetError> {
        if self.values.is_empty() {
            return Err(SetError::Empty);
        }
        let index = rng.gen_range(0..self.values.len());
        Ok(self.values[index])
    }

    /// Replaces every member `v` with `v + delta`.
    ///
    /// Shifting distinct values by a common delta keeps them distinct, so only
    /// underflow can fail. The set is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns [`SetError::ShiftOutOfRange`] when a member would become negative.
    pub fn shift_all(&mut self, delta: isize) -> Result<(), SetError> {
        if delta == 0 {
            return Ok(());
        }
        if let Some(&value) = self
            .values
            .iter()
            .find(|value| value.checked_add_signed(delta).is_none())
        {
            return Err(SetError::ShiftOutOfRange { value, delta });
        }

        for &value in &self.values {
            self.slots[value] = VACANT;
        }
        for (slot, value) in self.values.iter_mut().enumerate() {
            *value = value.wrapping_add_signed(delta);
            if *value >= self.slots.len() {
                self.slots.resize(*value + 1, VACANT);
            }
            self.slots[*value] = slot;
        }
        Ok(())
    }

    /// Adds every member of `other`.
    pub fn union(&mut self, other: &RandomizedSet) {
        for &value in &other.values {
            self.add(value);
        }
    }

    /// Removes every member of `other`.
    pub fn difference(&mut self, other: &RandomizedSet) {
        for &value in &other.values {
            self.remove(value);
        }
    }

    /// Members in storage order. The order is unspecified and changes on removal.
    #[must_use]
    pub fn as_slice(&self) -> &[CellIndex] {
        &self.values
    }

    /// Iterator over the members in storage order.
    pub fn iter(&self) -> Copied<slice::Iter<'_, CellIndex>> {
        self.values.iter().copied()
    }

    fn slot_of(&self, value: CellIndex) -> Option<usize> {
        match self.slots.get(value) {
            Some(&slot) if slot != VACANT => Some(slot),
            _ => None,
        }
    }
}

impl PartialEq for RandomizedSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}

impl Eq for RandomizedSet {}

impl FromIterator<CellIndex> for RandomizedSet {
    fn from_iter<I: IntoIterator<Item = CellIndex>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<CellIndex> for RandomizedSet {
    fn extend<I: IntoIterator<Item = CellIndex>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a> IntoIterator for &'a RandomizedSet {
    type Item = CellIndex;
    type IntoIter = Copied<slice::Iter<'a, CellIndex>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn assert_reverse_index_consistent(set: &RandomizedSet) {
        for (slot, &value) in set.values.iter().enumerate() {
            assert_eq!(set.slots[value], slot, "slot for {value} drifted");
        }
        let occupied = set.slots.iter().filter(|&&slot| slot != VACANT).count();
        assert_eq!(occupied, set.values.len(), "stale reverse index entries");
    }

    #[test]
    fn add_is_idempotent() {
        let mut set = RandomizedSet::new();
        set.add(4);
        set.add(4);
        assert_eq!(set.len(), 1);
        assert!(set.contains(4));
    }

    #[test]
    fn remove_missing_value_is_noop() {
        let mut set: RandomizedSet = [1, 2, 3].into_iter().collect();
        set.remove(9);
        set.remove(1_000);
        assert_eq!(set.len(), 3);
        assert_reverse_index_consistent(&set);
    }

    #[test]
    fn remove_swaps_last_member_into_slot() {
        let mut set: RandomizedSet = [10, 20, 30, 40].into_iter().collect();
        set.remove(20);
        assert_eq!(set.as_slice(), &[10, 40, 30]);
        assert_reverse_index_consistent(&set);
        set.remove(30);
        assert_eq!(set.as_slice(), &[10, 40]);
        assert_reverse_index_consistent(&set);
    }

    #[test]
    fn random_element_on_empty_set_is_an_error() {
        let set = RandomizedSet::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(set.random_element(&mut rng), Err(SetError::Empty));
    }

    #[test]
    fn random_element_reaches_every_member() {
        let set: RandomizedSet = [3, 5, 8].into_iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            let _ = seen.insert(set.random_element(&mut rng).expect("non-empty"));
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![3, 5, 8]);
    }

    #[test]
    fn shift_below_zero_is_rejected_without_mutation() {
        let mut set: RandomizedSet = [0, 4].into_iter().collect();
        assert_eq!(
            set.shift_all(-1),
            Err(SetError::ShiftOutOfRange { value: 0, delta: -1 })
        );
        assert!(set.contains(0) && set.contains(4));
        assert_reverse_index_consistent(&set);
    }

    #[test]
    fn union_and_difference_follow_membership() {
        let mut left: RandomizedSet = [1, 2, 3].into_iter().collect();
        let right: RandomizedSet = [3, 4].into_iter().collect();
        left.union(&right);
        assert_eq!(left, [1, 2, 3, 4].into_iter().collect());
        left.difference(&right);
        assert_eq!(left, [1, 2].into_iter().collect());
        assert_reverse_index_consistent(&left);
    }

    #[test]
    fn clear_allows_reuse() {
        let mut set = RandomizedSet::with_bound(16);
        set.extend([1, 5, 9]);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(5));
        set.add(5);
        assert!(set.contains(5));
        assert_reverse_index_consistent(&set);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(usize),
        Remove(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..64).prop_map(Op::Add),
            (0usize..64).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn membership_matches_reference_model(ops in proptest::collection::vec(op_strategy(), 0..200)) {
            let mut set = RandomizedSet::new();
            let mut model = BTreeSet::new();
            for op in ops {
                match op {
                    Op::Add(value) => {
                        set.add(value);
                        let _ = model.insert(value);
                    }
                    Op::Remove(value) => {
                        set.remove(value);
                        let _ = model.remove(&value);
                    }
                }
                prop_assert_eq!(set.len(), model.len());
            }
            for value in 0..64 {
                prop_assert_eq!(set.contains(value), model.contains(&value));
            }
            assert_reverse_index_consistent(&set);
        }

        #[test]
        fn shift_then_unshift_restores_members(
            values in proptest::collection::btree_set(0usize..500, 0..50),
            delta in 0isize..100,
        ) {
            let original: RandomizedSet = values.iter().copied().collect();
            let mut shifted = original.clone();
            shifted.shift_all(delta).expect("positive shift");
            for &value in &values {
                prop_assert!(shifted.contains(value + delta as usize));
            }
            shifted.shift_all(-delta).expect("shift back");
            prop_assert_eq!(&shifted, &original);
            assert_reverse_index_consistent(&shifted);
        }

        #[test]
        fn remove_leaves_other_members_untouched(
            values in proptest::collection::btree_set(0usize..200, 1..40),
            pick in any::<proptest::sample::Index>(),
        ) {
            let mut set: RandomizedSet = values.iter().copied().collect();
            let victim = *pick.get(&values.iter().copied().collect::<Vec<_>>());
            set.remove(victim);
            prop_assert!(!set.contains(victim));
            prop_assert_eq!(set.len(), values.len() - 1);
            for &value in values.iter().filter(|&&value| value != victim) {
                prop_assert!(set.contains(value));
            }
        }
    }
}
