//! Dense bit set over state handles.
//!
//! Backs final-state sets, the result of reachability, and the pair
//! matrices of the simulation solver.

use std::fmt;

use crate::types::StateId;

const WORD: usize = u64::BITS as usize;

/// Set of small indices packed into `u64` words.
///
/// Grows on insertion; indices past the end are simply absent.
#[derive(Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
    /// Number of set bits.
    count: usize,
}

impl BitSet {
    /// Empty set with room for indices in `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD)],
            count: 0,
        }
    }

    /// The set `0..len`.
    pub fn full(len: usize) -> Self {
        let mut words = vec![u64::MAX; len / WORD];
        if len % WORD != 0 {
            words.push((1u64 << (len % WORD)) - 1);
        }
        Self { words, count: len }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD)
            .is_some_and(|w| w & (1u64 << (index % WORD)) != 0)
    }

    /// Returns true if `index` was absent.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let word = index / WORD;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << (index % WORD);
        let absent = self.words[word] & mask == 0;
        self.words[word] |= mask;
        self.count += usize::from(absent);
        absent
    }

    /// Returns true if `index` was present.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(w) = self.words.get_mut(index / WORD) else {
            return false;
        };
        let mask = 1u64 << (index % WORD);
        let present = *w & mask != 0;
        *w &= !mask;
        self.count -= usize::from(present);
        present
    }

    #[inline]
    pub fn contains_state(&self, id: StateId) -> bool {
        self.contains(id.index())
    }

    #[inline]
    pub fn insert_state(&mut self, id: StateId) -> bool {
        self.insert(id.index())
    }

    /// Set indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * WORD + bit)
            })
        })
    }

    /// Set indices as state handles, in canonical order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.iter().map(StateId::new)
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for BitSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = BitSet::default();
        for id in iter {
            set.insert_state(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_is_absent() {
        let mut set = BitSet::new(4);
        assert!(!set.contains(1000));
        assert!(!set.remove(1000));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_remove_counts() {
        let mut set = BitSet::new(8);
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(200));
        assert_eq!(set.len(), 2);
        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![200]);
    }

    #[test]
    fn test_full_partial_word() {
        let set = BitSet::full(70);
        assert_eq!(set.len(), 70);
        assert_eq!(set.iter().count(), 70);
        assert!(set.contains(69));
        assert!(!set.contains(70));
        assert!(BitSet::full(0).is_empty());
        assert_eq!(BitSet::full(64).iter().last(), Some(63));
    }

    #[test]
    fn test_states_in_canonical_order() {
        let set: BitSet = [StateId::new(65), StateId::new(2), StateId::new(0)].into_iter().collect();
        assert!(set.contains_state(StateId::new(2)));
        assert_eq!(
            set.states().collect::<Vec<_>>(),
            vec![StateId::new(0), StateId::new(2), StateId::new(65)]
        );
        assert_eq!(format!("{:?}", set), "{0, 2, 65}");
    }
}
