use std::collections::{HashMap, HashSet};
use std::hash::Hash;


/// Map of sets used as one side of a many-to-many index
pub trait PairCollection<A, B> {
    /// Returns `true` if the pair was not present
    fn insert_pair(&mut self, key1: &A, key2: &B) -> bool
        where A: Clone, B: Clone;
    /// Returns `true` if the pair was present. Empty sets are dropped.
    fn remove_pair(&mut self, key1: &A, key2: &B) -> bool;
}

impl<A, B> PairCollection<A, B> for HashMap<A, HashSet<B>>
    where A: Eq + Hash,
          B: Eq + Hash,
{
    fn insert_pair(&mut self, key1: &A, key2: &B) -> bool
        where A: Clone, B: Clone
    {
        self.entry(key1.clone())
            .or_insert_with(HashSet::new)
            .insert(key2.clone())
    }
    fn remove_pair(&mut self, key1: &A, key2: &B) -> bool {
        let (removed, len) = if let Some(sub) = self.get_mut(key1) {
            (sub.remove(key2), sub.len())
        } else {
            return false;
        };
        if len == 0 {
            self.remove(key1);
        }
        removed
    }
}
