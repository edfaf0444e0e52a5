use super::cycle::{Cycle2, Cycle3, CycleArity, CycleKey, CycleRef};
use crate::logic::graph::{FastHashMap, FastHasher};
use alloy_primitives::Address;
use std::collections::HashSet;

/// Expanded cycles plus the bookkeeping that keeps expansion idempotent.
///
/// A token set is `reserve`d before expansion and `release`d if expansion
/// fails, so only successfully expanded sets stay cached.
#[derive(Clone, Debug, Default)]
pub struct CycleCache {
    keys: HashSet<CycleKey, FastHasher>,
    cycles2: Vec<Cycle2>,
    cycles3: Vec<Cycle3>,
    vertex_index: FastHashMap<Address, Vec<CycleRef>>,
}

impl CycleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.cycles2.clear();
        self.cycles3.clear();
        self.vertex_index.clear();
    }

    /// Returns `false` when the key is already cached.
    pub fn reserve(&mut self, key: CycleKey) -> bool {
        self.keys.insert(key)
    }

    pub fn release(&mut self, key: &CycleKey) -> bool {
        self.keys.remove(key)
    }

    pub fn is_cached(&self, key: &CycleKey) -> bool {
        self.keys.contains(key)
    }

    pub fn cached_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn push_cycle2(&mut self, cycle: Cycle2) -> usize {
        let cycle_ref = CycleRef { arity: CycleArity::Two, index: self.cycles2.len() };
        self.index_vertices(&cycle.tokens(), cycle_ref);
        self.cycles2.push(cycle);
        cycle_ref.index
    }

    pub fn push_cycle3(&mut self, cycle: Cycle3) -> usize {
        let cycle_ref = CycleRef { arity: CycleArity::Three, index: self.cycles3.len() };
        self.index_vertices(&cycle.tokens(), cycle_ref);
        self.cycles3.push(cycle);
        cycle_ref.index
    }

    fn index_vertices(&mut self, tokens: &[Address], cycle_ref: CycleRef) {
        for token in tokens {
            let refs = self.vertex_index.entry(*token).or_default();
            if !refs.contains(&cycle_ref) {
                refs.push(cycle_ref);
            }
        }
    }

    pub fn cycles2(&self) -> &[Cycle2] {
        &self.cycles2
    }

    pub fn cycles3(&self) -> &[Cycle3] {
        &self.cycles3
    }

    /// Every cycle touching `token`, in insertion order.
    pub fn cycles_for_vertex(&self, token: &Address) -> &[CycleRef] {
        self.vertex_index.get(token).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles2.is_empty() && self.cycles3.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_reserve_release() {
        let mut cache = CycleCache::new();
        let key = CycleKey::triangle(a(1), a(2), a(3));

        assert!(cache.reserve(key.clone()));
        assert!(!cache.reserve(CycleKey::triangle(a(3), a(1), a(2))));
        assert!(cache.release(&key));
        assert!(!cache.is_cached(&key));
        assert!(cache.reserve(key));
    }

    #[test]
    fn test_vertex_index_tracks_arity() {
        let mut cache = CycleCache::new();
        let i2 = cache.push_cycle2(Cycle2 { token0: a(1), token1: a(2), edge1: a(8), edge2: a(9) });
        let i3 = cache.push_cycle3(Cycle3 { token1: a(1), token2: a(2), token3: a(3), edge1: a(7), edge2: a(8), edge3: a(9) });

        assert_eq!(
            cache.cycles_for_vertex(&a(1)),
            &[CycleRef { arity: CycleArity::Two, index: i2 }, CycleRef { arity: CycleArity::Three, index: i3 }]
        );
        assert_eq!(cache.cycles_for_vertex(&a(3)), &[CycleRef { arity: CycleArity::Three, index: 0 }]);
        assert!(cache.cycles_for_vertex(&a(4)).is_empty());
        assert_eq!(cache.vertex_count(), 3);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.vertex_count(), 0);
    }
}
