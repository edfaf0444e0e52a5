use super::cache::CycleCache;
use super::cycle::{Cycle2, Cycle3, CycleKey};
use crate::logic::error::ExpansionError;
use crate::logic::graph::{FastHasher, PriceGraph};
use alloy_primitives::Address;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use tracing::{debug, error};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnumerationReport {
    pub cycles2_added: usize,
    pub cycles3_added: usize,
    /// Node-cycles whose token set was already expanded.
    pub skipped_cached: usize,
    pub anomalies: Vec<ExpansionError>,
}

impl EnumerationReport {
    pub fn cycles_added(&self) -> usize {
        self.cycles2_added + self.cycles3_added
    }
}

type Vertex = (Address, NodeIndex<usize>);

/// Walk every simple directed cycle of length 2 and 3 in `graph` and expand
/// the ones not yet cached into concrete cycles.
///
/// A node-cycle is discovered only from its lowest-address token, with
/// successors visited in ascending address order, so the walk is
/// deterministic.
pub fn cache_cycles(graph: &PriceGraph, cache: &mut CycleCache) -> EnumerationReport {
    let mut report = EnumerationReport::default();

    for start in graph.sorted_nodes() {
        for second in graph.sorted_successors(start.1) {
            if second.0 <= start.0 {
                continue;
            }
            if graph.quotes_by_index(second.1, start.1).is_some() {
                expand_pair(graph, cache, start, second, &mut report);
            }
            for third in graph.sorted_successors(second.1) {
                if third.0 <= start.0 || third.0 == second.0 {
                    continue;
                }
                if graph.quotes_by_index(third.1, start.1).is_some() {
                    expand_triangle(graph, cache, start, second, third, &mut report);
                }
            }
        }
    }

    debug!(
        cycles2 = report.cycles2_added,
        cycles3 = report.cycles3_added,
        skipped_cached = report.skipped_cached,
        anomalies = report.anomalies.len(),
        "Cycle enumeration pass finished"
    );
    report
}

fn expand_pair(graph: &PriceGraph, cache: &mut CycleCache, u: Vertex, v: Vertex, report: &mut EnumerationReport) {
    let key = CycleKey::pair(u.0, v.0);
    if !cache.reserve(key.clone()) {
        report.skipped_cached += 1;
        return;
    }

    // each direction is expanded on its own; a pool pair quoting both ways is emitted once
    let directions = [graph.parallel_pools(u.1, v.1), graph.parallel_pools(v.1, u.1)];
    if directions.iter().all(|pools| pools.len() < 2) {
        let found = directions.iter().map(Vec::len).max().unwrap_or_default();
        let anomaly = ExpansionError::InsufficientParallelEdges { found };
        error!(token0 = %u.0, token1 = %v.0, error = %anomaly, "Cannot expand 2-cycle");
        cache.release(&key);
        report.anomalies.push(anomaly);
        return;
    }

    let (token0, token1) = if u.0 < v.0 { (u.0, v.0) } else { (v.0, u.0) };
    let mut emitted: HashSet<[Address; 2], FastHasher> = HashSet::default();
    for pools in &directions {
        for (i, edge1) in pools.iter().enumerate() {
            for edge2 in &pools[i + 1..] {
                if emitted.insert([*edge1, *edge2]) {
                    cache.push_cycle2(Cycle2 { token0, token1, edge1: *edge1, edge2: *edge2 });
                    report.cycles2_added += 1;
                }
            }
        }
    }
}

fn expand_triangle(graph: &PriceGraph, cache: &mut CycleCache, a: Vertex, b: Vertex, c: Vertex, report: &mut EnumerationReport) {
    // rejected before reserving, so a later pass may retry; discovery never yields one
    if a.0 == b.0 || b.0 == c.0 || a.0 == c.0 {
        let anomaly = ExpansionError::DegenerateTriangle;
        error!(a = %a.0, b = %b.0, c = %c.0, "Skipping degenerate triangle");
        report.anomalies.push(anomaly);
        return;
    }

    let key = CycleKey::triangle(a.0, b.0, c.0);
    if !cache.reserve(key.clone()) {
        report.skipped_cached += 1;
        return;
    }

    let mut legs: [Vec<Address>; 3] = Default::default();
    for (slot, (from, to)) in legs.iter_mut().zip([(a, b), (b, c), (c, a)]) {
        *slot = graph.parallel_pools(from.1, to.1);
        if slot.is_empty() {
            let anomaly = ExpansionError::MissingLeg { from: from.0, to: to.0 };
            error!(error = %anomaly, "Cannot expand triangle");
            cache.release(&key);
            report.anomalies.push(anomaly);
            return;
        }
    }

    let [leg1, leg2, leg3] = &legs;
    for edge1 in leg1 {
        for edge2 in leg2 {
            for edge3 in leg3 {
                cache.push_cycle3(Cycle3 { token1: a.0, token2: b.0, token3: c.0, edge1: *edge1, edge2: *edge2, edge3: *edge3 });
                report.cycles3_added += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Token;
    use crate::logic::cycles::CycleArity;
    use crate::logic::graph::QuoteEdge;
    use rust_decimal::Decimal;

    fn a(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn link(graph: &mut PriceGraph, from: u8, to: u8, pool: u8) {
        let from_idx = graph.add_or_get_token(Token::repeat_byte(from));
        let to_idx = graph.add_or_get_token(Token::repeat_byte(to));
        let quote = QuoteEdge { pool: a(pool), weight: 0.0, price: Decimal::ONE, provider: "test".to_string(), fee: 0.003 };
        graph.upsert_quote(from_idx, to_idx, quote);
    }

    #[test]
    fn test_two_cycle_emits_every_unordered_pool_pair() {
        let mut graph = PriceGraph::new();
        for pool in [0xa1, 0xa2, 0xa3, 0xa4] {
            link(&mut graph, 1, 2, pool);
        }
        link(&mut graph, 2, 1, 0xa1);

        let mut cache = CycleCache::new();
        let report = cache_cycles(&graph, &mut cache);

        // C(4, 2)
        assert_eq!(report.cycles2_added, 6);
        let mut seen: Vec<[Address; 2]> = cache.cycles2().iter().map(Cycle2::edges).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 6);
        assert!(cache.cycles2().iter().all(|c| c.edge1 < c.edge2 && c.token0 == a(1) && c.token1 == a(2)));
    }

    #[test]
    fn test_triangle_emits_cartesian_product_once() {
        let mut graph = PriceGraph::new();
        link(&mut graph, 1, 2, 0x11);
        link(&mut graph, 1, 2, 0x12);
        link(&mut graph, 2, 3, 0x21);
        link(&mut graph, 2, 3, 0x22);
        link(&mut graph, 2, 3, 0x23);
        link(&mut graph, 3, 1, 0x31);
        // reverse direction of the same token set
        link(&mut graph, 1, 3, 0x41);
        link(&mut graph, 3, 2, 0x42);
        link(&mut graph, 2, 1, 0x43);

        let mut cache = CycleCache::new();
        let report = cache_cycles(&graph, &mut cache);

        assert_eq!(report.cycles3_added, 2 * 3);
        assert_eq!(report.skipped_cached, 1);
        assert!(cache.cycles3().iter().all(|c| c.tokens() == [a(1), a(2), a(3)]));
        assert!(cache.is_cached(&CycleKey::triangle(a(3), a(2), a(1))));
        for token in [a(1), a(2), a(3)] {
            assert!(cache.cycles_for_vertex(&token).iter().filter(|r| r.arity == CycleArity::Three).count() == 6);
        }
    }

    #[test]
    fn test_two_cycle_reads_higher_to_lower_direction() {
        let mut graph = PriceGraph::new();
        for pool in [0xa1, 0xa2, 0xa3] {
            link(&mut graph, 2, 1, pool);
        }
        link(&mut graph, 1, 2, 0xa1);

        let mut cache = CycleCache::new();
        let report = cache_cycles(&graph, &mut cache);

        assert_eq!(report.cycles2_added, 3);
        assert!(report.anomalies.is_empty());
        assert!(cache.cycles2().iter().all(|c| c.token0 == a(1) && c.token1 == a(2) && c.edge1 < c.edge2));
    }

    #[test]
    fn test_two_cycle_merges_pool_pairs_of_both_directions() {
        let mut graph = PriceGraph::new();
        for pool in [0xa1, 0xa2, 0xa3] {
            link(&mut graph, 1, 2, pool);
        }
        for pool in [0xa1, 0xa2, 0xb1] {
            link(&mut graph, 2, 1, pool);
        }

        let mut cache = CycleCache::new();
        let report = cache_cycles(&graph, &mut cache);

        // {a1,a2} {a1,a3} {a2,a3} one way, {a1,b1} {a2,b1} the other, {a1,a2} shared
        assert_eq!(report.cycles2_added, 5);
        let mut seen: Vec<[Address; 2]> = cache.cycles2().iter().map(Cycle2::edges).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_single_pool_pair_is_anomaly_and_released() {
        let mut graph = PriceGraph::new();
        link(&mut graph, 1, 2, 0x11);
        link(&mut graph, 2, 1, 0x11);

        let mut cache = CycleCache::new();
        let report = cache_cycles(&graph, &mut cache);

        assert_eq!(report.cycles_added(), 0);
        assert_eq!(report.anomalies, vec![ExpansionError::InsufficientParallelEdges { found: 1 }]);
        assert!(!cache.is_cached(&CycleKey::pair(a(1), a(2))));
    }

    #[test]
    fn test_second_pass_adds_nothing() {
        let mut graph = PriceGraph::new();
        link(&mut graph, 1, 2, 0x11);
        link(&mut graph, 2, 3, 0x21);
        link(&mut graph, 3, 1, 0x31);

        let mut cache = CycleCache::new();
        assert_eq!(cache_cycles(&graph, &mut cache).cycles3_added, 1);
        let again = cache_cycles(&graph, &mut cache);
        assert_eq!(again.cycles_added(), 0);
        assert_eq!(again.skipped_cached, 1);
        assert_eq!(cache.cycles3().len(), 1);
    }

    #[test]
    fn test_triangle_legs_start_from_lowest_token() {
        let mut graph = PriceGraph::new();
        // 3 -> 1 -> 2 -> 3 is the same directed cycle as 1 -> 2 -> 3 -> 1
        link(&mut graph, 3, 1, 0x31);
        link(&mut graph, 1, 2, 0x12);
        link(&mut graph, 2, 3, 0x23);

        let mut cache = CycleCache::new();
        cache_cycles(&graph, &mut cache);
        assert_eq!(
            cache.cycles3(),
            &[Cycle3 { token1: a(1), token2: a(2), token3: a(3), edge1: a(0x12), edge2: a(0x23), edge3: a(0x31) }]
        );
    }
}
