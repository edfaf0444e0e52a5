use alloy_primitives::Address;
use criterion::{Criterion, criterion_group, criterion_main};
use lazy_static::lazy_static;
use price_cycles::logic::cache_cycles;
use price_cycles::{CycleCache, PriceGraph, QuoteEdge, Token};
use rust_decimal::Decimal;
use std::hint::black_box;

const TOKENS: u8 = 24;
const POOLS_PER_PAIR: u8 = 2;

fn dense_graph() -> PriceGraph {
    let mut graph = PriceGraph::new();
    let mut pool = 0u64;
    for from in 1..=TOKENS {
        for to in 1..=TOKENS {
            if from == to {
                continue;
            }
            let from_idx = graph.add_or_get_token(Token::repeat_byte(from));
            let to_idx = graph.add_or_get_token(Token::repeat_byte(to));
            for _ in 0..POOLS_PER_PAIR {
                pool += 1;
                let quote = QuoteEdge {
                    pool: Address::left_padding_from(&pool.to_be_bytes()),
                    weight: 0.0,
                    price: Decimal::ONE,
                    provider: "uniswap_v2-bench".to_string(),
                    fee: 0.003,
                };
                graph.upsert_quote(from_idx, to_idx, quote);
            }
        }
    }
    graph
}

lazy_static! {
    static ref DENSE_GRAPH: PriceGraph = dense_graph();
}

fn benchmark_cache_cycles(c: &mut Criterion) {
    c.bench_function("cache_cycles_cold", |b| {
        b.iter(|| {
            let mut cache = CycleCache::new();
            black_box(cache_cycles(black_box(&DENSE_GRAPH), &mut cache));
        })
    });

    let mut warm = CycleCache::new();
    cache_cycles(&DENSE_GRAPH, &mut warm);
    c.bench_function("cache_cycles_warm", |b| {
        b.iter(|| {
            black_box(cache_cycles(black_box(&DENSE_GRAPH), &mut warm));
        })
    });
}

criterion_group!(benches, benchmark_cache_cycles);
criterion_main!(benches);
