use crate::Token;
use ahash::RandomState;
use alloy_primitives::Address;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

pub type FastHasher = RandomState;
/// FastHashMap using ahash
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;

/// Quotes of one directed token pair, keyed by pool address.
pub type QuoteMap = HashMap<Address, QuoteEdge>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceGraph {
    // Nodes are tokens. There is at most one petgraph edge per ordered token
    // pair; its weight holds every pool quoting that direction.
    pub graph: DiGraph<TokenNode, QuoteMap, usize>,
    // token_address -> node index
    pub token_index: FastHashMap<Address, NodeIndex<usize>>,
}

impl PriceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.token_index.clear();
    }

    /// Insert the token unless its address is already known. The first
    /// sighting keeps its symbol and decimals.
    pub fn add_or_get_token(&mut self, token: Token) -> NodeIndex<usize> {
        *self.token_index.entry(token.get_address()).or_insert_with(|| self.graph.add_node(TokenNode::new(Arc::new(token))))
    }

    /// Insert or overwrite the quote of `quote.pool` for `from -> to`.
    /// Returns the quote it replaced.
    pub fn upsert_quote(&mut self, from: NodeIndex<usize>, to: NodeIndex<usize>, quote: QuoteEdge) -> Option<QuoteEdge> {
        match self.graph.find_edge(from, to) {
            Some(edge_index) => self.graph.edge_weight_mut(edge_index).and_then(|quotes| quotes.insert(quote.pool, quote)),
            None => {
                let mut quotes = QuoteMap::new();
                quotes.insert(quote.pool, quote);
                self.graph.add_edge(from, to, quotes);
                None
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of quote edges, counting every parallel pool.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_weights().map(|quotes| quotes.len()).sum()
    }

    /// Number of ordered token pairs with at least one quote.
    pub fn token_pair_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_token(&self, address: &Address) -> bool {
        self.token_index.contains_key(address)
    }

    pub fn get_token(&self, address: &Address) -> Option<&Arc<Token>> {
        self.token_index.get(address).map(|idx| &self.graph[*idx].token)
    }

    pub fn token_address(&self, index: NodeIndex<usize>) -> Option<Address> {
        self.graph.node_weight(index).map(|node| node.token.get_address())
    }

    pub fn quotes(&self, from: &Address, to: &Address) -> Option<&QuoteMap> {
        let from_idx = self.token_index.get(from)?;
        let to_idx = self.token_index.get(to)?;
        self.quotes_by_index(*from_idx, *to_idx)
    }

    pub fn quotes_by_index(&self, from: NodeIndex<usize>, to: NodeIndex<usize>) -> Option<&QuoteMap> {
        self.graph.find_edge(from, to).and_then(|edge_index| self.graph.edge_weight(edge_index))
    }

    pub fn get_quote(&self, from: &Address, to: &Address, pool: &Address) -> Option<&QuoteEdge> {
        self.quotes(from, to).and_then(|quotes| quotes.get(pool))
    }

    /// Pools quoting `from -> to`, ascending by address.
    pub fn parallel_pools(&self, from: NodeIndex<usize>, to: NodeIndex<usize>) -> Vec<Address> {
        let mut pools: Vec<Address> = self.quotes_by_index(from, to).map(|quotes| quotes.keys().copied().collect()).unwrap_or_default();
        pools.sort_unstable();
        pools
    }

    /// All nodes, ascending by token address.
    pub fn sorted_nodes(&self) -> Vec<(Address, NodeIndex<usize>)> {
        let mut nodes: Vec<(Address, NodeIndex<usize>)> = self.token_index.iter().map(|(address, idx)| (*address, *idx)).collect();
        nodes.sort_unstable();
        nodes
    }

    /// Distinct successors of `node`, ascending by token address.
    pub fn sorted_successors(&self, node: NodeIndex<usize>) -> Vec<(Address, NodeIndex<usize>)> {
        let mut successors: Vec<(Address, NodeIndex<usize>)> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .filter_map(|idx| self.token_address(idx).map(|address| (address, idx)))
            .collect();
        successors.sort_unstable();
        successors.dedup();
        successors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenNode {
    pub token: Arc<Token>,
}

impl TokenNode {
    pub fn new(token: Arc<Token>) -> Self {
        Self { token }
    }
}

impl Display for TokenNode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.token.get_symbol())
    }
}

/// One pool's quote for a directed token pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteEdge {
    pub pool: Address,
    /// `ln(price)`.
    pub weight: f64,
    pub price: Decimal,
    pub provider: String,
    /// Fraction, e.g. 0.003.
    pub fee: f64,
}
