pub mod price_graph;

pub use price_graph::{FastHashMap, FastHasher, PriceGraph, QuoteEdge, QuoteMap, TokenNode};
