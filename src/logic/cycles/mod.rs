pub mod cache;
pub mod cycle;
pub mod enumerator;

pub use cache::CycleCache;
pub use cycle::{Cycle2, Cycle3, CycleArity, CycleKey, CycleRef};
pub use enumerator::{EnumerationReport, cache_cycles};
