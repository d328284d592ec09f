//! Portfolio view: chain priorities, balance ranking and row projection.
//!
//! Everything here is synchronous and pure apart from logging. Callers
//! re-run [`ranker::rank`] and [`projector::project_all`] whenever the
//! balances or the prices change.

pub mod priority;
pub mod projector;
pub mod ranker;

pub use priority::{priority_of, Blockchain, DEFAULT_PRIORITY};
pub use projector::{project, project_all};
pub use ranker::{rank, rank_value};
