//! # credit-path-engine
//!
//! Payment path search across multi-currency credit networks.
//!
//! Nodes extend each other credit through directed links. A payment from
//! one node to another travels along chains of links, converting currency
//! where consecutive links differ. Given a payment request, this engine
//! finds a set of paths whose combined capacity covers as much of the
//! amount as the network allows, without committing any credit.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: nodes, links, currencies and rates, the account ledger
//! - **graph** — Session view of the network and the hop-distance heuristic
//! - **search** — Path search engine, paths and path sets, requests and responses
//! - **simulation** — Random credit networks for testing and benchmarks

pub mod core;
pub mod graph;
pub mod search;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{CurrencyCode, RateName, RateTable};
    pub use crate::core::ledger::AccountLedger;
    pub use crate::core::link::{Link, LinkId, SearchDirection};
    pub use crate::core::node::NodeId;
    pub use crate::core::traits::{LinkSource, RateSource};
    pub use crate::search::config::SearchConfig;
    pub use crate::search::engine::PathSearchEngine;
    pub use crate::search::error::SearchError;
    pub use crate::search::path::{Path, PathHop, PathSet};
    pub use crate::search::request::{PathSearchResponse, PaymentRequest, SearchStatus};
}
