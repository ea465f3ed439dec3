//! Collaborator interfaces consumed by the search engine.
//!
//! The engine only ever reads through these traits. Implementations are
//! expected to serve a consistent view for the duration of a search, either
//! a snapshot or data guarded by their own concurrency control.

use crate::core::currency::{RateError, RateName};
use crate::core::ledger::LedgerError;
use crate::core::link::Link;
use crate::core::node::NodeId;
use rust_decimal::Decimal;

/// Read access to accounts (links) and the nodes they connect.
pub trait LinkSource {
    /// All links whose paying side is `node`.
    fn links_from(&self, node: &NodeId) -> Result<Vec<Link>, LedgerError>;

    /// All links whose receiving side is `node`.
    fn links_to(&self, node: &NodeId) -> Result<Vec<Link>, LedgerError>;

    /// Whether `node` exists and has not been deleted.
    fn contains_node(&self, node: &NodeId) -> bool;
}

/// Read access to the currently effective value of named exchange rates.
pub trait RateSource {
    fn rate(&self, name: &RateName) -> Result<Decimal, RateError>;
}
