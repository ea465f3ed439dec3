//! Errors surfaced by a path search.
//!
//! - **Recoverable**: [`SearchError::HopLimitReached`] carries whatever was
//!   found before the budget ran out; callers may retry with a larger
//!   budget or accept the partial set.
//! - **Fatal**: [`SearchError::GraphCorruption`] aborts the session.
//! - **Caller errors**: unknown endpoints, non-positive amounts.
//! - **Collaborator errors**: ledger and rate failures pass through as-is.
//!
//! A payment that cannot be fully routed is not an error. The search
//! returns the smaller [`PathSet`] and the caller decides what to do.

use crate::core::currency::RateError;
use crate::core::ledger::LedgerError;
use crate::core::link::LinkId;
use crate::core::node::NodeId;
use crate::search::path::PathSet;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("hop limit of {max_hops} reached with {} of the amount found", .partial.total())]
    HopLimitReached {
        max_hops: usize,
        /// Paths extracted before the budget ran out.
        partial: Box<PathSet>,
    },

    #[error("link {link} references missing node {node}")]
    GraphCorruption { link: LinkId, node: NodeId },

    #[error("unknown node {node}")]
    UnknownNode { node: NodeId },

    #[error("payment amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Rate(#[from] RateError),
}

impl SearchError {
    /// Whether retrying the same request (with a larger budget) can help.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SearchError::HopLimitReached { .. })
    }

    /// Paths found before the search stopped, if any were kept.
    pub fn partial(&self) -> Option<&PathSet> {
        match self {
            SearchError::HopLimitReached { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::RateName;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hop_limit_is_recoverable() {
        let err = SearchError::HopLimitReached {
            max_hops: 2,
            partial: Box::new(PathSet::new()),
        };
        assert!(err.is_recoverable());
        assert!(err.partial().unwrap().is_empty());
        assert_eq!(err.to_string(), "hop limit of 2 reached with 0 of the amount found");
    }

    #[test]
    fn test_corruption_is_fatal() {
        let err = SearchError::GraphCorruption {
            link: LinkId::from_u128(7),
            node: NodeId::new("ghost"),
        };
        assert!(!err.is_recoverable());
        assert!(err.partial().is_none());
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_collaborator_errors_pass_through() {
        let rate_err = RateError::NotFound {
            name: RateName::new("USDCAD"),
        };
        let err: SearchError = rate_err.clone().into();
        assert_eq!(err.to_string(), rate_err.to_string());

        let err = SearchError::InvalidAmount { amount: dec!(-3) };
        assert_eq!(err.to_string(), "payment amount must be positive, got -3");
    }
}
