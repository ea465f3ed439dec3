//! Request and response shapes for callers that talk JSON.

use crate::core::currency::CurrencyCode;
use crate::core::link::LinkId;
use crate::core::node::NodeId;
use crate::search::error::SearchError;
use crate::search::path::{Path, PathSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payment to route: `amount` of `currency` delivered to `destination`.
///
/// # Examples
///
/// ```
/// use credit_path_engine::search::request::PaymentRequest;
///
/// let request: PaymentRequest = serde_json::from_str(
///     r#"{ "source": "alice", "destination": "dave", "amount": "40", "currency": "CAD" }"#,
/// ).unwrap();
/// assert_eq!(request.max_hops, None);
/// assert_eq!(request.destination.as_str(), "dave");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub source: NodeId,
    pub destination: NodeId,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Overrides the engine's default hop budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<usize>,
}

impl PaymentRequest {
    pub fn new(
        source: NodeId,
        destination: NodeId,
        amount: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            source,
            destination,
            amount,
            currency,
            max_hops: None,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = Some(max_hops);
        self
    }
}

/// How much of a request the search could route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// The full amount was found.
    Complete,
    /// The network ran out of capacity first.
    Partial,
    /// The hop budget ran out first.
    HopLimitReached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopView {
    pub link: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathView {
    /// Amount delivered, in the request currency.
    pub capacity: Decimal,
    /// Amount drawn on the first link, in its currency.
    pub source_amount: Decimal,
    pub source_currency: CurrencyCode,
    pub hops: Vec<HopView>,
}

impl From<&Path> for PathView {
    fn from(path: &Path) -> Self {
        Self {
            capacity: path.capacity(),
            source_amount: path.source_amount(),
            source_currency: path.source_currency().clone(),
            hops: path
                .hops()
                .iter()
                .map(|hop| HopView {
                    link: hop.link_id(),
                    from: hop.from().clone(),
                    to: hop.to().clone(),
                    amount: hop.amount(),
                    currency: hop.currency().clone(),
                })
                .collect(),
        }
    }
}

/// Flattened result of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSearchResponse {
    pub status: SearchStatus,
    pub requested: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub paths: Vec<PathView>,
}

impl PathSearchResponse {
    pub fn new(request: &PaymentRequest, paths: &PathSet, status: SearchStatus) -> Self {
        Self {
            status,
            requested: request.amount,
            total: paths.total(),
            currency: request.currency.clone(),
            paths: paths.iter().map(PathView::from).collect(),
        }
    }

    /// Turn a search outcome into a response.
    ///
    /// Running out of hops still produces a response carrying the partial
    /// paths. Any other error is passed back. A total within `epsilon` of
    /// the request counts as complete.
    pub fn from_outcome(
        request: &PaymentRequest,
        outcome: Result<PathSet, SearchError>,
        epsilon: Decimal,
    ) -> Result<Self, SearchError> {
        match outcome {
            Ok(paths) => {
                let status = if request.amount - paths.total() <= epsilon {
                    SearchStatus::Complete
                } else {
                    SearchStatus::Partial
                };
                Ok(Self::new(request, &paths, status))
            }
            Err(SearchError::HopLimitReached { partial, .. }) => {
                Ok(Self::new(request, &partial, SearchStatus::HopLimitReached))
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == SearchStatus::Complete
    }
}
