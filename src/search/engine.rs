use crate::core::currency::CurrencyCode;
use crate::core::node::NodeId;
use crate::core::traits::{LinkSource, RateSource};
use crate::search::config::SearchConfig;
use crate::search::error::SearchError;
use crate::search::path::PathSet;
use crate::search::request::{PathSearchResponse, PaymentRequest};
use crate::search::session::{Extraction, SearchSession};
use rust_decimal::Decimal;
use std::iter;

/// Why a payer's turn ended.
enum Stop {
    Met,
    Exhausted,
    HopLimit,
}

/// Finds sets of credit paths that together deliver a payment.
///
/// The engine holds no per-search state. Each call opens its own session
/// with private reservations and distance estimates, so one engine (or
/// many engines over the same ledger) can serve concurrent requests.
///
/// Paths are extracted one at a time, each carrying as much of the
/// outstanding amount as its links allow, until the amount is met, the
/// network is out of capacity, or the hop budget runs out.
///
/// # Examples
///
/// ```
/// use credit_path_engine::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut ledger = AccountLedger::new();
/// for n in ["alice", "bob", "carol"] {
///     ledger.add_node(NodeId::new(n)).unwrap();
/// }
/// let usd = CurrencyCode::new("USD");
/// ledger.open_link(Link::new("alice".into(), "bob".into(), dec!(100), usd.clone())).unwrap();
/// ledger.open_link(Link::new("bob".into(), "carol".into(), dec!(60), usd.clone())).unwrap();
///
/// let rates = RateTable::new();
/// let engine = PathSearchEngine::new(&ledger, &rates);
/// let paths = engine
///     .find_payment_paths(&"alice".into(), &"carol".into(), dec!(80), &usd, 10)
///     .unwrap();
///
/// assert_eq!(paths.total(), dec!(60));
/// assert_eq!(paths.paths()[0].len(), 2);
/// ```
pub struct PathSearchEngine<'a> {
    links: &'a dyn LinkSource,
    rates: &'a dyn RateSource,
    config: SearchConfig,
}

impl<'a> PathSearchEngine<'a> {
    pub fn new(links: &'a dyn LinkSource, rates: &'a dyn RateSource) -> Self {
        Self::with_config(links, rates, SearchConfig::default())
    }

    pub fn with_config(
        links: &'a dyn LinkSource,
        rates: &'a dyn RateSource,
        config: SearchConfig,
    ) -> Self {
        Self {
            links,
            rates,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find paths from `source` to `destination` delivering up to `amount`
    /// of `currency`.
    ///
    /// A total below `amount` is not an error; it means the network could
    /// not carry more. Exceeding `max_hops` link traversals returns
    /// [`SearchError::HopLimitReached`] with the paths found so far.
    pub fn find_payment_paths(
        &self,
        source: &NodeId,
        destination: &NodeId,
        amount: Decimal,
        currency: &CurrencyCode,
        max_hops: usize,
    ) -> Result<PathSet, SearchError> {
        self.find_pooled_payment_paths(
            std::slice::from_ref(source),
            destination,
            amount,
            currency,
            max_hops,
        )
    }

    /// Like [`find_payment_paths`](Self::find_payment_paths), drawing on
    /// several payers in turn.
    ///
    /// Each payer is drained before moving to the next. All payers share
    /// one session, so credit used for one is not offered again to the
    /// next, and the hop budget covers the whole request. A payer equal to
    /// the destination is skipped.
    pub fn find_pooled_payment_paths(
        &self,
        payers: &[NodeId],
        destination: &NodeId,
        amount: Decimal,
        currency: &CurrencyCode,
        max_hops: usize,
    ) -> Result<PathSet, SearchError> {
        if amount <= Decimal::ZERO {
            return Err(SearchError::InvalidAmount { amount });
        }
        for node in payers.iter().chain(iter::once(destination)) {
            if !self.links.contains_node(node) {
                return Err(SearchError::UnknownNode { node: node.clone() });
            }
        }

        let mut found = PathSet::new();
        let mut payers = payers.iter().filter(|p| *p != destination).peekable();
        let Some(first) = payers.peek() else {
            return Ok(found);
        };

        let mut session = SearchSession::new(
            self.links,
            self.rates,
            &self.config,
            (*first).clone(),
            destination.clone(),
            currency.clone(),
            max_hops,
        );
        let epsilon = self.config.epsilon();

        for payer in payers {
            session.switch_payer(payer.clone());
            let mut drawn = PathSet::new();
            let stop = loop {
                let remaining = amount - found.total() - drawn.total();
                if remaining <= epsilon {
                    break Stop::Met;
                }
                match session.next_path(remaining)? {
                    Extraction::Path(path) => drawn.push(path),
                    Extraction::Dust => {}
                    Extraction::Exhausted => break Stop::Exhausted,
                    Extraction::HopLimit => break Stop::HopLimit,
                }
            };
            log::debug!(
                "{} drew {} {} over {} path(s)",
                payer,
                drawn.total(),
                currency,
                drawn.len()
            );
            found.merge(drawn);

            match stop {
                Stop::Met => break,
                Stop::Exhausted => {}
                Stop::HopLimit => {
                    log::info!(
                        "hop limit {} reached with {} of {} {} found",
                        max_hops,
                        found.total(),
                        amount,
                        currency
                    );
                    return Err(SearchError::HopLimitReached {
                        max_hops,
                        partial: Box::new(found),
                    });
                }
            }
        }

        log::info!(
            "{} path(s) carrying {} of {} {} to {} ({} hops left, {} link(s) reserved, {} node(s) exhausted)",
            found.len(),
            found.total(),
            amount,
            currency,
            destination,
            session.hops_left(),
            session.reserved().len(),
            session.exhausted().len()
        );
        Ok(found)
    }

    /// Run a request using its hop budget, or the configured one.
    pub fn search(&self, request: &PaymentRequest) -> Result<PathSet, SearchError> {
        self.find_payment_paths(
            &request.source,
            &request.destination,
            request.amount,
            &request.currency,
            request.max_hops.unwrap_or(self.config.max_hops),
        )
    }

    /// Run a request and summarize it, folding a hop-limit stop into the
    /// response status.
    pub fn respond(&self, request: &PaymentRequest) -> Result<PathSearchResponse, SearchError> {
        PathSearchResponse::from_outcome(request, self.search(request), self.config.epsilon())
    }
}
