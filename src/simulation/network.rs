//! Random credit networks for load and property testing.
//!
//! Nodes are named `NODE-000`, `NODE-001`, ... and every ordered pair of
//! currencies gets a rate named by concatenating the codes (`USDCAD`).
//! A link whose currency differs from any of its payer's incoming links
//! is tagged with the rate from the first such currency, so most
//! junctions in a generated network can be crossed.

use crate::core::currency::{CurrencyCode, RateName, RateTable};
use crate::core::ledger::{AccountLedger, LedgerError};
use crate::core::link::{Link, LinkId};
use crate::core::node::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for generating a random credit network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of nodes in the network.
    pub node_count: usize,
    /// Outgoing links opened per node.
    pub links_per_node: usize,
    /// Currencies links are denominated in.
    pub currencies: Vec<CurrencyCode>,
    /// Minimum link credit.
    pub min_credit: Decimal,
    /// Maximum link credit.
    pub max_credit: Decimal,
    /// Fixed seed for reproducible networks.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_count: 10,
            links_per_node: 3,
            currencies: vec![CurrencyCode::new("USD")],
            min_credit: Decimal::from(10),
            max_credit: Decimal::from(10_000),
            seed: None,
        }
    }
}

/// A generated ledger together with the rates its links refer to.
#[derive(Debug, Clone)]
pub struct CreditNetwork {
    pub ledger: AccountLedger,
    pub rates: RateTable,
}

impl CreditNetwork {
    pub fn node(&self, index: usize) -> NodeId {
        node_name(index)
    }
}

fn node_name(index: usize) -> NodeId {
    NodeId::new(format!("NODE-{:03}", index))
}

fn rate_name(from: &CurrencyCode, to: &CurrencyCode) -> RateName {
    RateName::new(format!("{}{}", from, to))
}

/// Generate a random credit network.
pub fn generate_random_network(config: &NetworkConfig) -> Result<CreditNetwork, LedgerError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let currencies = if config.currencies.is_empty() {
        vec![CurrencyCode::new("USD")]
    } else {
        config.currencies.clone()
    };

    let mut rates = RateTable::new();
    for from in &currencies {
        for to in &currencies {
            if from != to {
                let rate = Decimal::from(rng.gen_range(50..200u32)) / Decimal::from(100);
                if rates.set_rate(rate_name(from, to), rate).is_err() {
                    log::warn!("skipping rate {}{}", from, to);
                }
            }
        }
    }

    let mut ledger = AccountLedger::new();
    for i in 0..config.node_count {
        ledger.add_node(node_name(i))?;
    }
    if config.node_count < 2 {
        return Ok(CreditNetwork { ledger, rates });
    }

    // Currency of the links already paying into each node, in open order.
    let mut incoming: Vec<Vec<CurrencyCode>> = vec![Vec::new(); config.node_count];
    let min = config.min_credit.round_dp(2);
    let span = (config.max_credit.round_dp(2) - min).max(Decimal::ZERO);
    // Spans beyond what an i64 of cents holds are capped.
    let cents = (span * Decimal::from(100)).to_i64().unwrap_or(i64::MAX);

    for from in 0..config.node_count {
        for _ in 0..config.links_per_node {
            let mut to = rng.gen_range(0..config.node_count);
            while to == from {
                to = rng.gen_range(0..config.node_count);
            }
            let currency = currencies[rng.gen_range(0..currencies.len())].clone();
            let credit = min + Decimal::new(rng.gen_range(0..=cents), 2);

            // Ids come from the same rng so a seed fixes the tie-break order.
            let id = LinkId::from_u128(rng.gen());
            let mut link =
                Link::with_id(id, node_name(from), node_name(to), credit, currency.clone());
            if let Some(upstream) = incoming[from].iter().find(|c| **c != currency) {
                link = link.with_exchange_rate(rate_name(upstream, &currency));
            }
            ledger.open_link(link)?;
            incoming[to].push(currency);
        }
    }

    Ok(CreditNetwork { ledger, rates })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::engine::PathSearchEngine;
    use rust_decimal_macros::dec;

    #[test]
    fn test_random_network_generation() {
        let config = NetworkConfig {
            node_count: 5,
            links_per_node: 2,
            currencies: vec![CurrencyCode::new("USD"), CurrencyCode::new("CAD")],
            seed: Some(7),
            ..Default::default()
        };

        let network = generate_random_network(&config).unwrap();
        assert_eq!(network.ledger.node_count(), 5);
        assert_eq!(network.ledger.link_count(), 10);
        assert_eq!(network.rates.names().count(), 2);
        for link in network.ledger.links() {
            assert_ne!(link.from(), link.to());
            assert!(link.available_credit() >= dec!(10));
            assert!(link.available_credit() <= dec!(10000));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let config = NetworkConfig {
            seed: Some(42),
            ..Default::default()
        };
        let a = generate_random_network(&config).unwrap();
        let b = generate_random_network(&config).unwrap();
        let credits = |n: &CreditNetwork| {
            let mut v: Vec<_> = n
                .ledger
                .links()
                .map(|l| (l.from().clone(), l.to().clone(), l.available_credit()))
                .collect();
            v.sort();
            v
        };
        assert_eq!(credits(&a), credits(&b));

        let ids = |n: &CreditNetwork| n.ledger.links().map(|l| l.id()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_huge_credit_span_stays_non_negative() {
        let config = NetworkConfig {
            node_count: 4,
            links_per_node: 3,
            max_credit: dec!(100_000_000_000_000_000_000),
            seed: Some(11),
            ..Default::default()
        };
        let network = generate_random_network(&config).unwrap();
        assert_eq!(network.ledger.link_count(), 12);
        assert!(network
            .ledger
            .links()
            .all(|l| l.available_credit() >= dec!(10)));
    }

    #[test]
    fn test_random_network_search() {
        let config = NetworkConfig {
            node_count: 20,
            links_per_node: 4,
            seed: Some(3),
            ..Default::default()
        };
        let network = generate_random_network(&config).unwrap();
        let engine = PathSearchEngine::new(&network.ledger, &network.rates);

        let outcome = engine.find_payment_paths(
            &network.node(0),
            &network.node(19),
            dec!(5000),
            &CurrencyCode::new("USD"),
            1000,
        );
        let paths = match outcome {
            Ok(paths) => paths,
            Err(err) => err.partial().cloned().unwrap(),
        };
        assert!(paths.total() <= dec!(5000));
        assert!(paths.iter().all(|p| p.is_cycle_free()));
    }
}
