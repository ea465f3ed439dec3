use credit_path_engine::core::currency::{CurrencyCode, RateName, RateTable};
use credit_path_engine::core::ledger::AccountLedger;
use credit_path_engine::core::link::{Link, LinkId, SearchDirection};
use credit_path_engine::core::node::NodeId;
use credit_path_engine::core::traits::RateSource;
use credit_path_engine::search::config::SearchConfig;
use credit_path_engine::search::engine::PathSearchEngine;
use credit_path_engine::search::error::SearchError;
use credit_path_engine::search::path::PathSet;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

const NODES: usize = 6;
const MAX_HOPS: usize = 1000;

/// A link spec: (from, to, credit, denominated in CAD).
type LinkSpec = (usize, usize, u32, bool);

/// Generate a random link between distinct nodes of a small pool.
fn arb_link() -> impl Strategy<Value = LinkSpec> {
    (0..NODES, 0..NODES, 1u32..1000u32, any::<bool>()).prop_filter(
        "a link needs two distinct ends",
        |(from, to, _, _)| from != to,
    )
}

/// Generate a random network of 1..30 links.
fn arb_network() -> impl Strategy<Value = Vec<LinkSpec>> {
    prop::collection::vec(arb_link(), 1..30)
}

/// Generate a random requested amount (1 to 3,000 USD).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1u32..3000u32).prop_map(Decimal::from)
}

fn node(i: usize) -> NodeId {
    NodeId::new(format!("N{}", i))
}

/// Generate a CAD to USD rate below 1 with six decimal places.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (100_001i64..999_999i64).prop_map(|n| Decimal::new(n, 6))
}

/// Build the ledger and rates. Every link can be entered from the other
/// currency through its named rate.
fn build(specs: &[LinkSpec]) -> (AccountLedger, RateTable) {
    build_with_rate(specs, Decimal::new(8, 1))
}

fn build_with_rate(specs: &[LinkSpec], cad_usd: Decimal) -> (AccountLedger, RateTable) {
    let mut ledger = AccountLedger::new();
    for i in 0..NODES {
        ledger.add_node(node(i)).unwrap();
    }
    for (i, (from, to, credit, cad)) in specs.iter().enumerate() {
        let (currency, rate) = if *cad { ("CAD", "USDCAD") } else { ("USD", "CADUSD") };
        let link = Link::with_id(
            LinkId::from_u128(i as u128 + 1),
            node(*from),
            node(*to),
            Decimal::from(*credit),
            CurrencyCode::new(currency),
        )
        .with_exchange_rate(RateName::new(rate));
        ledger.open_link(link).unwrap();
    }

    let mut rates = RateTable::new();
    rates.set_rate(RateName::new("USDCAD"), Decimal::new(125, 2)).unwrap();
    rates.set_rate(RateName::new("CADUSD"), cad_usd).unwrap();
    (ledger, rates)
}

fn search(
    ledger: &AccountLedger,
    rates: &RateTable,
    amount: Decimal,
    backward: bool,
) -> Result<PathSet, SearchError> {
    let config = SearchConfig {
        direction: if backward {
            SearchDirection::Backward
        } else {
            SearchDirection::Forward
        },
        ..Default::default()
    };
    PathSearchEngine::with_config(ledger, rates, config).find_payment_paths(
        &node(0),
        &node(NODES - 1),
        amount,
        &CurrencyCode::new("USD"),
        MAX_HOPS,
    )
}

/// The paths found, complete or cut short by the hop budget.
fn found(outcome: &Result<PathSet, SearchError>) -> PathSet {
    match outcome {
        Ok(paths) => paths.clone(),
        Err(err) => err
            .partial()
            .cloned()
            .unwrap_or_else(|| panic!("unexpected search error: {}", err)),
    }
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Paths never draw more than a link offers.
    //
    // Summed over every path of one search, the amount carried by any
    // link stays within that link's available credit.
    // ===================================================================
    #[test]
    fn reservations_within_credit(specs in arb_network(), amount in arb_amount(), backward in any::<bool>()) {
        let (ledger, rates) = build(&specs);
        let paths = found(&search(&ledger, &rates, amount, backward));

        let mut used: HashMap<LinkId, Decimal> = HashMap::new();
        for path in paths.iter() {
            for hop in path.hops() {
                *used.entry(hop.link_id()).or_insert(Decimal::ZERO) += hop.amount();
            }
        }
        for (id, total) in used {
            let credit = ledger.link(&id).unwrap().available_credit();
            prop_assert!(total <= credit, "link {} carries {} of {}", id, total, credit);
        }
    }

    // ===================================================================
    // INVARIANT 2: Every path is a simple chain from source to destination.
    //
    // No node repeats, consecutive hops connect, and the final hop is in
    // the requested currency.
    // ===================================================================
    #[test]
    fn paths_are_simple_chains(specs in arb_network(), amount in arb_amount(), backward in any::<bool>()) {
        let (ledger, rates) = build(&specs);
        let paths = found(&search(&ledger, &rates, amount, backward));

        for path in paths.iter() {
            prop_assert!(path.is_cycle_free());
            prop_assert_eq!(path.source(), &node(0));
            prop_assert_eq!(path.destination(), &node(NODES - 1));
            prop_assert_eq!(path.currency().as_str(), "USD");
            for pair in path.hops().windows(2) {
                prop_assert_eq!(pair[0].to(), pair[1].from());
            }
        }
    }

    // ===================================================================
    // INVARIANT 3: Total found ≤ amount requested.
    //
    // The path set total equals the sum of path capacities, and never
    // exceeds the request.
    // ===================================================================
    #[test]
    fn total_never_exceeds_request(specs in arb_network(), amount in arb_amount(), backward in any::<bool>()) {
        let (ledger, rates) = build(&specs);
        let paths = found(&search(&ledger, &rates, amount, backward));

        let sum: Decimal = paths.iter().map(|p| p.capacity()).sum();
        prop_assert_eq!(paths.total(), sum);
        prop_assert!(paths.total() <= amount);
        prop_assert!(paths.iter().all(|p| p.capacity() > Decimal::ZERO));
    }

    // ===================================================================
    // INVARIANT 4: Search is deterministic.
    //
    // The same request against the same network yields the same outcome,
    // path for path. The ledger is not modified by searching.
    // ===================================================================
    #[test]
    fn search_is_deterministic(specs in arb_network(), amount in arb_amount(), backward in any::<bool>()) {
        let (ledger, rates) = build(&specs);
        let first = search(&ledger, &rates, amount, backward);
        let second = search(&ledger, &rates, amount, backward);
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 5: Amounts follow the rates hop by hop.
    //
    // Each hop carries what the next hop needs converted back at the
    // junction rate, rounded up by less than one unit of the last kept
    // decimal place.
    // ===================================================================
    #[test]
    fn amounts_follow_rates(specs in arb_network(), amount in arb_amount(), cad_usd in arb_rate()) {
        let (ledger, rates) = build_with_rate(&specs, cad_usd);
        let paths = found(&search(&ledger, &rates, amount, false));
        let epsilon = SearchConfig::default().epsilon();

        for path in paths.iter() {
            for pair in path.hops().windows(2) {
                let (up, down) = (&pair[0], &pair[1]);
                let rate = if up.currency() == down.currency() {
                    Decimal::ONE
                } else {
                    rates.rate(down.link().exchange_rate().unwrap()).unwrap()
                };
                let needed = down.amount() / rate;
                prop_assert!(up.amount() >= needed);
                prop_assert!(
                    up.amount() - needed < epsilon,
                    "{} needs {} upstream but hop carries {}",
                    down.amount(),
                    needed,
                    up.amount()
                );
            }
        }
    }

    // ===================================================================
    // INVARIANT 6: Hop budget bounds the paths.
    //
    // Every traversal consumes budget, so the hops of all paths together
    // never exceed it.
    // ===================================================================
    #[test]
    fn hop_budget_bounds_paths(specs in arb_network(), amount in arb_amount(), budget in 1usize..8) {
        let (ledger, rates) = build(&specs);
        let engine = PathSearchEngine::new(&ledger, &rates);
        let outcome = engine.find_payment_paths(
            &node(0),
            &node(NODES - 1),
            amount,
            &CurrencyCode::new("USD"),
            budget,
        );
        let paths = found(&outcome);
        let hops: usize = paths.iter().map(|p| p.len()).sum();
        prop_assert!(hops <= budget);
    }

    // ===================================================================
    // INVARIANT 7: Single conversions round-trip.
    //
    // For a path with exactly one currency change at rate r, converting
    // its capacity back through 1/r gives its source amount to within
    // epsilon, measured in the source currency. Rates below 1 with many
    // decimal places are the demanding case.
    // ===================================================================
    #[test]
    fn single_conversion_round_trips(specs in arb_network(), amount in arb_amount(), cad_usd in arb_rate()) {
        let (ledger, rates) = build_with_rate(&specs, cad_usd);
        let paths = found(&search(&ledger, &rates, amount, false));
        let epsilon = SearchConfig::default().epsilon();

        for path in paths.iter() {
            let changes: Vec<_> = path
                .hops()
                .windows(2)
                .filter(|pair| pair[0].currency() != pair[1].currency())
                .collect();
            if changes.len() != 1 {
                continue;
            }
            let r = rates.rate(changes[0][1].link().exchange_rate().unwrap()).unwrap();
            let back = path.capacity() / r;
            prop_assert!(
                (back - path.source_amount()).abs() <= epsilon,
                "{} back through 1/{} is {}, source sent {}",
                path.capacity(),
                r,
                back,
                path.source_amount()
            );
        }
    }

    // ===================================================================
    // INVARIANT 8: A network with room to spare delivers the request.
    //
    // One conversion at an uneven rate below 1, with far more credit than
    // asked for, must still deliver the exact amount.
    // ===================================================================
    #[test]
    fn ample_capacity_delivers_exactly(amount in arb_amount(), cad_usd in arb_rate()) {
        let specs = vec![(0, 1, 100_000, true), (1, NODES - 1, 100_000, false)];
        let (ledger, rates) = build_with_rate(&specs, cad_usd);
        let paths = search(&ledger, &rates, amount, false).unwrap();

        prop_assert_eq!(paths.total(), amount);
        prop_assert_eq!(paths.len(), 1);
        let needed = amount / cad_usd;
        prop_assert!(paths.paths()[0].source_amount() >= needed);
    }
}
