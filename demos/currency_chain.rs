//! Routing a payment across a chain of currencies.
//!
//! Alice pays in USD, Dave receives CAD. The search finds the routes,
//! converts along each one, and reports what every link would carry.

use credit_path_engine::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════════════╗");
    println!("║  credit-path-engine: Currency Chain Example    ║");
    println!("╚════════════════════════════════════════════════╝\n");

    let alice = NodeId::new("alice");
    let bob = NodeId::new("bob");
    let carol = NodeId::new("carol");
    let erin = NodeId::new("erin");
    let dave = NodeId::new("dave");
    let usd = CurrencyCode::new("USD");
    let cad = CurrencyCode::new("CAD");

    let mut ledger = AccountLedger::new();
    for n in [&alice, &bob, &carol, &erin, &dave] {
        ledger.add_node(n.clone()).expect("fresh node");
    }

    // Route 1: alice → bob (USD) → carol (CAD) → dave (CAD)
    ledger
        .open_link(Link::new(alice.clone(), bob.clone(), dec!(100), usd.clone()))
        .expect("open link");
    ledger
        .open_link(
            Link::new(bob.clone(), carol.clone(), dec!(50), cad.clone())
                .with_exchange_rate(RateName::new("USDCAD")),
        )
        .expect("open link");
    ledger
        .open_link(Link::new(carol.clone(), dave.clone(), dec!(50), cad.clone()))
        .expect("open link");

    // Route 2: alice → erin (USD) → dave (CAD)
    ledger
        .open_link(Link::new(alice.clone(), erin.clone(), dec!(20), usd.clone()))
        .expect("open link");
    ledger
        .open_link(
            Link::new(erin.clone(), dave.clone(), dec!(60), cad.clone())
                .with_exchange_rate(RateName::new("USDCAD")),
        )
        .expect("open link");

    let mut rates = RateTable::new();
    rates
        .set_rate(RateName::new("USDCAD"), dec!(1.25))
        .expect("positive rate");

    // --- Scenario 1: fully routed ---
    println!("━━━ Scenario 1: 40 CAD from alice to dave ━━━\n");
    let engine = PathSearchEngine::new(&ledger, &rates);
    let paths = engine
        .find_payment_paths(&alice, &dave, dec!(40), &cad, 20)
        .expect("search");
    println!("{}", paths);

    // --- Scenario 2: more than the network carries ---
    println!("━━━ Scenario 2: 100 CAD from alice to dave ━━━\n");
    let paths = engine
        .find_payment_paths(&alice, &dave, dec!(100), &cad, 20)
        .expect("search");
    println!("{}", paths);
    println!(
        "Fulfilled: {:.1}%\n",
        paths.fulfillment_ratio(dec!(100)) * 100.0
    );

    // --- Scenario 3: too small a hop budget ---
    println!("━━━ Scenario 3: hop budget of 2 ━━━\n");
    let request = PaymentRequest::new(alice.clone(), dave.clone(), dec!(70), cad.clone())
        .with_max_hops(2);
    let response = engine.respond(&request).expect("search");
    println!(
        "{:?}: {} of {} {}",
        response.status, response.total, response.requested, response.currency
    );
}
