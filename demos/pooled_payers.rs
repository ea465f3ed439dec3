//! Several payers funding one payment.
//!
//! Two branches of the same company pay a supplier through a shared
//! correspondent. The first branch is drained before the second is asked.

use credit_path_engine::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════════════╗");
    println!("║  credit-path-engine: Pooled Payers Example     ║");
    println!("╚════════════════════════════════════════════════╝\n");

    let north = NodeId::new("branch-north");
    let south = NodeId::new("branch-south");
    let bank = NodeId::new("correspondent");
    let supplier = NodeId::new("supplier");
    let eur = CurrencyCode::new("EUR");

    let mut ledger = AccountLedger::new();
    for n in [&north, &south, &bank, &supplier] {
        ledger.add_node(n.clone()).expect("fresh node");
    }
    ledger
        .open_link(Link::new(north.clone(), bank.clone(), dec!(12_000), eur.clone()))
        .expect("open link");
    ledger
        .open_link(Link::new(south.clone(), bank.clone(), dec!(30_000), eur.clone()))
        .expect("open link");
    ledger
        .open_link(Link::new(bank.clone(), supplier.clone(), dec!(25_000), eur.clone()))
        .expect("open link");
    let rates = RateTable::new();

    for direction in [SearchDirection::Forward, SearchDirection::Backward] {
        println!("━━━ 20,000 EUR to supplier, searching {} ━━━\n", direction);
        let config = SearchConfig {
            direction,
            ..Default::default()
        };
        let engine = PathSearchEngine::with_config(&ledger, &rates, config);
        let paths = engine
            .find_pooled_payment_paths(
                &[north.clone(), south.clone()],
                &supplier,
                dec!(20_000),
                &eur,
                100,
            )
            .expect("search");

        for path in paths.iter() {
            println!("  {} pays {}", path.source(), path.source_amount());
        }
        println!("  Total: {}\n", paths.total());
    }

    // Committing the result spends the credit for good.
    let engine = PathSearchEngine::new(&ledger, &rates);
    let paths = engine
        .find_pooled_payment_paths(&[north.clone(), south.clone()], &supplier, dec!(20_000), &eur, 100)
        .expect("search");
    let mut ledger = ledger.clone();
    for path in paths.iter() {
        ledger.commit_path(path).expect("credit still available");
    }
    let remaining: Vec<String> = ledger
        .links()
        .map(|l| format!("{} → {}: {}", l.from(), l.to(), l.available_credit()))
        .collect();
    println!("━━━ After commit ━━━\n");
    for line in remaining {
        println!("  {}", line);
    }
}
