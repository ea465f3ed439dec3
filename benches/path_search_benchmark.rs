use criterion::{black_box, criterion_group, criterion_main, Criterion};
use credit_path_engine::core::currency::CurrencyCode;
use credit_path_engine::core::link::SearchDirection;
use credit_path_engine::search::config::SearchConfig;
use credit_path_engine::search::engine::PathSearchEngine;
use credit_path_engine::simulation::network::{generate_random_network, CreditNetwork, NetworkConfig};
use rust_decimal::Decimal;

fn network(nodes: usize, links_per_node: usize) -> CreditNetwork {
    let config = NetworkConfig {
        node_count: nodes,
        links_per_node,
        currencies: vec![CurrencyCode::new("USD"), CurrencyCode::new("CAD")],
        seed: Some(2024),
        ..Default::default()
    };
    generate_random_network(&config).expect("generated network")
}

fn bench_search(c: &mut Criterion, name: &str, network: &CreditNetwork, config: SearchConfig) {
    let engine = PathSearchEngine::with_config(&network.ledger, &network.rates, config);
    let source = network.node(0);
    let destination = network.node(network.ledger.node_count() - 1);
    let usd = CurrencyCode::new("USD");

    c.bench_function(name, |b| {
        b.iter(|| {
            engine.find_payment_paths(
                black_box(&source),
                black_box(&destination),
                black_box(Decimal::from(5_000)),
                &usd,
                1000,
            )
        })
    });
}

fn bench_search_10_nodes(c: &mut Criterion) {
    let network = network(10, 3);
    bench_search(c, "search_10_nodes", &network, SearchConfig::default());
}

fn bench_search_100_nodes(c: &mut Criterion) {
    let network = network(100, 5);
    bench_search(c, "search_100_nodes", &network, SearchConfig::default());
}

fn bench_search_1000_nodes(c: &mut Criterion) {
    let network = network(1000, 5);
    bench_search(c, "search_1000_nodes", &network, SearchConfig::default());
}

fn bench_search_1000_nodes_backward(c: &mut Criterion) {
    let network = network(1000, 5);
    let config = SearchConfig {
        direction: SearchDirection::Backward,
        ..Default::default()
    };
    bench_search(c, "search_1000_nodes_backward", &network, config);
}

criterion_group!(
    benches,
    bench_search_10_nodes,
    bench_search_100_nodes,
    bench_search_1000_nodes,
    bench_search_1000_nodes_backward
);
criterion_main!(benches);
