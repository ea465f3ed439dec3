//! credit-path-engine CLI
//!
//! Search payment paths over a credit network described in JSON.
//!
//! # Usage
//!
//! ```bash
//! # Run every request in a network file
//! credit-path-engine search --input network.json
//!
//! # Output as JSON, searching from the destination back
//! credit-path-engine search --input network.json --format json --direction backward
//!
//! # Generate a random network for testing
//! credit-path-engine generate --nodes 20 --links-per-node 3 --currencies USD,CAD
//! ```

use credit_path_engine::core::currency::{CurrencyCode, RateName, RateTable};
use credit_path_engine::core::ledger::AccountLedger;
use credit_path_engine::core::link::{Link, SearchDirection};
use credit_path_engine::core::node::NodeId;
use credit_path_engine::core::traits::{LinkSource, RateSource};
use credit_path_engine::search::config::SearchConfig;
use credit_path_engine::search::engine::PathSearchEngine;
use credit_path_engine::search::request::{PathSearchResponse, PaymentRequest};
use credit_path_engine::simulation::network::{generate_random_network, NetworkConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"credit-path-engine — payment path search across credit networks

USAGE:
    credit-path-engine <COMMAND> [OPTIONS]

COMMANDS:
    search      Find payment paths for every request in a network file
    generate    Generate a random credit network (for testing)
    help        Show this message

OPTIONS (search):
    --input <FILE>        Path to JSON network file
    --format <FORMAT>     Output format: text (default) or json
    --max-hops <N>        Hop budget for requests that set none
    --direction <DIR>     forward (default) or backward

OPTIONS (generate):
    --nodes <N>           Number of nodes (default: 10)
    --links-per-node <N>  Outgoing links per node (default: 3)
    --currencies <LIST>   Comma-separated currency codes (default: USD)
    --seed <N>            Seed for a reproducible network
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    credit-path-engine search --input network.json
    credit-path-engine search --input network.json --format json --max-hops 50
    credit-path-engine generate --nodes 20 --links-per-node 4
    credit-path-engine generate --nodes 5 --currencies USD,CAD,EUR --output test.json"#
    );
}

/// JSON schema for a network file.
#[derive(Serialize, Deserialize)]
struct NetworkFile {
    #[serde(default)]
    config: SearchConfig,
    /// Nodes without links; link endpoints are added automatically.
    #[serde(default)]
    nodes: Vec<NodeId>,
    #[serde(default)]
    rates: Vec<RateEntry>,
    links: Vec<LinkEntry>,
    #[serde(default)]
    requests: Vec<PaymentRequest>,
}

#[derive(Serialize, Deserialize)]
struct RateEntry {
    name: RateName,
    rate: Decimal,
}

#[derive(Serialize, Deserialize)]
struct LinkEntry {
    from: NodeId,
    to: NodeId,
    credit: Decimal,
    #[serde(default = "default_currency")]
    currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exchange_rate: Option<RateName>,
}

fn default_currency() -> CurrencyCode {
    CurrencyCode::new("USD")
}

fn load_network(path: &str) -> (NetworkFile, AccountLedger, RateTable) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: NetworkFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "rates": [ {{ "name": "USDCAD", "rate": "1.25" }} ],
  "links": [
    {{ "from": "alice", "to": "bob", "credit": "100", "currency": "USD" }},
    {{ "from": "bob", "to": "carol", "credit": "50", "currency": "CAD", "exchange_rate": "USDCAD" }}
  ],
  "requests": [
    {{ "source": "alice", "destination": "carol", "amount": "40", "currency": "CAD" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut rates = RateTable::new();
    for entry in &file.rates {
        if let Err(e) = rates.set_rate(entry.name.clone(), entry.rate) {
            eprintln!("Invalid rate: {}", e);
            process::exit(1);
        }
    }

    let mut ledger = AccountLedger::new();
    let endpoints = file.links.iter().flat_map(|l| [&l.from, &l.to]);
    for node in file.nodes.iter().chain(endpoints) {
        if ledger.contains_node(node) {
            continue;
        }
        if let Err(e) = ledger.add_node(node.clone()) {
            eprintln!("Invalid node: {}", e);
            process::exit(1);
        }
    }
    for entry in &file.links {
        if entry.credit < Decimal::ZERO {
            eprintln!(
                "Invalid credit {} on link {} → {}",
                entry.credit, entry.from, entry.to
            );
            process::exit(1);
        }
        let mut link = Link::new(
            entry.from.clone(),
            entry.to.clone(),
            entry.credit,
            entry.currency.clone(),
        );
        if let Some(rate) = &entry.exchange_rate {
            link = link.with_exchange_rate(rate.clone());
        }
        if let Err(e) = ledger.open_link(link) {
            eprintln!("Invalid link: {}", e);
            process::exit(1);
        }
    }

    (file, ledger, rates)
}

fn cmd_search(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut max_hops: Option<usize> = None;
    let mut direction: Option<SearchDirection> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            "--max-hops" => {
                i += 1;
                max_hops = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--max-hops requires a number");
                    process::exit(1);
                }));
            }
            "--direction" => {
                i += 1;
                direction = Some(match args.get(i).map(String::as_str) {
                    Some("forward") => SearchDirection::Forward,
                    Some("backward") => SearchDirection::Backward,
                    _ => {
                        eprintln!("--direction requires 'forward' or 'backward'");
                        process::exit(1);
                    }
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let (file, ledger, rates) = load_network(&path);
    let mut config = file.config.clone();
    if let Some(n) = max_hops {
        config.max_hops = n;
    }
    if let Some(d) = direction {
        config.direction = d;
    }
    log::info!(
        "{} node(s), {} link(s), {} request(s), searching {}",
        ledger.node_count(),
        ledger.link_count(),
        file.requests.len(),
        config.direction
    );

    let engine = PathSearchEngine::with_config(&ledger, &rates, config);
    let mut responses: Vec<PathSearchResponse> = Vec::new();
    let mut failed = false;

    for request in &file.requests {
        let outcome = engine.search(request);
        let shown = match &outcome {
            Ok(paths) => Some(paths.to_string()),
            Err(e) => e.partial().map(|paths| paths.to_string()),
        };
        match PathSearchResponse::from_outcome(request, outcome, engine.config().epsilon()) {
            Ok(response) => {
                if format != "json" {
                    println!(
                        "{} → {}: {} of {} {} ({:?})",
                        request.source,
                        request.destination,
                        response.total,
                        response.requested,
                        response.currency,
                        response.status
                    );
                    if let Some(text) = shown {
                        println!("{}", text);
                    }
                }
                responses.push(response);
            }
            Err(e) => {
                eprintln!(
                    "Error routing {} → {}: {}",
                    request.source, request.destination, e
                );
                failed = true;
            }
        }
    }

    if format == "json" {
        let json = serde_json::to_string_pretty(&responses).unwrap_or_else(|e| {
            eprintln!("Error encoding JSON: {}", e);
            process::exit(1);
        });
        println!("{}", json);
    }
    if failed {
        process::exit(1);
    }
}

fn cmd_generate(args: &[String]) {
    let mut nodes = 10usize;
    let mut links_per_node = 3usize;
    let mut currencies_str = "USD".to_string();
    let mut seed: Option<u64> = None;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--nodes" => {
                i += 1;
                nodes = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--nodes requires a number");
                        process::exit(1);
                    });
            }
            "--links-per-node" => {
                i += 1;
                links_per_node = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--links-per-node requires a number");
                        process::exit(1);
                    });
            }
            "--currencies" => {
                i += 1;
                currencies_str = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--currencies requires a comma-separated list");
                    process::exit(1);
                });
            }
            "--seed" => {
                i += 1;
                seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    process::exit(1);
                }));
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let currencies: Vec<CurrencyCode> = currencies_str
        .split(',')
        .map(|s| CurrencyCode::new(s.trim()))
        .collect();

    let config = NetworkConfig {
        node_count: nodes,
        links_per_node,
        currencies: currencies.clone(),
        seed,
        ..Default::default()
    };

    let network = generate_random_network(&config).unwrap_or_else(|e| {
        eprintln!("Error generating network: {}", e);
        process::exit(1);
    });

    let mut rates = Vec::new();
    for name in network.rates.names() {
        if let Ok(rate) = network.rates.rate(name) {
            rates.push(RateEntry {
                name: name.clone(),
                rate,
            });
        }
    }
    rates.sort_by(|a, b| a.name.cmp(&b.name));

    let mut requests = Vec::new();
    if nodes >= 2 {
        requests.push(PaymentRequest::new(
            network.node(0),
            network.node(nodes - 1),
            Decimal::from(100),
            currencies[0].clone(),
        ));
    }

    let output = NetworkFile {
        config: SearchConfig::default(),
        nodes: network.ledger.nodes().cloned().collect(),
        rates,
        links: network
            .ledger
            .links()
            .map(|link| LinkEntry {
                from: link.from().clone(),
                to: link.to().clone(),
                credit: link.available_credit(),
                currency: link.currency().clone(),
                exchange_rate: link.exchange_rate().cloned(),
            })
            .collect(),
        requests,
    };

    let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
        eprintln!("Error encoding JSON: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} links across {} nodes → {}",
            network.ledger.link_count(),
            nodes,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "search" => cmd_search(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
