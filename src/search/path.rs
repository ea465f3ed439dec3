use crate::core::currency::CurrencyCode;
use crate::core::link::{Link, LinkId};
use crate::core::node::NodeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One traversed link of a path and the amount it carries, in the link's
/// own currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathHop {
    link: Link,
    amount: Decimal,
}

impl PathHop {
    pub fn new(link: Link, amount: Decimal) -> Self {
        Self { link, amount }
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn link_id(&self) -> LinkId {
        self.link.id()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn from(&self) -> &NodeId {
        self.link.from()
    }

    pub fn to(&self) -> &NodeId {
        self.link.to()
    }

    pub fn currency(&self) -> &CurrencyCode {
        self.link.currency()
    }
}

/// A route from payer to recipient, hops in payment order.
///
/// `capacity` is what the path delivers, in the currency of its last hop;
/// `source_amount` is what it debits from the payer, in the currency of
/// its first hop. Paths are immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    hops: Vec<PathHop>,
    capacity: Decimal,
    source_amount: Decimal,
}

impl Path {
    /// Build a path from hops in payment order.
    ///
    /// # Panics
    ///
    /// Panics if `hops` is empty.
    pub fn new(hops: Vec<PathHop>) -> Self {
        assert!(!hops.is_empty(), "Path must have at least one hop");
        let source_amount = hops[0].amount();
        let capacity = hops[hops.len() - 1].amount();
        Self {
            hops,
            capacity,
            source_amount,
        }
    }

    pub fn hops(&self) -> &[PathHop] {
        &self.hops
    }

    /// Amount delivered to the recipient.
    pub fn capacity(&self) -> Decimal {
        self.capacity
    }

    /// Amount taken from the payer.
    pub fn source_amount(&self) -> Decimal {
        self.source_amount
    }

    /// Currency the recipient is paid in.
    pub fn currency(&self) -> &CurrencyCode {
        self.hops[self.hops.len() - 1].currency()
    }

    pub fn source_currency(&self) -> &CurrencyCode {
        self.hops[0].currency()
    }

    pub fn source(&self) -> &NodeId {
        self.hops[0].from()
    }

    pub fn destination(&self) -> &NodeId {
        self.hops[self.hops.len() - 1].to()
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Always false: a path has at least one hop.
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Every node on the path, payer first.
    pub fn nodes(&self) -> Vec<&NodeId> {
        std::iter::once(self.source())
            .chain(self.hops.iter().map(PathHop::to))
            .collect()
    }

    /// True when no node appears twice.
    pub fn is_cycle_free(&self) -> bool {
        let nodes = self.nodes();
        let distinct: HashSet<&NodeId> = nodes.iter().copied().collect();
        distinct.len() == nodes.len()
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes: Vec<&str> = self.nodes().iter().map(|n| n.as_str()).collect();
        write!(
            f,
            "{}  [{} {} → {} {}]",
            nodes.join(" → "),
            self.source_amount,
            self.source_currency(),
            self.capacity,
            self.currency()
        )
    }
}

/// The paths found for one payment request and their combined amount.
///
/// Consumers only read a path set. The engine appends to it while a search
/// session runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSet {
    paths: Vec<Path>,
    total: Decimal,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Sum of the paths' delivered amounts.
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.paths.iter()
    }

    /// Share of `requested` covered by this set, for display.
    pub fn fulfillment_ratio(&self, requested: Decimal) -> f64 {
        if requested <= Decimal::ZERO {
            return 0.0;
        }
        let ratio = self.total / requested;
        ratio.to_string().parse::<f64>().unwrap_or(0.0)
    }

    pub(crate) fn push(&mut self, path: Path) {
        self.total += path.capacity();
        self.paths.push(path);
    }

    /// Append the paths of `other`, keeping their order.
    pub(crate) fn merge(&mut self, other: PathSet) {
        for path in other.paths {
            self.push(path);
        }
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl std::fmt::Display for PathSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Path Set ===")?;
        writeln!(f, "Paths: {}", self.paths.len())?;
        writeln!(f, "Total: {}", self.total)?;
        for (i, path) in self.paths.iter().enumerate() {
            writeln!(f, "  {}: {}", i, path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn link(from: &str, to: &str, currency: &str) -> Link {
        Link::new(
            NodeId::new(from),
            NodeId::new(to),
            dec!(1000),
            CurrencyCode::new(currency),
        )
    }

    fn chain() -> Path {
        Path::new(vec![
            PathHop::new(link("A", "B", "USD"), dec!(32)),
            PathHop::new(link("B", "C", "CAD"), dec!(40)),
            PathHop::new(link("C", "D", "CAD"), dec!(40)),
        ])
    }

    #[test]
    fn test_path_amounts() {
        let path = chain();
        assert_eq!(path.source_amount(), dec!(32));
        assert_eq!(path.capacity(), dec!(40));
        assert_eq!(path.source_currency().as_str(), "USD");
        assert_eq!(path.currency().as_str(), "CAD");
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_path_nodes() {
        let path = chain();
        let nodes: Vec<&str> = path.nodes().iter().map(|n| n.as_str()).collect();
        assert_eq!(nodes, vec!["A", "B", "C", "D"]);
        assert!(path.is_cycle_free());
        assert_eq!(path.source().as_str(), "A");
        assert_eq!(path.destination().as_str(), "D");
    }

    #[test]
    fn test_cycle_detected() {
        let path = Path::new(vec![
            PathHop::new(link("A", "B", "USD"), dec!(1)),
            PathHop::new(link("B", "A", "USD"), dec!(1)),
            PathHop::new(link("A", "C", "USD"), dec!(1)),
        ]);
        assert!(!path.is_cycle_free());
    }

    #[test]
    #[should_panic(expected = "at least one hop")]
    fn test_empty_path() {
        Path::new(Vec::new());
    }

    #[test]
    fn test_path_set_totals() {
        let mut set = PathSet::new();
        set.push(chain());
        let mut other = PathSet::new();
        other.push(Path::new(vec![PathHop::new(link("A", "D", "CAD"), dec!(5))]));
        set.merge(other);

        assert_eq!(set.len(), 2);
        assert_eq!(set.total(), dec!(45));
        assert!((set.fulfillment_ratio(dec!(90)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_path_set() {
        let set = PathSet::new();
        assert!(set.is_empty());
        assert_eq!(set.total(), Decimal::ZERO);
        assert_eq!(set.fulfillment_ratio(dec!(10)), 0.0);
    }
}
