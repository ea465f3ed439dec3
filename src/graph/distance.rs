use crate::core::link::SearchDirection;
use crate::core::node::NodeId;
use crate::graph::credit_graph::CreditGraph;
use crate::search::error::SearchError;
use std::collections::{HashMap, VecDeque};

/// Hop-count estimates from nodes to the search target.
///
/// Built lazily by a breadth-first expansion that starts at the target and
/// walks against the search direction, following only links that still
/// have credit in the session. The expansion only runs as far as needed
/// to answer the node being asked about, and resumes from where it
/// stopped on the next question.
///
/// The numbers order candidates; they are not a routing guarantee.
/// Capacity and currency constraints can force the actual path to be
/// longer, and the search records that through [`DistanceIndex::worsen`].
#[derive(Debug, Clone)]
pub struct DistanceIndex {
    target: NodeId,
    /// Direction the search walks in; expansion goes the other way.
    direction: SearchDirection,
    /// Breadth-first distances, final once assigned.
    settled: HashMap<NodeId, u32>,
    /// Settled nodes whose neighbours have not been expanded yet.
    frontier: VecDeque<NodeId>,
    /// Lower bounds learned from failed descents.
    worsened: HashMap<NodeId, u32>,
}

impl DistanceIndex {
    pub fn new(target: NodeId, direction: SearchDirection) -> Self {
        let mut settled = HashMap::new();
        settled.insert(target.clone(), 0);
        let mut frontier = VecDeque::new();
        frontier.push_back(target.clone());
        Self {
            target,
            direction,
            settled,
            frontier,
            worsened: HashMap::new(),
        }
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    /// Estimated hops from `node` to the target, `None` when the target
    /// cannot be reached from `node` at all.
    pub fn distance_to_dest(
        &mut self,
        graph: &mut CreditGraph<'_>,
        node: &NodeId,
    ) -> Result<Option<u32>, SearchError> {
        loop {
            if let Some(&distance) = self.settled.get(node) {
                let worse = self.worsened.get(node).copied().unwrap_or(0);
                return Ok(Some(distance.max(worse)));
            }
            let Some(next) = self.frontier.pop_front() else {
                return Ok(None);
            };
            self.expand(graph, &next)?;
        }
    }

    /// Record that `node` needs at least `new_minimum` hops.
    ///
    /// Estimates only ever grow.
    pub fn worsen(&mut self, node: &NodeId, new_minimum: u32) {
        let entry = self.worsened.entry(node.clone()).or_insert(new_minimum);
        *entry = (*entry).max(new_minimum);
    }

    /// Nodes with a known distance so far.
    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    fn expand(&mut self, graph: &mut CreditGraph<'_>, node: &NodeId) -> Result<(), SearchError> {
        let distance = self.settled.get(node).copied().unwrap_or(0);
        let expansion = self.direction.reverse();
        for link in graph.neighbors(node, expansion)? {
            let (_, far) = link.endpoints(expansion);
            if !self.settled.contains_key(far) {
                self.settled.insert(far.clone(), distance + 1);
                self.frontier.push_back(far.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{CurrencyCode, RateTable};
    use crate::core::ledger::AccountLedger;
    use crate::core::link::Link;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// A → B → C → D, plus a shortcut A → D and an isolated node E.
    fn network() -> AccountLedger {
        let mut ledger = AccountLedger::new();
        for n in ["A", "B", "C", "D", "E"] {
            ledger.add_node(NodeId::new(n)).unwrap();
        }
        for (from, to) in [("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")] {
            ledger
                .open_link(Link::new(
                    NodeId::new(from),
                    NodeId::new(to),
                    dec!(10),
                    CurrencyCode::new("USD"),
                ))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_forward_distances() {
        let ledger = network();
        let rates = RateTable::new();
        let mut graph = CreditGraph::new(&ledger, &rates, dec!(0.000001));
        let mut index = DistanceIndex::new(NodeId::new("D"), SearchDirection::Forward);

        let mut d = |n: &str| index.distance_to_dest(&mut graph, &NodeId::new(n)).unwrap();
        assert_eq!(d("D"), Some(0));
        assert_eq!(d("C"), Some(1));
        assert_eq!(d("A"), Some(1));
        assert_eq!(d("B"), Some(2));
        assert_eq!(d("E"), None);
    }

    #[test]
    fn test_backward_distances_measure_from_payer() {
        let ledger = network();
        let rates = RateTable::new();
        let mut graph = CreditGraph::new(&ledger, &rates, dec!(0.000001));
        let mut index = DistanceIndex::new(NodeId::new("A"), SearchDirection::Backward);

        assert_eq!(
            index.distance_to_dest(&mut graph, &NodeId::new("C")).unwrap(),
            Some(2)
        );
        assert_eq!(
            index.distance_to_dest(&mut graph, &NodeId::new("D")).unwrap(),
            Some(1)
        );
    }

    #[test]
    fn test_expansion_is_lazy() {
        let ledger = network();
        let rates = RateTable::new();
        let mut graph = CreditGraph::new(&ledger, &rates, dec!(0.000001));
        let mut index = DistanceIndex::new(NodeId::new("D"), SearchDirection::Forward);

        index.distance_to_dest(&mut graph, &NodeId::new("C")).unwrap();
        // Only D's predecessors are known after one expansion.
        assert_eq!(index.settled_count(), 3);
    }

    #[test]
    fn test_spent_links_not_expanded() {
        let mut ledger = network();
        let cd = ledger
            .links()
            .find(|l| l.from().as_str() == "C")
            .map(|l| l.id())
            .unwrap();
        ledger.set_credit(&cd, Decimal::ZERO).unwrap();
        let rates = RateTable::new();
        let mut graph = CreditGraph::new(&ledger, &rates, dec!(0.000001));
        let mut index = DistanceIndex::new(NodeId::new("D"), SearchDirection::Forward);

        assert_eq!(
            index.distance_to_dest(&mut graph, &NodeId::new("C")).unwrap(),
            None
        );
    }

    #[test]
    fn test_worsen_only_grows() {
        let ledger = network();
        let rates = RateTable::new();
        let mut graph = CreditGraph::new(&ledger, &rates, dec!(0.000001));
        let mut index = DistanceIndex::new(NodeId::new("D"), SearchDirection::Forward);
        let a = NodeId::new("A");

        index.worsen(&a, 4);
        index.worsen(&a, 3);
        assert_eq!(index.distance_to_dest(&mut graph, &a).unwrap(), Some(4));
    }
}
