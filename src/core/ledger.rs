use crate::core::link::{Link, LinkId};
use crate::core::node::NodeId;
use crate::core::traits::LinkSource;
use crate::search::path::Path;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by the account ledger.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("unknown node {node}")]
    UnknownNode { node: NodeId },
    #[error("node {node} already exists")]
    DuplicateNode { node: NodeId },
    #[error("unknown link {link}")]
    UnknownLink { link: LinkId },
    #[error("link {link} has {available} available, {requested} requested")]
    InsufficientCredit {
        link: LinkId,
        available: Decimal,
        requested: Decimal,
    },
    #[error("credit must be non-negative, got {credit} for link {link}")]
    NegativeCredit { link: LinkId, credit: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeStatus {
    Active,
    Deleted,
}

/// In-memory store of nodes and the credit links between them.
///
/// This is the authoritative owner of available credit. The search engine
/// only reads it through [`LinkSource`]; once a caller accepts a found
/// path, [`AccountLedger::commit_path`] debits it here.
///
/// Deleting a node keeps its links in place, so a search crossing one of
/// them sees a link to a node that no longer exists.
#[derive(Debug, Clone, Default)]
pub struct AccountLedger {
    nodes: BTreeMap<NodeId, NodeStatus>,
    links: BTreeMap<LinkId, Link>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: NodeId) -> Result<(), LedgerError> {
        match self.nodes.get(&node) {
            Some(NodeStatus::Active) => Err(LedgerError::DuplicateNode { node }),
            _ => {
                self.nodes.insert(node, NodeStatus::Active);
                Ok(())
            }
        }
    }

    /// Mark a node as deleted.
    pub fn remove_node(&mut self, node: &NodeId) -> Result<(), LedgerError> {
        match self.nodes.get_mut(node) {
            Some(status) if *status == NodeStatus::Active => {
                *status = NodeStatus::Deleted;
                Ok(())
            }
            _ => Err(LedgerError::UnknownNode { node: node.clone() }),
        }
    }

    /// Register a link. Both ends must be active nodes.
    pub fn open_link(&mut self, link: Link) -> Result<LinkId, LedgerError> {
        for node in [link.from(), link.to()] {
            if !self.contains_node(node) {
                return Err(LedgerError::UnknownNode { node: node.clone() });
            }
        }
        let id = link.id();
        self.links.insert(id, link);
        Ok(id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    /// Replace the available credit of a link.
    pub fn set_credit(&mut self, id: &LinkId, credit: Decimal) -> Result<(), LedgerError> {
        if credit < Decimal::ZERO {
            return Err(LedgerError::NegativeCredit { link: *id, credit });
        }
        let link = self
            .links
            .get_mut(id)
            .ok_or(LedgerError::UnknownLink { link: *id })?;
        link.set_available_credit(credit);
        Ok(())
    }

    /// Debit every hop of an accepted path.
    ///
    /// All hops are checked before any is applied, so a failing commit
    /// leaves the ledger untouched.
    pub fn commit_path(&mut self, path: &Path) -> Result<(), LedgerError> {
        for hop in path.hops() {
            let link = self
                .links
                .get(&hop.link_id())
                .ok_or(LedgerError::UnknownLink { link: hop.link_id() })?;
            if link.available_credit() < hop.amount() {
                return Err(LedgerError::InsufficientCredit {
                    link: hop.link_id(),
                    available: link.available_credit(),
                    requested: hop.amount(),
                });
            }
        }
        for hop in path.hops() {
            if let Some(link) = self.links.get_mut(&hop.link_id()) {
                let remaining = link.available_credit() - hop.amount();
                link.set_available_credit(remaining);
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|s| **s == NodeStatus::Active)
            .count()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Active nodes, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes
            .iter()
            .filter(|(_, s)| **s == NodeStatus::Active)
            .map(|(n, _)| n)
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }
}

impl LinkSource for AccountLedger {
    fn links_from(&self, node: &NodeId) -> Result<Vec<Link>, LedgerError> {
        Ok(self
            .links
            .values()
            .filter(|l| l.from() == node)
            .cloned()
            .collect())
    }

    fn links_to(&self, node: &NodeId) -> Result<Vec<Link>, LedgerError> {
        Ok(self
            .links
            .values()
            .filter(|l| l.to() == node)
            .cloned()
            .collect())
    }

    fn contains_node(&self, node: &NodeId) -> bool {
        matches!(self.nodes.get(node), Some(NodeStatus::Active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use crate::search::path::{Path, PathHop};
    use rust_decimal_macros::dec;

    fn ledger_with(nodes: &[&str]) -> AccountLedger {
        let mut ledger = AccountLedger::new();
        for n in nodes {
            ledger.add_node(NodeId::new(*n)).unwrap();
        }
        ledger
    }

    fn usd_link(from: &str, to: &str, credit: Decimal) -> Link {
        Link::new(NodeId::new(from), NodeId::new(to), credit, CurrencyCode::new("USD"))
    }

    #[test]
    fn test_open_link_requires_nodes() {
        let mut ledger = ledger_with(&["A"]);
        let result = ledger.open_link(usd_link("A", "B", dec!(10)));
        assert_eq!(
            result,
            Err(LedgerError::UnknownNode {
                node: NodeId::new("B")
            })
        );
    }

    #[test]
    fn test_duplicate_node() {
        let mut ledger = ledger_with(&["A"]);
        assert!(ledger.add_node(NodeId::new("A")).is_err());
    }

    #[test]
    fn test_links_from_and_to() {
        let mut ledger = ledger_with(&["A", "B", "C"]);
        ledger.open_link(usd_link("A", "B", dec!(10))).unwrap();
        ledger.open_link(usd_link("A", "C", dec!(20))).unwrap();
        ledger.open_link(usd_link("B", "C", dec!(30))).unwrap();

        assert_eq!(ledger.links_from(&NodeId::new("A")).unwrap().len(), 2);
        assert_eq!(ledger.links_to(&NodeId::new("C")).unwrap().len(), 2);
        assert!(ledger.links_from(&NodeId::new("C")).unwrap().is_empty());
    }

    #[test]
    fn test_removed_node_keeps_links() {
        let mut ledger = ledger_with(&["A", "B"]);
        ledger.open_link(usd_link("A", "B", dec!(10))).unwrap();
        ledger.remove_node(&NodeId::new("B")).unwrap();

        assert!(!ledger.contains_node(&NodeId::new("B")));
        assert_eq!(ledger.links_from(&NodeId::new("A")).unwrap().len(), 1);
        assert_eq!(ledger.node_count(), 1);
    }

    #[test]
    fn test_commit_path_debits_hops() {
        let mut ledger = ledger_with(&["A", "B", "C"]);
        let ab = usd_link("A", "B", dec!(100));
        let bc = usd_link("B", "C", dec!(50));
        ledger.open_link(ab.clone()).unwrap();
        ledger.open_link(bc.clone()).unwrap();

        let path = Path::new(vec![
            PathHop::new(ab.clone(), dec!(40)),
            PathHop::new(bc.clone(), dec!(40)),
        ]);
        ledger.commit_path(&path).unwrap();

        assert_eq!(ledger.link(&ab.id()).unwrap().available_credit(), dec!(60));
        assert_eq!(ledger.link(&bc.id()).unwrap().available_credit(), dec!(10));
    }

    #[test]
    fn test_commit_path_is_atomic() {
        let mut ledger = ledger_with(&["A", "B", "C"]);
        let ab = usd_link("A", "B", dec!(100));
        let bc = usd_link("B", "C", dec!(5));
        ledger.open_link(ab.clone()).unwrap();
        ledger.open_link(bc.clone()).unwrap();

        let path = Path::new(vec![
            PathHop::new(ab.clone(), dec!(40)),
            PathHop::new(bc.clone(), dec!(40)),
        ]);
        let result = ledger.commit_path(&path);

        assert!(matches!(result, Err(LedgerError::InsufficientCredit { .. })));
        assert_eq!(ledger.link(&ab.id()).unwrap().available_credit(), dec!(100));
    }

    #[test]
    fn test_set_credit_rejects_negative() {
        let mut ledger = ledger_with(&["A", "B"]);
        let id = ledger.open_link(usd_link("A", "B", dec!(10))).unwrap();
        assert!(ledger.set_credit(&id, dec!(-1)).is_err());
        ledger.set_credit(&id, dec!(25)).unwrap();
        assert_eq!(ledger.link(&id).unwrap().available_credit(), dec!(25));
    }
}
