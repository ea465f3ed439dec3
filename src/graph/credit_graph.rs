use crate::core::currency::{RateError, RateName};
use crate::core::link::{Link, LinkId, SearchDirection};
use crate::core::node::NodeId;
use crate::core::traits::{LinkSource, RateSource};
use crate::search::error::SearchError;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Credit committed to paths found earlier in the same search session.
///
/// Invariant: for every link, the reserved amount never exceeds the
/// credit the link offered when the session first read it.
#[derive(Debug, Clone, Default)]
pub struct ReservedCredit {
    amounts: HashMap<LinkId, Decimal>,
}

impl ReservedCredit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount reserved on `link` so far.
    pub fn get(&self, link: &LinkId) -> Decimal {
        self.amounts.get(link).copied().unwrap_or(Decimal::ZERO)
    }

    /// Credit still usable on `link` this session. Never negative.
    pub fn remaining(&self, link: &Link) -> Decimal {
        (link.available_credit() - self.get(&link.id())).max(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LinkId, &Decimal)> {
        self.amounts.iter()
    }

    fn add(&mut self, link: LinkId, amount: Decimal) {
        *self.amounts.entry(link).or_insert(Decimal::ZERO) += amount;
    }
}

/// A search session's view of the credit network.
///
/// Links are read from the [`LinkSource`] the first time a node is
/// visited and kept for the rest of the session, as are rate values, so
/// one session works against one consistent picture. Credit reserved by
/// the session is subtracted from what the view reports; the source
/// itself is never written.
pub struct CreditGraph<'a> {
    links: &'a dyn LinkSource,
    rates: &'a dyn RateSource,
    /// Links keyed by their paying node.
    outgoing: HashMap<NodeId, Vec<Link>>,
    /// Links keyed by their receiving node.
    incoming: HashMap<NodeId, Vec<Link>>,
    rate_values: HashMap<RateName, Decimal>,
    reserved: ReservedCredit,
    /// Credit below this is treated as spent.
    epsilon: Decimal,
}

impl<'a> CreditGraph<'a> {
    pub fn new(links: &'a dyn LinkSource, rates: &'a dyn RateSource, epsilon: Decimal) -> Self {
        Self {
            links,
            rates,
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            rate_values: HashMap::new(),
            reserved: ReservedCredit::new(),
            epsilon,
        }
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.links.contains_node(node)
    }

    /// Links leaving `node` in `direction` that still have credit this
    /// session, ordered by link id.
    ///
    /// `Forward` yields the node's outgoing links, `Backward` its incoming
    /// ones.
    pub fn neighbors(
        &mut self,
        node: &NodeId,
        direction: SearchDirection,
    ) -> Result<Vec<Link>, SearchError> {
        self.load(node, direction)?;
        let cache = match direction {
            SearchDirection::Forward => &self.outgoing,
            SearchDirection::Backward => &self.incoming,
        };
        let links = cache.get(node).map(Vec::as_slice).unwrap_or(&[]);
        Ok(links
            .iter()
            .filter(|l| self.reserved.remaining(l) >= self.epsilon)
            .cloned()
            .collect())
    }

    /// Stated credit of `link` minus what this session has reserved.
    pub fn available_credit(&self, link: &Link) -> Decimal {
        self.reserved.remaining(link)
    }

    /// Commit `amount` of `link` to a found path.
    ///
    /// The amount is capped at the remaining credit; the capped value is
    /// returned.
    pub fn reserve(&mut self, link: &Link, amount: Decimal) -> Decimal {
        let amount = amount.min(self.reserved.remaining(link));
        if amount > Decimal::ZERO {
            self.reserved.add(link.id(), amount);
        }
        amount
    }

    pub fn reserved(&self) -> &ReservedCredit {
        &self.reserved
    }

    /// Value of a named rate, fixed at its first lookup in this session.
    pub fn exchange_rate(&mut self, name: &RateName) -> Result<Decimal, SearchError> {
        if let Some(rate) = self.rate_values.get(name) {
            return Ok(*rate);
        }
        let rate = self.rates.rate(name)?;
        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate {
                name: name.clone(),
                rate,
            }
            .into());
        }
        self.rate_values.insert(name.clone(), rate);
        Ok(rate)
    }

    fn load(&mut self, node: &NodeId, direction: SearchDirection) -> Result<(), SearchError> {
        let loaded = match direction {
            SearchDirection::Forward => self.outgoing.contains_key(node),
            SearchDirection::Backward => self.incoming.contains_key(node),
        };
        if loaded {
            return Ok(());
        }

        let mut links = match direction {
            SearchDirection::Forward => self.links.links_from(node)?,
            SearchDirection::Backward => self.links.links_to(node)?,
        };
        for link in &links {
            let (near, far) = link.endpoints(direction);
            if near != node {
                log::warn!("link {} listed under {} but attached to {}", link.id(), node, near);
                return Err(SearchError::GraphCorruption {
                    link: link.id(),
                    node: node.clone(),
                });
            }
            if !self.links.contains_node(far) {
                log::warn!("link {} points at missing node {}", link.id(), far);
                return Err(SearchError::GraphCorruption {
                    link: link.id(),
                    node: far.clone(),
                });
            }
        }
        links.sort_by_key(|l| l.id());

        match direction {
            SearchDirection::Forward => self.outgoing.insert(node.clone(), links),
            SearchDirection::Backward => self.incoming.insert(node.clone(), links),
        };
        Ok(())
    }
}
