use crate::core::currency::CurrencyCode;
use crate::core::link::{Link, SearchDirection};
use crate::core::node::NodeId;
use crate::core::traits::{LinkSource, RateSource};
use crate::graph::credit_graph::{CreditGraph, ReservedCredit};
use crate::graph::distance::DistanceIndex;
use crate::search::config::SearchConfig;
use crate::search::error::SearchError;
use crate::search::path::{Path, PathHop};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;

/// Nodes proven, within one session, to have no capacity left toward the
/// search target. Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct ExhaustedSet {
    entries: HashSet<(NodeId, SearchDirection)>,
}

impl ExhaustedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the node was already marked.
    pub fn insert(&mut self, node: NodeId, direction: SearchDirection) -> bool {
        self.entries.insert((node, direction))
    }

    pub fn contains(&self, node: &NodeId, direction: SearchDirection) -> bool {
        self.entries.contains(&(node.clone(), direction))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of one single-path extraction.
#[derive(Debug)]
pub(crate) enum Extraction {
    Path(Path),
    /// A route exists but carries less than epsilon. Its bottleneck was
    /// retired so the next extraction looks elsewhere.
    Dust,
    /// Nothing left between the two ends.
    Exhausted,
    /// The hop budget ran out mid-search.
    HopLimit,
}

enum Descent {
    Reached,
    DeadEnd,
    OutOfHops,
}

/// Whether a link may follow the trail built so far.
enum Crossing {
    Open,
    /// Not from here; another route to the same node might allow it.
    Closed,
    /// Not on any route.
    Never,
}

struct Candidate {
    link: Link,
    distance: u32,
    credit: Decimal,
}

/// Mutable state of one payment search.
///
/// Everything here is created with the session and dropped with it:
/// reservations, exhausted nodes, distance estimates, the hop budget.
/// Nothing is shared with other sessions, so concurrent searches over the
/// same ledger never see each other.
pub(crate) struct SearchSession<'a> {
    graph: CreditGraph<'a>,
    distances: DistanceIndex,
    exhausted: ExhaustedSet,
    direction: SearchDirection,
    payer: NodeId,
    recipient: NodeId,
    currency: CurrencyCode,
    scale: u32,
    epsilon: Decimal,
    hops_left: usize,
}

impl<'a> SearchSession<'a> {
    pub(crate) fn new(
        links: &'a dyn LinkSource,
        rates: &'a dyn RateSource,
        config: &SearchConfig,
        payer: NodeId,
        recipient: NodeId,
        currency: CurrencyCode,
        max_hops: usize,
    ) -> Self {
        let direction = config.direction;
        let target = match direction {
            SearchDirection::Forward => recipient.clone(),
            SearchDirection::Backward => payer.clone(),
        };
        Self {
            graph: CreditGraph::new(links, rates, config.epsilon()),
            distances: DistanceIndex::new(target, direction),
            exhausted: ExhaustedSet::new(),
            direction,
            payer,
            recipient,
            currency,
            scale: config.effective_scale(),
            epsilon: config.epsilon(),
            hops_left: max_hops,
        }
    }

    /// Continue the session on behalf of another payer.
    ///
    /// Reservations carry over. A backward search targets the payer, so
    /// its distances and exhausted nodes no longer apply and start over.
    pub(crate) fn switch_payer(&mut self, payer: NodeId) {
        if payer == self.payer {
            return;
        }
        if self.direction == SearchDirection::Backward {
            self.distances = DistanceIndex::new(payer.clone(), self.direction);
            self.exhausted = ExhaustedSet::new();
        }
        self.payer = payer;
    }

    pub(crate) fn reserved(&self) -> &ReservedCredit {
        self.graph.reserved()
    }

    pub(crate) fn exhausted(&self) -> &ExhaustedSet {
        &self.exhausted
    }

    pub(crate) fn hops_left(&self) -> usize {
        self.hops_left
    }

    /// Extract one more path carrying at most `remaining`, in the request
    /// currency, and reserve its credit.
    pub(crate) fn next_path(&mut self, remaining: Decimal) -> Result<Extraction, SearchError> {
        let origin = self.origin().clone();
        let mut trail = Vec::new();
        let mut on_path = HashSet::new();
        on_path.insert(origin.clone());

        match self.descend(&origin, &mut trail, &mut on_path)? {
            Descent::Reached => {}
            Descent::DeadEnd => {
                log::debug!("no capacity left from {} toward {}", origin, self.target());
                return Ok(Extraction::Exhausted);
            }
            Descent::OutOfHops => return Ok(Extraction::HopLimit),
        }

        if self.direction == SearchDirection::Backward {
            trail.reverse();
        }
        self.settle(trail, remaining)
    }

    fn origin(&self) -> &NodeId {
        match self.direction {
            SearchDirection::Forward => &self.payer,
            SearchDirection::Backward => &self.recipient,
        }
    }

    fn target(&self) -> &NodeId {
        match self.direction {
            SearchDirection::Forward => &self.recipient,
            SearchDirection::Backward => &self.payer,
        }
    }

    /// Depth-first descent from `node`, trying the closest candidates
    /// first. On success the trail holds the route in search order.
    fn descend(
        &mut self,
        node: &NodeId,
        trail: &mut Vec<Link>,
        on_path: &mut HashSet<NodeId>,
    ) -> Result<Descent, SearchError> {
        let (candidates, mut context_bound) = self.candidates(node, trail.last(), on_path)?;
        let mut best_tried: Option<u32> = None;

        for candidate in candidates {
            let far = candidate.link.endpoints(self.direction).1.clone();
            // A sibling branch may have exhausted it since the list was built.
            if self.exhausted.contains(&far, self.direction) {
                continue;
            }
            if self.hops_left == 0 {
                log::warn!("hop budget spent while searching from {}", node);
                return Ok(Descent::OutOfHops);
            }
            self.hops_left -= 1;
            trail.push(candidate.link);
            if far == *self.target() {
                return Ok(Descent::Reached);
            }

            on_path.insert(far.clone());
            match self.descend(&far, trail, on_path)? {
                Descent::DeadEnd => {
                    on_path.remove(&far);
                    trail.pop();
                    if !self.exhausted.contains(&far, self.direction) {
                        context_bound = true;
                    }
                    best_tried = Some(best_tried.map_or(candidate.distance, |b| {
                        b.min(candidate.distance)
                    }));
                }
                outcome => return Ok(outcome),
            }
        }

        // A dead end caused by the route taken to get here says nothing
        // about other routes through this node.
        if !context_bound {
            log::trace!("{} exhausted toward {}", node, self.target());
            self.exhausted.insert(node.clone(), self.direction);
        }
        if let Some(best) = best_tried {
            self.distances.worsen(node, best.saturating_add(1));
        }
        Ok(Descent::DeadEnd)
    }

    /// Viable next links from `node`, best first, and whether any link was
    /// ruled out only because of the current trail.
    fn candidates(
        &mut self,
        node: &NodeId,
        last: Option<&Link>,
        on_path: &HashSet<NodeId>,
    ) -> Result<(Vec<Candidate>, bool), SearchError> {
        let mut context_bound = false;
        let mut candidates = Vec::new();

        for link in self.graph.neighbors(node, self.direction)? {
            let far = link.endpoints(self.direction).1.clone();
            if on_path.contains(&far) {
                context_bound = true;
                continue;
            }
            if self.exhausted.contains(&far, self.direction) {
                continue;
            }
            match self.crossing(last, &link)? {
                Crossing::Open => {}
                Crossing::Closed => {
                    context_bound = true;
                    continue;
                }
                Crossing::Never => continue,
            }
            let Some(distance) = self.distances.distance_to_dest(&mut self.graph, &far)? else {
                continue;
            };
            let credit = self.graph.available_credit(&link);
            candidates.push(Candidate {
                link,
                distance,
                credit,
            });
        }

        candidates.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then_with(|| b.credit.cmp(&a.credit))
                .then_with(|| a.link.id().cmp(&b.link.id()))
        });
        log::trace!(
            "{}: {} candidate(s) toward {}",
            node,
            candidates.len(),
            self.target()
        );
        Ok((candidates, context_bound))
    }

    fn crossing(&mut self, last: Option<&Link>, link: &Link) -> Result<Crossing, SearchError> {
        let enters_recipient = match self.direction {
            SearchDirection::Forward => link.to() == &self.recipient,
            SearchDirection::Backward => last.is_none(),
        };
        if enters_recipient && link.currency() != &self.currency {
            return Ok(Crossing::Never);
        }
        let Some(last) = last else {
            return Ok(Crossing::Open);
        };
        let (upstream, downstream) = match self.direction {
            SearchDirection::Forward => (last, link),
            SearchDirection::Backward => (link, last),
        };
        Ok(match self.junction_rate(upstream, downstream)? {
            Some(_) => Crossing::Open,
            None => Crossing::Closed,
        })
    }

    /// Factor converting `upstream` amounts into `downstream` currency,
    /// `None` when the junction cannot be crossed.
    fn junction_rate(
        &mut self,
        upstream: &Link,
        downstream: &Link,
    ) -> Result<Option<Decimal>, SearchError> {
        if upstream.currency() == downstream.currency() {
            return Ok(Some(Decimal::ONE));
        }
        match downstream.exchange_rate() {
            Some(name) => Ok(Some(self.graph.exchange_rate(name)?)),
            None => Ok(None),
        }
    }

    /// Turn a route (payment order) into a path carrying as much of
    /// `remaining` as its links allow, and reserve it.
    ///
    /// The amount delivered is fixed first. Each upstream hop then carries
    /// what the next one needs converted back at the junction rate,
    /// rounded up so the recipient is never short.
    fn settle(&mut self, links: Vec<Link>, remaining: Decimal) -> Result<Extraction, SearchError> {
        let n = links.len();
        let mut rates = Vec::with_capacity(n);
        rates.push(Decimal::ONE);
        for k in 1..n {
            // Every junction on the route was checked open during descent.
            let rate = self
                .junction_rate(&links[k - 1], &links[k])?
                .unwrap_or(Decimal::ONE);
            rates.push(rate);
        }
        let available: Vec<Decimal> = links
            .iter()
            .map(|l| self.graph.available_credit(l))
            .collect();

        // Most the route delivers, in the request currency, and the link
        // that bounds it.
        let mut bottleneck = available[0];
        let mut binding = 0;
        for k in 1..n {
            let carried = bottleneck.checked_mul(rates[k]).unwrap_or(Decimal::MAX);
            if available[k] < carried {
                bottleneck = available[k];
                binding = k;
            } else {
                bottleneck = carried;
            }
        }

        let mut capacity = remaining
            .min(bottleneck)
            .round_dp_with_strategy(self.scale, RoundingStrategy::ToZero)
            .normalize();
        let amounts = loop {
            if capacity < self.epsilon {
                self.graph.reserve(&links[binding], available[binding]);
                log::debug!("route of {} hop(s) carries less than {}", n, self.epsilon);
                return Ok(Extraction::Dust);
            }
            let amounts = self.upstream_amounts(capacity, &rates);
            let Some(k) = (0..n).find(|&k| amounts[k] > available[k]) else {
                break amounts;
            };
            // Rounding up pushed hop k past its credit. Deliver less by
            // the excess, converted down to the recipient.
            let mut excess = amounts[k] - available[k];
            for rate in &rates[k + 1..] {
                excess = excess.checked_mul(*rate).unwrap_or(Decimal::MAX);
            }
            let cut = excess
                .round_dp_with_strategy(self.scale, RoundingStrategy::AwayFromZero)
                .max(self.epsilon);
            capacity = (capacity - cut).normalize();
        };

        let mut hops = Vec::with_capacity(n);
        for (link, amount) in links.into_iter().zip(amounts) {
            self.graph.reserve(&link, amount);
            hops.push(PathHop::new(link, amount));
        }
        let path = Path::new(hops);
        log::debug!("found {}", path);
        Ok(Extraction::Path(path))
    }

    /// Hop amounts delivering `capacity` at the last hop, worked back
    /// toward the payer.
    fn upstream_amounts(&self, capacity: Decimal, rates: &[Decimal]) -> Vec<Decimal> {
        let n = rates.len();
        let mut amounts = vec![Decimal::ZERO; n];
        amounts[n - 1] = capacity;
        for k in (0..n - 1).rev() {
            amounts[k] = amounts[k + 1]
                .checked_div(rates[k + 1])
                .unwrap_or(Decimal::MAX)
                .round_dp_with_strategy(self.scale, RoundingStrategy::AwayFromZero)
                .normalize();
        }
        amounts
    }
}
