use crate::core::currency::{CurrencyCode, RateName};
use crate::core::node::NodeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a link.
///
/// Ordered, so that candidate links which tie on every search criterion
/// are still tried in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(Uuid);

impl LinkId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// A link id built from a small integer, for fixtures that need a
    /// known ordering.
    pub fn from_u128(n: u128) -> Self {
        Self(Uuid::from_u128(n))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which way a search walks the credit graph.
///
/// `Forward` starts at the payer and follows links in payment direction;
/// `Backward` starts at the recipient and follows them against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    pub fn reverse(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }
}

impl fmt::Display for SearchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDirection::Forward => f.write_str("forward"),
            SearchDirection::Backward => f.write_str("backward"),
        }
    }
}

/// A directed, currency-denominated credit relationship.
///
/// `from` can pay `to` up to `available_credit` units of `currency`.
/// When the link's currency differs from the currency of the link that
/// feeds into it on a path, `exchange_rate` names the rate converting the
/// upstream currency into this one. Without a rate such a junction
/// cannot be crossed.
///
/// # Examples
///
/// ```
/// use credit_path_engine::core::link::Link;
/// use credit_path_engine::core::node::NodeId;
/// use credit_path_engine::core::currency::{CurrencyCode, RateName};
/// use rust_decimal_macros::dec;
///
/// let link = Link::new(
///     NodeId::new("B"),
///     NodeId::new("C"),
///     dec!(500),
///     CurrencyCode::new("CAD"),
/// )
/// .with_exchange_rate(RateName::new("USDCAD"));
///
/// assert_eq!(link.available_credit(), dec!(500));
/// assert_eq!(link.exchange_rate().unwrap().as_str(), "USDCAD");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    id: LinkId,
    /// Paying side.
    from: NodeId,
    /// Receiving side.
    to: NodeId,
    available_credit: Decimal,
    currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exchange_rate: Option<RateName>,
}

impl Link {
    /// Create a new link with a random id.
    ///
    /// # Panics
    ///
    /// Panics if `available_credit` is negative.
    pub fn new(
        from: NodeId,
        to: NodeId,
        available_credit: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        Self::with_id(LinkId::new_v4(), from, to, available_credit, currency)
    }

    /// Create a link with a specific id (useful for testing / determinism).
    pub fn with_id(
        id: LinkId,
        from: NodeId,
        to: NodeId,
        available_credit: Decimal,
        currency: CurrencyCode,
    ) -> Self {
        assert!(
            available_credit >= Decimal::ZERO,
            "Link credit must be non-negative, got {}",
            available_credit
        );
        Self {
            id,
            from,
            to,
            available_credit,
            currency,
            exchange_rate: None,
        }
    }

    /// Name the rate converting the upstream currency into this link's.
    pub fn with_exchange_rate(mut self, rate: RateName) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn from(&self) -> &NodeId {
        &self.from
    }

    pub fn to(&self) -> &NodeId {
        &self.to
    }

    pub fn available_credit(&self) -> Decimal {
        self.available_credit
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn exchange_rate(&self) -> Option<&RateName> {
        self.exchange_rate.as_ref()
    }

    /// `(near, far)` ends of the link as seen by a search walking in
    /// `direction`.
    pub fn endpoints(&self, direction: SearchDirection) -> (&NodeId, &NodeId) {
        match direction {
            SearchDirection::Forward => (&self.from, &self.to),
            SearchDirection::Backward => (&self.to, &self.from),
        }
    }

    pub(crate) fn set_available_credit(&mut self, credit: Decimal) {
        debug_assert!(credit >= Decimal::ZERO);
        self.available_credit = credit;
    }
}
