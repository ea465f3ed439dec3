use crate::core::link::SearchDirection;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Default hop budget for a single request.
pub const MAX_HOPS: usize = 1000;

/// Decimal places kept for converted amounts.
pub const DEFAULT_SCALE: u32 = 12;

/// Tunables for the path search engine.
///
/// Every field has a default, so a partial JSON object is a valid config.
///
/// # Examples
///
/// ```
/// use credit_path_engine::search::config::SearchConfig;
/// use credit_path_engine::core::link::SearchDirection;
///
/// let config: SearchConfig = serde_json::from_str(r#"{ "max_hops": 50 }"#).unwrap();
/// assert_eq!(config.max_hops, 50);
/// assert_eq!(config.direction, SearchDirection::Forward);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Link traversals allowed per request when the request sets none.
    pub max_hops: usize,
    /// Which end of the payment the search starts from.
    pub direction: SearchDirection,
    /// Decimal places kept for converted amounts, at most
    /// [`Decimal::MAX_SCALE`].
    #[serde(deserialize_with = "deserialize_scale")]
    pub scale: u32,
}

impl SearchConfig {
    /// Decimal places actually kept. A scale set past what `Decimal`
    /// represents is capped.
    pub fn effective_scale(&self) -> u32 {
        self.scale.min(Decimal::MAX_SCALE)
    }

    /// Smallest amount the engine distinguishes from zero.
    pub fn epsilon(&self) -> Decimal {
        Decimal::new(1, self.effective_scale())
    }
}

fn deserialize_scale<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let scale = u32::deserialize(deserializer)?;
    if scale > Decimal::MAX_SCALE {
        return Err(serde::de::Error::custom(format!(
            "scale {} exceeds the maximum of {}",
            scale,
            Decimal::MAX_SCALE
        )));
    }
    Ok(scale)
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_hops: MAX_HOPS,
            direction: SearchDirection::Forward,
            scale: DEFAULT_SCALE,
        }
    }
}
