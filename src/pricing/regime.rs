use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// GST treatment of an order, resolved per order from the shipping
/// destination. Two terminal states, no transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Buyer and seller in the same state: tax splits into CGST + SGST.
    IntraState,
    /// Different (or unknown) states: the full tax is IGST.
    InterState,
}

/// Classifies a destination state against the seller's home state.
///
/// The rule set is deliberately injected rather than hard-coded so a richer
/// state-pair table can replace the binary match without touching the
/// breakdown computation. Built from `PricingConfig` at startup.
#[derive(Debug, Clone)]
pub struct RegimeResolver {
    seller_state: String,
    intra_aliases: Vec<String>,
}

impl RegimeResolver {
    pub fn new<I, S>(seller_state: impl Into<String>, intra_aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let seller_state = seller_state.into();
        let mut aliases: Vec<String> = intra_aliases
            .into_iter()
            .map(|a| normalize(a.as_ref()))
            .filter(|a| !a.is_empty())
            .collect();
        let seller_normalized = normalize(&seller_state);
        if !seller_normalized.is_empty() && !aliases.contains(&seller_normalized) {
            aliases.push(seller_normalized);
        }
        Self {
            seller_state,
            intra_aliases: aliases,
        }
    }

    pub fn seller_state(&self) -> &str {
        &self.seller_state
    }

    /// Resolves the regime for a free-text destination state as captured at
    /// checkout. Missing, empty, and unrecognized values are conservatively
    /// inter-state: showing IGST is preferable to wrongly assuming local.
    pub fn resolve(&self, destination_state: Option<&str>) -> TaxRegime {
        match destination_state.map(normalize) {
            Some(state) if !state.is_empty() && self.intra_aliases.contains(&state) => {
                TaxRegime::IntraState
            }
            _ => TaxRegime::InterState,
        }
    }
}

impl Default for RegimeResolver {
    fn default() -> Self {
        Self::new("Karnataka", ["karnataka", "ka"])
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}
