use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single order line as the engine sees it, decoupled from storage.
///
/// `unit_price` is the tax-exclusive price charged per unit as captured on the
/// order (markup already applied). Presence of `customization` is the sole
/// discriminator between a simple and a composite (personalized) line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineItem {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_name: Option<String>,
    /// Rate in percent out of 100 (e.g. 12, 18, 12.5). Missing means "use the
    /// configured default".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization: Option<CustomizationDetail>,
}

/// Split pricing for a personalized item: the undecorated base product and the
/// printing/personalization service carry independent prices and rates.
///
/// `base_unit_price + customization_unit_cost` is not required to equal the
/// line's `unit_price` (historical orders diverge by rounding), so tax is
/// always computed from the components when this record is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomizationDetail {
    pub base_unit_price: Decimal,
    pub customization_unit_cost: Decimal,
    pub base_tax_rate_percent: Decimal,
    /// Missing means "use the configured default" (the service component has
    /// historically always been 18%).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization_tax_rate_percent: Option<Decimal>,
}

impl OrderLineItem {
    /// Tax-exclusive line total: `unit_price * quantity`.
    pub fn line_subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Computes the tax amount contributed by one line item.
///
/// Composite items tax each component at its own rate; simple items tax the
/// unit price at the item's rate, falling back to `default_rate_percent`.
/// Rates are percentages out of 100 and are never normalized to fractions.
///
/// No rounding happens here. Per-item rounding before summation would compound
/// across a large cart; the aggregate keeps full precision and rounds once at
/// display time.
pub fn compute_line_item_tax(item: &OrderLineItem, default_rate_percent: Decimal) -> Decimal {
    let quantity = Decimal::from(item.quantity);
    let hundred = dec!(100);

    match &item.customization {
        Some(c) => {
            let base_tax = c.base_unit_price * quantity * c.base_tax_rate_percent / hundred;
            let customization_rate = c
                .customization_tax_rate_percent
                .unwrap_or(default_rate_percent);
            let customization_tax =
                c.customization_unit_cost * quantity * customization_rate / hundred;
            base_tax + customization_tax
        }
        None => {
            let rate = item.tax_rate_percent.unwrap_or(default_rate_percent);
            item.unit_price * quantity * rate / hundred
        }
    }
}
