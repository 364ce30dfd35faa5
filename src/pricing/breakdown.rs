use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::line_item::{compute_line_item_tax, OrderLineItem};
use super::regime::TaxRegime;
use super::PricingPolicy;

/// Order-level adjustments and the captured charge, as read off the order
/// header. `total_amount_charged` is authoritative and immutable once the
/// order is placed; the breakdown explains it, never recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAdjustments {
    pub coupon_discount: Decimal,
    pub wallet_amount_used: Decimal,
    pub total_amount_charged: Decimal,
    /// Shipping as persisted at order creation. `None` on pre-migration rows,
    /// which fall back to the legacy derive-by-difference path.
    pub recorded_shipping_charge: Option<Decimal>,
}

/// Data-consistency conditions the engine recovered from locally but that
/// operators should see. Carried on the breakdown; the service layer logs them
/// with the order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingWarning {
    /// The captured charge is smaller than the reconstructed components, so
    /// the derived shipping went negative and was floored to zero. Usually
    /// means the charge was captured under a different tax-rate assumption.
    NegativeRawShipping { raw: Decimal },
}

/// The itemized financial breakdown of one order.
///
/// All fields are unrounded; use [`OrderFinancialBreakdown::display`] when
/// rendering. Exactly one of `{cgst+sgst, igst}` is populated, and
/// `cgst + sgst == total_tax` holds bit-for-bit under `IntraState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFinancialBreakdown {
    pub items_subtotal: Decimal,
    pub total_tax: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub shipping_charge: Decimal,
    pub coupon_discount: Decimal,
    pub wallet_amount_used: Decimal,
    pub grand_total: Decimal,
    pub tax_regime: TaxRegime,
    pub warnings: Vec<PricingWarning>,
}

/// Two-decimal projection of a breakdown for rendering. This is the only
/// place rounding happens, so CGST+SGST cannot drift from the total the way
/// independently rounded halves would.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BreakdownDisplay {
    pub items_subtotal: Decimal,
    pub total_tax: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub shipping_charge: Decimal,
    pub coupon_discount: Decimal,
    pub wallet_amount_used: Decimal,
    pub grand_total: Decimal,
    pub tax_regime: TaxRegime,
    pub warnings: Vec<PricingWarning>,
}

impl OrderFinancialBreakdown {
    pub fn display(&self) -> BreakdownDisplay {
        BreakdownDisplay {
            items_subtotal: round2(self.items_subtotal),
            total_tax: round2(self.total_tax),
            cgst: round2(self.cgst),
            sgst: round2(self.sgst),
            igst: round2(self.igst),
            shipping_charge: round2(self.shipping_charge),
            coupon_discount: round2(self.coupon_discount),
            wallet_amount_used: round2(self.wallet_amount_used),
            grand_total: round2(self.grand_total),
            tax_regime: self.tax_regime,
            warnings: self.warnings.clone(),
        }
    }
}

/// Rounds a currency value to two decimal places for display.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Derives the full financial breakdown of an order.
///
/// Pure and deterministic: the same `(items, adjustments, destination)` always
/// yields an identical breakdown, so the order page and the invoice can each
/// call this independently and agree.
pub fn build_breakdown(
    items: &[OrderLineItem],
    adjustments: &OrderAdjustments,
    destination_state: Option<&str>,
    policy: &PricingPolicy,
) -> OrderFinancialBreakdown {
    let items_subtotal: Decimal = items.iter().map(OrderLineItem::line_subtotal).sum();
    let total_tax: Decimal = items
        .iter()
        .map(|item| compute_line_item_tax(item, policy.default_tax_rate_percent))
        .sum();

    let tax_regime = policy.resolver.resolve(destination_state);

    let mut warnings = Vec::new();
    let shipping_charge = match adjustments.recorded_shipping_charge {
        // A persisted charge is taken as-is, except that a negative value is
        // floored the same way the derived path floors: shipping can never
        // come out below zero, whatever the row holds.
        Some(recorded) if recorded < Decimal::ZERO => {
            warnings.push(PricingWarning::NegativeRawShipping { raw: recorded });
            Decimal::ZERO
        }
        Some(recorded) => recorded,
        None => {
            // Legacy orders never persisted a shipping line; reconstruct it
            // from the gap between the captured charge and the components,
            // adding back the discounts that were taken off before capture.
            let raw = adjustments.total_amount_charged - (items_subtotal + total_tax)
                + adjustments.coupon_discount
                + adjustments.wallet_amount_used;
            if raw < Decimal::ZERO {
                warnings.push(PricingWarning::NegativeRawShipping { raw });
                Decimal::ZERO
            } else {
                round2(raw)
            }
        }
    };

    // `sgst = total_tax - cgst` rather than a second halving, so the split
    // reconstructs the total exactly even when the half is not representable.
    let (cgst, sgst, igst) = match tax_regime {
        TaxRegime::IntraState => {
            let cgst = total_tax / Decimal::TWO;
            (cgst, total_tax - cgst, Decimal::ZERO)
        }
        TaxRegime::InterState => (Decimal::ZERO, Decimal::ZERO, total_tax),
    };

    OrderFinancialBreakdown {
        items_subtotal,
        total_tax,
        cgst,
        sgst,
        igst,
        shipping_charge,
        coupon_discount: adjustments.coupon_discount,
        wallet_amount_used: adjustments.wallet_amount_used,
        grand_total: adjustments.total_amount_charged,
        tax_regime,
        warnings,
    }
}
