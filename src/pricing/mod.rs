//! Order pricing and GST breakdown engine.
//!
//! Every rupee figure the API shows for an order (subtotal, CGST/SGST or
//! IGST, shipping, grand total) comes out of this module. The order detail
//! endpoint and the invoice endpoint both call [`build_breakdown`]; neither is
//! allowed to re-derive tax with its own defaults, which is how the order page
//! and the invoice historically ended up disagreeing about the same order.
//!
//! The engine is pure and synchronous: no I/O, no shared state, identical
//! inputs always produce an identical breakdown. All amounts stay as unrounded
//! [`rust_decimal::Decimal`] values internally; two-decimal rounding happens
//! only in the display projection.

pub mod breakdown;
pub mod line_item;
pub mod regime;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub use breakdown::{
    build_breakdown, round2, BreakdownDisplay, OrderAdjustments, OrderFinancialBreakdown,
    PricingWarning,
};
pub use line_item::{compute_line_item_tax, CustomizationDetail, OrderLineItem};
pub use regime::{RegimeResolver, TaxRegime};

/// Fallback GST rate (percent out of 100) for line items that carry no rate of
/// their own, and for the customization component of composite items.
///
/// Historical data is split between 12% and 18% assumptions; the active value
/// is configurable (`PricingConfig.default_tax_rate_percent`) so the choice
/// stays visible instead of being baked into two call sites.
pub const DEFAULT_TAX_RATE_PERCENT: Decimal = dec!(18);

/// Everything the engine needs beyond the order itself: the fallback rate and
/// the regime-resolution policy. Built once from `AppConfig` at startup and
/// shared by all consumers.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    pub default_tax_rate_percent: Decimal,
    pub resolver: RegimeResolver,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            default_tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            resolver: RegimeResolver::default(),
        }
    }
}
