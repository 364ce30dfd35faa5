//! Property-based tests for the pricing engine.
//!
//! These tests use proptest to verify invariants across a wide range of inputs,
//! helping to catch edge cases that unit tests might miss.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use storefront_api::pricing::{
    build_breakdown, round2, CustomizationDetail, OrderAdjustments, OrderLineItem, PricingPolicy,
    PricingWarning, TaxRegime,
};

// Strategies for generating test data

fn money_strategy() -> impl Strategy<Value = Decimal> {
    (0u64..100_000, 0u8..100)
        .prop_map(|(rupees, paise)| Decimal::from(rupees) + Decimal::from(paise) / dec!(100))
}

// Allows negative amounts, for corrupt or adversarial stored values
fn signed_money_strategy() -> impl Strategy<Value = Decimal> {
    (money_strategy(), proptest::bool::ANY)
        .prop_map(|(amount, negate)| if negate { -amount } else { amount })
}

fn rate_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(dec!(0)),
        Just(dec!(5)),
        Just(dec!(12)),
        Just(dec!(12.5)),
        Just(dec!(18)),
        Just(dec!(28)),
    ]
}

fn quantity_strategy() -> impl Strategy<Value = i32> {
    1i32..50
}

fn simple_item_strategy() -> impl Strategy<Value = OrderLineItem> {
    (
        money_strategy(),
        quantity_strategy(),
        proptest::option::of(rate_strategy()),
    )
        .prop_map(|(unit_price, quantity, rate)| OrderLineItem {
            name: "Item".to_string(),
            unit_price,
            quantity,
            size: None,
            color_name: None,
            tax_rate_percent: rate,
            customization: None,
        })
}

fn composite_item_strategy() -> impl Strategy<Value = OrderLineItem> {
    (
        money_strategy(),
        money_strategy(),
        quantity_strategy(),
        rate_strategy(),
        proptest::option::of(rate_strategy()),
    )
        .prop_map(
            |(base_unit_price, customization_unit_cost, quantity, base_rate, custom_rate)| {
                OrderLineItem {
                    name: "Personalized Item".to_string(),
                    unit_price: base_unit_price + customization_unit_cost,
                    quantity,
                    size: None,
                    color_name: None,
                    tax_rate_percent: None,
                    customization: Some(CustomizationDetail {
                        base_unit_price,
                        customization_unit_cost,
                        base_tax_rate_percent: base_rate,
                        customization_tax_rate_percent: custom_rate,
                    }),
                }
            },
        )
}

fn item_strategy() -> impl Strategy<Value = OrderLineItem> {
    prop_oneof![simple_item_strategy(), composite_item_strategy()]
}

fn cart_strategy() -> impl Strategy<Value = Vec<OrderLineItem>> {
    proptest::collection::vec(item_strategy(), 1..8)
}

fn destination_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("Karnataka".to_string())),
        Just(Some("karnataka".to_string())),
        Just(Some(" KA ".to_string())),
        Just(Some("Maharashtra".to_string())),
        Just(Some("Delhi".to_string())),
        Just(Some("".to_string())),
    ]
}

fn adjustments_strategy() -> impl Strategy<Value = OrderAdjustments> {
    (
        money_strategy(),
        money_strategy(),
        money_strategy(),
        proptest::option::of(signed_money_strategy()),
    )
        .prop_map(
            |(coupon, wallet, charged, recorded)| OrderAdjustments {
                coupon_discount: coupon,
                wallet_amount_used: wallet,
                total_amount_charged: charged,
                recorded_shipping_charge: recorded,
            },
        )
}

// Property: the engine is a pure function of its inputs
proptest! {
    #[test]
    fn breakdown_is_deterministic(
        items in cart_strategy(),
        adjustments in adjustments_strategy(),
        destination in destination_strategy(),
    ) {
        let policy = PricingPolicy::default();
        let first = build_breakdown(&items, &adjustments, destination.as_deref(), &policy);
        let second = build_breakdown(&items, &adjustments, destination.as_deref(), &policy);
        prop_assert_eq!(first, second);
    }
}

// Property: the GST split is exact and mutually exclusive
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn intra_state_split_reconstructs_total_exactly(
        items in cart_strategy(),
        adjustments in adjustments_strategy(),
    ) {
        let b = build_breakdown(
            &items,
            &adjustments,
            Some("Karnataka"),
            &PricingPolicy::default(),
        );
        prop_assert_eq!(b.tax_regime, TaxRegime::IntraState);
        prop_assert_eq!(b.cgst + b.sgst, b.total_tax);
        prop_assert_eq!(b.igst, Decimal::ZERO);
    }

    #[test]
    fn inter_state_puts_all_tax_in_igst(
        items in cart_strategy(),
        adjustments in adjustments_strategy(),
    ) {
        let b = build_breakdown(
            &items,
            &adjustments,
            Some("Maharashtra"),
            &PricingPolicy::default(),
        );
        prop_assert_eq!(b.tax_regime, TaxRegime::InterState);
        prop_assert_eq!(b.igst, b.total_tax);
        prop_assert_eq!(b.cgst, Decimal::ZERO);
        prop_assert_eq!(b.sgst, Decimal::ZERO);
    }

    #[test]
    fn missing_destination_falls_back_to_inter_state(
        items in cart_strategy(),
        adjustments in adjustments_strategy(),
        destination in prop_oneof![Just(None), Just(Some("".to_string())), Just(Some("  ".to_string()))],
    ) {
        let b = build_breakdown(
            &items,
            &adjustments,
            destination.as_deref(),
            &PricingPolicy::default(),
        );
        prop_assert_eq!(b.tax_regime, TaxRegime::InterState);
    }
}

// Property: shipping never goes negative, and the floor is always surfaced
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn shipping_is_never_negative(
        items in cart_strategy(),
        adjustments in adjustments_strategy(),
        destination in destination_strategy(),
    ) {
        let b = build_breakdown(
            &items,
            &adjustments,
            destination.as_deref(),
            &PricingPolicy::default(),
        );
        prop_assert!(b.shipping_charge >= Decimal::ZERO);
        let floored = b
            .warnings
            .iter()
            .any(|w| matches!(w, PricingWarning::NegativeRawShipping { .. }));
        // The pre-floor value either comes straight off the row or is the
        // legacy derived difference; both floor the same way.
        let raw = match adjustments.recorded_shipping_charge {
            Some(recorded) => recorded,
            None => {
                adjustments.total_amount_charged
                    - (b.items_subtotal + b.total_tax)
                    + adjustments.coupon_discount
                    + adjustments.wallet_amount_used
            }
        };
        prop_assert_eq!(floored, raw < Decimal::ZERO);
    }

    #[test]
    fn negative_recorded_shipping_floors_to_zero(
        items in cart_strategy(),
        mut adjustments in adjustments_strategy(),
        recorded in money_strategy(),
        destination in destination_strategy(),
    ) {
        prop_assume!(recorded > Decimal::ZERO);
        adjustments.recorded_shipping_charge = Some(-recorded);
        let b = build_breakdown(
            &items,
            &adjustments,
            destination.as_deref(),
            &PricingPolicy::default(),
        );
        prop_assert_eq!(b.shipping_charge, Decimal::ZERO);
        prop_assert_eq!(
            b.warnings,
            vec![PricingWarning::NegativeRawShipping { raw: -recorded }]
        );
    }

    #[test]
    fn recorded_shipping_is_used_verbatim(
        items in cart_strategy(),
        mut adjustments in adjustments_strategy(),
        recorded in money_strategy(),
    ) {
        adjustments.recorded_shipping_charge = Some(recorded);
        let b = build_breakdown(
            &items,
            &adjustments,
            Some("Karnataka"),
            &PricingPolicy::default(),
        );
        prop_assert_eq!(b.shipping_charge, recorded);
        prop_assert!(b.warnings.is_empty());
    }
}

// Property: the captured total is passed through untouched
proptest! {
    #[test]
    fn grand_total_is_passed_through(
        items in cart_strategy(),
        adjustments in adjustments_strategy(),
        destination in destination_strategy(),
    ) {
        let b = build_breakdown(
            &items,
            &adjustments,
            destination.as_deref(),
            &PricingPolicy::default(),
        );
        prop_assert_eq!(b.grand_total, adjustments.total_amount_charged);
        prop_assert_eq!(b.coupon_discount, adjustments.coupon_discount);
        prop_assert_eq!(b.wallet_amount_used, adjustments.wallet_amount_used);
    }
}

// Property: a composite item with a free customization component taxes the
// same as the equivalent simple item
proptest! {
    #[test]
    fn composite_with_zero_customization_matches_simple(
        base_price in money_strategy(),
        quantity in quantity_strategy(),
        rate in rate_strategy(),
    ) {
        let simple = OrderLineItem {
            name: "Plain".to_string(),
            unit_price: base_price,
            quantity,
            size: None,
            color_name: None,
            tax_rate_percent: Some(rate),
            customization: None,
        };
        let composite = OrderLineItem {
            name: "Plain as composite".to_string(),
            unit_price: base_price,
            quantity,
            size: None,
            color_name: None,
            tax_rate_percent: None,
            customization: Some(CustomizationDetail {
                base_unit_price: base_price,
                customization_unit_cost: Decimal::ZERO,
                base_tax_rate_percent: rate,
                customization_tax_rate_percent: None,
            }),
        };
        let adjustments = OrderAdjustments {
            coupon_discount: Decimal::ZERO,
            wallet_amount_used: Decimal::ZERO,
            total_amount_charged: Decimal::ZERO,
            recorded_shipping_charge: Some(Decimal::ZERO),
        };
        let policy = PricingPolicy::default();
        let a = build_breakdown(&[simple], &adjustments, Some("Karnataka"), &policy);
        let b = build_breakdown(&[composite], &adjustments, Some("Karnataka"), &policy);
        prop_assert_eq!(a.total_tax, b.total_tax);
        prop_assert_eq!(a.cgst, b.cgst);
        prop_assert_eq!(a.sgst, b.sgst);
    }
}

// Property: items without a rate tax at the configured default
proptest! {
    #[test]
    fn rateless_items_use_the_configured_default(
        unit_price in money_strategy(),
        quantity in quantity_strategy(),
        default_rate in rate_strategy(),
    ) {
        let item = OrderLineItem {
            name: "Rateless".to_string(),
            unit_price,
            quantity,
            size: None,
            color_name: None,
            tax_rate_percent: None,
            customization: None,
        };
        let adjustments = OrderAdjustments {
            coupon_discount: Decimal::ZERO,
            wallet_amount_used: Decimal::ZERO,
            total_amount_charged: Decimal::ZERO,
            recorded_shipping_charge: Some(Decimal::ZERO),
        };
        let policy = PricingPolicy {
            default_tax_rate_percent: default_rate,
            ..PricingPolicy::default()
        };
        let b = build_breakdown(&[item], &adjustments, Some("Delhi"), &policy);
        let expected = unit_price * Decimal::from(quantity) * default_rate / dec!(100);
        prop_assert_eq!(b.total_tax, expected);
    }
}

// Property: display is round2 of the raw figures, nothing more
proptest! {
    #[test]
    fn display_projection_rounds_every_field(
        items in cart_strategy(),
        adjustments in adjustments_strategy(),
        destination in destination_strategy(),
    ) {
        let b = build_breakdown(
            &items,
            &adjustments,
            destination.as_deref(),
            &PricingPolicy::default(),
        );
        let d = b.display();
        prop_assert_eq!(d.items_subtotal, round2(b.items_subtotal));
        prop_assert_eq!(d.total_tax, round2(b.total_tax));
        prop_assert_eq!(d.cgst, round2(b.cgst));
        prop_assert_eq!(d.sgst, round2(b.sgst));
        prop_assert_eq!(d.igst, round2(b.igst));
        prop_assert_eq!(d.shipping_charge, round2(b.shipping_charge));
        prop_assert_eq!(d.grand_total, round2(b.grand_total));
        prop_assert_eq!(d.tax_regime, b.tax_regime);
        prop_assert_eq!(d.warnings, b.warnings);
    }
}
