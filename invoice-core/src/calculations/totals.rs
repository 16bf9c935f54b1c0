//! Line-item totals for an invoice.
//!
//! | Step           | Formula |
//! |----------------|---------|
//! | amount         | quantity × rate (per item) |
//! | subtotal       | Σ amount |
//! | discount       | subtotal × clamp(discount, 0, 100) / 100 |
//! | tax            | (subtotal − discount) × 10% |
//! | total          | subtotal − discount + tax |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use invoice_core::InvoiceItem;
//! use invoice_core::calculations::InvoiceCalculator;
//!
//! let items = vec![
//!     InvoiceItem::new(1, "Consulting", dec!(2), dec!(50)),
//!     InvoiceItem::new(2, "Setup", dec!(1), dec!(100)),
//! ];
//!
//! let totals = InvoiceCalculator::new(&items).calculate(dec!(10));
//!
//! assert_eq!(totals.subtotal, dec!(200));
//! assert_eq!(totals.discount_amount, dec!(20));
//! assert_eq!(totals.tax, dec!(18));
//! assert_eq!(totals.total, dec!(198));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::InvoiceItem;
use crate::calculations::common::round_half_up;

/// Flat tax applied after the discount.
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Upper bound of the discount percentage.
pub const MAX_DISCOUNT: Decimal = Decimal::ONE_HUNDRED;

/// Clamp a discount percentage into `0..=100`.
pub fn clamp_discount(discount: Decimal) -> Decimal {
    let clamped = discount.clamp(Decimal::ZERO, MAX_DISCOUNT);
    if clamped != discount {
        tracing::warn!(%discount, %clamped, "discount outside 0-100% clamped");
    }
    clamped
}

/// Aggregate amounts for a set of line items, at full precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Every amount rounded half-up to cents, for display.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_half_up(self.subtotal),
            discount_amount: round_half_up(self.discount_amount),
            tax: round_half_up(self.tax),
            total: round_half_up(self.total),
        }
    }
}

/// Calculator over a borrowed, ordered slice of line items.
#[derive(Debug, Clone)]
pub struct InvoiceCalculator<'a> {
    items: &'a [InvoiceItem],
}

impl<'a> InvoiceCalculator<'a> {
    pub fn new(items: &'a [InvoiceItem]) -> Self {
        Self { items }
    }

    /// Compute subtotal, discount, tax and total for `discount` percent off.
    ///
    /// Out-of-range discounts are clamped to `0..=100` first.
    pub fn calculate(
        &self,
        discount: Decimal,
    ) -> InvoiceTotals {
        let subtotal = self.subtotal();
        let discount_amount = self.discount_amount(subtotal, clamp_discount(discount));
        let tax = self.tax(subtotal, discount_amount);
        let total = self.total(subtotal, discount_amount, tax);

        InvoiceTotals {
            subtotal,
            discount_amount,
            tax,
            total,
        }
    }

    fn subtotal(&self) -> Decimal {
        self.items.iter().map(InvoiceItem::amount).sum()
    }

    fn discount_amount(
        &self,
        subtotal: Decimal,
        discount: Decimal,
    ) -> Decimal {
        subtotal * discount / MAX_DISCOUNT
    }

    fn tax(
        &self,
        subtotal: Decimal,
        discount_amount: Decimal,
    ) -> Decimal {
        (subtotal - discount_amount) * TAX_RATE
    }

    fn total(
        &self,
        subtotal: Decimal,
        discount_amount: Decimal,
        tax: Decimal,
    ) -> Decimal {
        subtotal - discount_amount + tax
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_items() -> Vec<InvoiceItem> {
        vec![
            InvoiceItem::new(1, "Consulting", dec!(2), dec!(50)),
            InvoiceItem::new(2, "Setup", dec!(1), dec!(100)),
        ]
    }

    // =========================================================================
    // step tests
    // =========================================================================

    #[test]
    fn subtotal_of_empty_list_is_zero() {
        let calculator = InvoiceCalculator::new(&[]);

        assert_eq!(calculator.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn subtotal_includes_zero_amount_items() {
        let mut items = sample_items();
        items.push(InvoiceItem::blank(3));
        items.push(InvoiceItem::new(4, "Free call", dec!(1), dec!(0)));
        let calculator = InvoiceCalculator::new(&items);

        assert_eq!(calculator.subtotal(), dec!(200));
    }

    #[test]
    fn subtotal_sums_quantity_times_rate() {
        let items = vec![
            InvoiceItem::new(1, "a", dec!(0.5), dec!(33.33)),
            InvoiceItem::new(2, "b", dec!(3), dec!(19.99)),
            InvoiceItem::new(3, "c", dec!(12), dec!(0.01)),
        ];
        let calculator = InvoiceCalculator::new(&items);

        assert_eq!(calculator.subtotal(), dec!(16.665) + dec!(59.97) + dec!(0.12));
    }

    #[test]
    fn discount_amount_is_percentage_of_subtotal() {
        let calculator = InvoiceCalculator::new(&[]);

        assert_eq!(calculator.discount_amount(dec!(250), dec!(12)), dec!(30));
    }

    #[test]
    fn tax_applies_after_discount() {
        let calculator = InvoiceCalculator::new(&[]);

        assert_eq!(calculator.tax(dec!(200), dec!(20)), dec!(18));
    }

    #[test]
    fn clamp_discount_bounds_to_percentage_range() {
        assert_eq!(clamp_discount(dec!(-5)), Decimal::ZERO);
        assert_eq!(clamp_discount(dec!(250)), dec!(100));
        assert_eq!(clamp_discount(dec!(37.5)), dec!(37.5));
    }

    // =========================================================================
    // calculate (integration) tests
    // =========================================================================

    #[test]
    fn calculate_reference_example() {
        let items = sample_items();

        let totals = InvoiceCalculator::new(&items).calculate(dec!(10));

        assert_eq!(totals.subtotal, dec!(200));
        assert_eq!(totals.discount_amount, dec!(20));
        assert_eq!(totals.tax, dec!(18));
        assert_eq!(totals.total, dec!(198));
    }

    #[test]
    fn calculate_without_discount_adds_ten_percent() {
        let items = sample_items();

        let totals = InvoiceCalculator::new(&items).calculate(Decimal::ZERO);

        assert_eq!(totals.discount_amount, Decimal::ZERO);
        assert_eq!(totals.total, totals.subtotal * dec!(1.10));
        assert_eq!(totals.total, dec!(220));
    }

    #[test]
    fn calculate_empty_invoice_is_all_zero() {
        let totals = InvoiceCalculator::new(&[]).calculate(dec!(10));

        assert_eq!(totals, InvoiceTotals::default());
    }

    #[test]
    fn calculate_clamps_excessive_discount() {
        let items = sample_items();

        let totals = InvoiceCalculator::new(&items).calculate(dec!(140));

        assert_eq!(totals.discount_amount, dec!(200));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn calculate_clamps_negative_discount() {
        let items = sample_items();

        let totals = InvoiceCalculator::new(&items).calculate(dec!(-10));

        assert_eq!(totals, InvoiceCalculator::new(&items).calculate(Decimal::ZERO));
    }

    #[test]
    fn total_never_below_discounted_subtotal() {
        let items = vec![
            InvoiceItem::new(1, "a", dec!(3), dec!(7.77)),
            InvoiceItem::new(2, "b", dec!(0), dec!(1000)),
            InvoiceItem::new(3, "c", dec!(1.5), dec!(0.333)),
        ];

        for discount in [dec!(0), dec!(0.1), dec!(33.3), dec!(99.9), dec!(100)] {
            let totals = InvoiceCalculator::new(&items).calculate(discount);
            assert!(
                totals.total >= totals.subtotal - totals.discount_amount,
                "discount {discount}: {totals:?}"
            );
        }
    }

    #[test]
    fn calculate_keeps_full_precision_until_rounded() {
        let items = vec![InvoiceItem::new(1, "Third", dec!(1), dec!(33.335))];

        let totals = InvoiceCalculator::new(&items).calculate(Decimal::ZERO);

        assert_eq!(totals.tax, dec!(3.3335));
        assert_eq!(totals.total, dec!(36.6685));
        assert_eq!(totals.rounded().tax, dec!(3.33));
        assert_eq!(totals.rounded().total, dec!(36.67));
    }
}
