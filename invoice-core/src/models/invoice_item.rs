use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One billable row on an invoice.
///
/// `quantity` and `rate` are only reachable through setters so the derived
/// [`amount`](InvoiceItem::amount) can never drift from them. Negative input
/// is clamped to zero, including when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ItemFields")]
pub struct InvoiceItem {
    /// Unique within the owning invoice.
    pub id: i64,
    pub description: String,
    quantity: Decimal,
    rate: Decimal,
}

impl InvoiceItem {
    pub fn new(
        id: i64,
        description: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            quantity: non_negative(quantity),
            rate: non_negative(rate),
        }
    }

    /// An empty row: no description, quantity 1, rate 0.
    pub fn blank(id: i64) -> Self {
        Self::new(id, String::new(), Decimal::ONE, Decimal::ZERO)
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// `quantity × rate`, at full precision.
    pub fn amount(&self) -> Decimal {
        self.quantity * self.rate
    }

    pub fn set_quantity(
        &mut self,
        quantity: Decimal,
    ) {
        self.quantity = non_negative(quantity);
    }

    pub fn set_rate(
        &mut self,
        rate: Decimal,
    ) {
        self.rate = non_negative(rate);
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

#[derive(Deserialize)]
struct ItemFields {
    id: i64,
    description: String,
    quantity: Decimal,
    rate: Decimal,
}

impl From<ItemFields> for InvoiceItem {
    fn from(fields: ItemFields) -> Self {
        Self::new(fields.id, fields.description, fields.quantity, fields.rate)
    }
}

fn non_negative(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        tracing::warn!(%value, "negative line item value clamped to zero");
        Decimal::ZERO
    } else {
        value
    }
}
