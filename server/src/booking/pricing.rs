use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::EventCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl Quote {
    pub fn is_free(&self) -> bool {
        self.total.is_zero()
    }
}

/// Bulk discount rate: 15% for five tickets, 10% for three, nothing otherwise.
pub fn discount_rate(quantity: u32) -> Decimal {
    match quantity {
        5 => Decimal::new(15, 2),
        3 => Decimal::new(10, 2),
        _ => Decimal::ZERO,
    }
}

pub fn quote(unit_price: Decimal, quantity: u32) -> Quote {
    let subtotal = unit_price * Decimal::from(quantity);
    let discount = (subtotal * discount_rate(quantity)).round_dp(2);
    Quote {
        unit_price,
        quantity,
        subtotal,
        discount,
        total: subtotal - discount,
    }
}

/// Prices a booking from the catalog. `None` if the event is unknown.
pub fn quote_event(catalog: &EventCatalog, event: &str, quantity: u32) -> Option<Quote> {
    catalog
        .unit_price(event)
        .map(|unit_price| quote(unit_price, quantity))
}
