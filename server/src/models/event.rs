use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Authoritative unit prices, keyed by event name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCatalog {
    prices: BTreeMap<String, Decimal>,
}

impl EventCatalog {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        Self {
            prices: entries
                .into_iter()
                .map(|(name, price)| (name.into(), price))
                .collect(),
        }
    }

    /// Parses `Name=price,Other=price`. Names may contain spaces and dashes.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut prices = BTreeMap::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, price) = entry
                .rsplit_once('=')
                .ok_or_else(|| format!("expected Name=price, got '{}'", entry))?;
            let price: Decimal = price
                .trim()
                .parse()
                .map_err(|e| format!("invalid price for '{}': {}", name.trim(), e))?;
            if price.is_sign_negative() {
                return Err(format!("negative price for '{}'", name.trim()));
            }
            prices.insert(name.trim().to_string(), price);
        }
        if prices.is_empty() {
            return Err("no events configured".to_string());
        }
        Ok(Self { prices })
    }

    pub fn unit_price(&self, event: &str) -> Option<Decimal> {
        self.prices.get(event).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::new([
            ("InspireX", Decimal::from(500)),
            ("Aarambh", Decimal::from(250)),
            ("Udaan", Decimal::from(150)),
            ("SAHARA - Donation Drive", Decimal::ZERO),
            ("Pravaah", Decimal::ZERO),
        ])
    }
}
