use crate::models::{CarListing, PriceInfo, RawAttribute, RawListing};
use std::collections::HashMap;

pub const NEGOTIABLE_PRICE: &str = "Bieden / Negotiable";
pub const MISSING_VALUE: &str = "N/A";
pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const TITLE_DISPLAY_WIDTH: usize = 48;

const FUEL_KEY: &str = "fuel";
const TRANSMISSION_KEY: &str = "transmission";

/// Key/value view over a listing's attributes. Later entries win on duplicate keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    values: HashMap<String, String>,
}

impl AttributeMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or_missing(&self, key: &str) -> &str {
        self.get(key).unwrap_or(MISSING_VALUE)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> std::ops::Index<&'a str> for AttributeMap {
    type Output = str;

    fn index(&self, key: &'a str) -> &Self::Output {
        self.get_or_missing(key)
    }
}

pub fn extract_attributes(attributes: &[RawAttribute]) -> AttributeMap {
    let mut values = HashMap::with_capacity(attributes.len());

    for attr in attributes {
        let Some(key) = attr.key.as_ref() else {
            continue;
        };
        let value = attr.value_text().unwrap_or_else(|| MISSING_VALUE.to_string());
        values.insert(key.clone(), value);
    }

    AttributeMap { values }
}

/// Renders cents as euros, e.g. `1234567` -> `€12,345.67`.
pub fn format_price(price_info: Option<&PriceInfo>) -> String {
    match price_info.and_then(|p| p.price_cents) {
        Some(cents) if cents != 0 => format_cents(cents),
        _ => NEGOTIABLE_PRICE.to_string(),
    }
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("€{}{}.{:02}", sign, group_thousands(abs / 100), abs % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Cuts a title to the console column width. CSV output keeps the full title.
pub fn truncate_title(title: &str) -> String {
    title.chars().take(TITLE_DISPLAY_WIDTH).collect()
}

pub fn normalize_listing(listing: &RawListing) -> CarListing {
    let title = listing
        .title
        .clone()
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let price = format_price(listing.price_info.as_ref());
    let attrs = extract_attributes(&listing.attributes);

    CarListing {
        title,
        price,
        fuel: attrs.get_or_missing(FUEL_KEY).to_string(),
        transmission: attrs.get_or_missing(TRANSMISSION_KEY).to_string(),
    }
}
