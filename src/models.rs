use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reads a JSON array that may also be `null` or missing.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level body of the search API. Only `listings` is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub listings: Vec<RawListing>,
}

/// One listing as delivered by the search API, kept close to the wire shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "priceInfo", default)]
    pub price_info: Option<PriceInfo>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Vec<RawAttribute>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceInfo {
    #[serde(rename = "priceCents", default)]
    pub price_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttribute {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl RawAttribute {
    /// Attribute values are mostly strings, but numbers and booleans show up too.
    pub fn value_text(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A flattened car listing, one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarListing {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Fuel")]
    pub fuel: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
}

/// Listings collected over a run, in page order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingBatch {
    listings: Vec<CarListing>,
}

impl ListingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listing: CarListing) {
        self.listings.push(listing);
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CarListing> {
        self.listings.iter()
    }

    pub fn as_slice(&self) -> &[CarListing] {
        &self.listings
    }
}

impl Extend<CarListing> for ListingBatch {
    fn extend<I: IntoIterator<Item = CarListing>>(&mut self, iter: I) {
        self.listings.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ListingBatch {
    type Item = &'a CarListing;
    type IntoIter = std::slice::Iter<'a, CarListing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}
