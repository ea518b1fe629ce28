use serde::Deserialize;

use super::domain::{Listing, ListingStatus, PropertyType};

/// Active filter constraints. Absent fields mean "no constraint"; the
/// UI-facing sentinels ("all", empty string) are decoded once at the
/// boundary by [`FilterForm::criteria`] and never compared here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search_text: String,
    pub property_type: Option<PropertyType>,
    pub status: Option<ListingStatus>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_bedrooms: Option<u32>,
}

impl FilterCriteria {
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Reset every clause; filtering afterwards returns the full catalog
    /// in original order.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_unconstrained(&self) -> bool {
        self == &Self::default()
    }

    /// Logical AND of the six clauses; each toggles off when absent.
    pub fn matches(&self, listing: &Listing) -> bool {
        let record = &listing.draft;

        let matches_search = self.search_text.is_empty() || {
            let needle = self.search_text.to_lowercase();
            record.title.to_lowercase().contains(&needle)
                || record.location.to_lowercase().contains(&needle)
        };

        let matches_type = self
            .property_type
            .map_or(true, |wanted| record.property_type == wanted);
        let matches_status = self.status.map_or(true, |wanted| record.status == wanted);
        let matches_min_price = self.min_price.map_or(true, |floor| record.price >= floor);
        let matches_max_price = self.max_price.map_or(true, |ceiling| record.price <= ceiling);
        // Threshold, not exact match: "3" means three or more bedrooms.
        let matches_bedrooms = self
            .min_bedrooms
            .map_or(true, |floor| record.bedrooms >= floor);

        matches_search
            && matches_type
            && matches_status
            && matches_min_price
            && matches_max_price
            && matches_bedrooms
    }
}

/// Pure, order-preserving filter: the result is a subsequence of
/// `listings` in their original order. Cheap enough to recompute on
/// every keystroke; debouncing is the caller's concern.
pub fn filter_listings<'a>(listings: &'a [Listing], criteria: &FilterCriteria) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| criteria.matches(listing))
        .collect()
}

/// Raw filter inputs as the UI submits them. "all" and the empty string
/// mean "no constraint"; non-numeric text in a numeric field is treated
/// as no constraint rather than failing the whole query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub search: String,
    #[serde(default, rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub min_price: String,
    #[serde(default)]
    pub max_price: String,
    #[serde(default)]
    pub bedrooms: String,
}

impl FilterForm {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search_text: self.search.trim().to_string(),
            property_type: decode_sentinel(&self.property_type)
                .and_then(|raw| PropertyType::parse(raw).ok()),
            status: decode_sentinel(&self.status).and_then(|raw| ListingStatus::parse(raw).ok()),
            min_price: decode_sentinel(&self.min_price).and_then(parse_lenient),
            max_price: decode_sentinel(&self.max_price).and_then(parse_lenient),
            min_bedrooms: decode_sentinel(&self.bedrooms).and_then(parse_lenient),
        }
    }
}

fn decode_sentinel(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_lenient<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}
