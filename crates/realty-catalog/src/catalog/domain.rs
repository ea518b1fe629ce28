use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque listing identifier assigned by the record store at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Penthouse,
    Studio,
    Commercial,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::House => "House",
            Self::Villa => "Villa",
            Self::Penthouse => "Penthouse",
            Self::Studio => "Studio",
            Self::Commercial => "Commercial",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, UnknownVariant> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "apartment" => Ok(Self::Apartment),
            "house" => Ok(Self::House),
            "villa" => Ok(Self::Villa),
            "penthouse" => Ok(Self::Penthouse),
            "studio" => Ok(Self::Studio),
            "commercial" => Ok(Self::Commercial),
            _ => Err(UnknownVariant {
                kind: "property type",
                value: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Sale,
    Rent,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sale => "For Sale",
            Self::Rent => "For Rent",
        }
    }

    /// Accepts both the stored form ("sale") and the display form
    /// ("For Sale") since historical records carry either.
    pub fn parse(raw: &str) -> Result<Self, UnknownVariant> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sale" | "for sale" => Ok(Self::Sale),
            "rent" | "for rent" => Ok(Self::Rent),
            _ => Err(UnknownVariant {
                kind: "listing status",
                value: raw.to_string(),
            }),
        }
    }
}

/// Raised when free text does not name a known enum variant.
#[derive(Debug)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Contact card embedded in every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// 0-5 by convention; not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

/// Everything a client may set on a listing. The record store owns the
/// identifier and creation timestamp, so drafts never carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: u64,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: u32,
    #[serde(
        rename = "yearbuilt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub year_built: Option<u32>,
    pub features: Vec<String>,
    /// Legacy convenience field; equals `images[0]` when images exist.
    pub image: String,
    pub images: Vec<String>,
    pub agent: Agent,
}

/// A persisted catalog record: a draft plus the server-managed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub draft: ListingDraft,
}

impl Listing {
    pub fn primary_image(&self) -> Option<&str> {
        self.draft.images.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_parse_is_case_insensitive() {
        assert_eq!(
            PropertyType::parse(" Penthouse ").expect("parses"),
            PropertyType::Penthouse
        );
        assert!(PropertyType::parse("castle").is_err());
    }

    #[test]
    fn status_accepts_display_form() {
        assert_eq!(
            ListingStatus::parse("For Sale").expect("parses"),
            ListingStatus::Sale
        );
        assert_eq!(
            ListingStatus::parse("rent").expect("parses"),
            ListingStatus::Rent
        );
    }

    #[test]
    fn listing_serializes_with_flattened_draft() {
        let listing = Listing {
            id: ListingId("lst-000001".to_string()),
            created_at: None,
            draft: ListingDraft {
                title: "Lekki duplex".to_string(),
                description: String::new(),
                location: "Lagos".to_string(),
                price: 40_000_000,
                property_type: PropertyType::House,
                status: ListingStatus::Sale,
                bedrooms: 3,
                bathrooms: 2,
                area: 2_400,
                year_built: Some(2019),
                features: vec!["garage".to_string()],
                image: "https://cdn.example/one.jpg".to_string(),
                images: vec!["https://cdn.example/one.jpg".to_string()],
                agent: Agent {
                    name: "A. Ramos".to_string(),
                    phone: "+234 800 123 4567".to_string(),
                    email: "agent@ramosrealty.ng".to_string(),
                    rating: Some(4.5),
                },
            },
        };

        let value = serde_json::to_value(&listing).expect("serializes");
        assert_eq!(value["type"], "house");
        assert_eq!(value["status"], "sale");
        assert_eq!(value["yearbuilt"], 2019);
        assert_eq!(value["title"], "Lekki duplex");
        assert!(value.get("created_at").is_none());
    }
}
