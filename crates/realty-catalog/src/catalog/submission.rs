use serde::Deserialize;

use super::domain::{Agent, Listing, ListingDraft, ListingStatus, PropertyType, UnknownVariant};
use super::uploads::StoredAsset;

/// Raw submission fields exactly as the listing form posts them. All text;
/// coercion and validation happen in [`assemble`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub bedrooms: String,
    #[serde(default)]
    pub bathrooms: String,
    #[serde(default)]
    pub area: String,
    #[serde(default, rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub year_built: String,
    #[serde(default)]
    pub features: String,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub agent_phone: String,
    #[serde(default)]
    pub agent_email: String,
    #[serde(default)]
    pub agent_rating: String,
}

/// Partial re-submission for the edit flow: only the supplied fields are
/// re-validated and merged over the stored record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub area: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub year_built: Option<String>,
    pub features: Option<String>,
    pub agent_name: Option<String>,
    pub agent_phone: Option<String>,
    pub agent_email: Option<String>,
    pub agent_rating: Option<String>,
}

/// A malformed field blocks the submission and names itself; nothing is
/// silently coerced to zero.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("field '{field}' is required")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field '{field}' must be a positive number, got '{value}'")]
    NotPositive { field: &'static str, value: String },
    #[error("field '{field}' must be a decimal number, got '{value}'")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("field '{field}': {source}")]
    UnknownValue {
        field: &'static str,
        source: UnknownVariant,
    },
}

/// Builds a normalized draft from raw form fields plus the upload
/// pipeline's output. Never invents server-managed fields; the record
/// store assigns those at insert time.
pub fn assemble(form: &ListingForm, uploads: &[StoredAsset]) -> Result<ListingDraft, ValidationError> {
    let title = required_text("title", &form.title)?;
    let location = required_text("location", &form.location)?;

    let property_type = PropertyType::parse(&form.property_type)
        .map_err(|source| unknown_value("type", &form.property_type, source))?;
    let status = ListingStatus::parse(&form.status)
        .map_err(|source| unknown_value("status", &form.status, source))?;

    let price = parse_required_u64("price", &form.price)?;
    let bedrooms = parse_count("bedrooms", &form.bedrooms)?;
    let bathrooms = parse_count("bathrooms", &form.bathrooms)?;
    let area = parse_count("area", &form.area)?;
    let year_built = parse_year_built(&form.year_built)?;
    let rating = parse_optional_f32("agent_rating", &form.agent_rating)?;

    let images: Vec<String> = uploads
        .iter()
        .map(|asset| asset.public_url.clone())
        .collect();
    let image = images.first().cloned().unwrap_or_default();

    Ok(ListingDraft {
        title,
        description: form.description.trim().to_string(),
        location,
        price,
        property_type,
        status,
        bedrooms,
        bathrooms,
        area,
        year_built,
        features: split_features(&form.features),
        image,
        images,
        agent: Agent {
            name: form.agent_name.trim().to_string(),
            phone: form.agent_phone.trim().to_string(),
            email: form.agent_email.trim().to_string(),
            rating,
        },
    })
}

/// Edit-flow counterpart of [`assemble`]: patch fields are validated with
/// the same rules and merged over `existing`. A fresh upload batch, when
/// provided, replaces the image sequence; otherwise images are untouched.
pub fn merge(
    existing: &Listing,
    patch: &ListingPatch,
    uploads: Option<&[StoredAsset]>,
) -> Result<ListingDraft, ValidationError> {
    let mut draft = existing.draft.clone();

    if let Some(title) = &patch.title {
        draft.title = required_text("title", title)?;
    }
    if let Some(description) = &patch.description {
        draft.description = description.trim().to_string();
    }
    if let Some(location) = &patch.location {
        draft.location = required_text("location", location)?;
    }
    if let Some(price) = &patch.price {
        draft.price = parse_required_u64("price", price)?;
    }
    if let Some(bedrooms) = &patch.bedrooms {
        draft.bedrooms = parse_count("bedrooms", bedrooms)?;
    }
    if let Some(bathrooms) = &patch.bathrooms {
        draft.bathrooms = parse_count("bathrooms", bathrooms)?;
    }
    if let Some(area) = &patch.area {
        draft.area = parse_count("area", area)?;
    }
    if let Some(property_type) = &patch.property_type {
        draft.property_type = PropertyType::parse(property_type)
            .map_err(|source| unknown_value("type", property_type, source))?;
    }
    if let Some(status) = &patch.status {
        draft.status = ListingStatus::parse(status)
            .map_err(|source| unknown_value("status", status, source))?;
    }
    if let Some(year_built) = &patch.year_built {
        draft.year_built = parse_year_built(year_built)?;
    }
    if let Some(features) = &patch.features {
        draft.features = split_features(features);
    }
    if let Some(name) = &patch.agent_name {
        draft.agent.name = name.trim().to_string();
    }
    if let Some(phone) = &patch.agent_phone {
        draft.agent.phone = phone.trim().to_string();
    }
    if let Some(email) = &patch.agent_email {
        draft.agent.email = email.trim().to_string();
    }
    if let Some(rating) = &patch.agent_rating {
        draft.agent.rating = parse_optional_f32("agent_rating", rating)?;
    }

    if let Some(uploads) = uploads {
        draft.images = uploads
            .iter()
            .map(|asset| asset.public_url.clone())
            .collect();
        draft.image = draft.images.first().cloned().unwrap_or_default();
    }

    Ok(draft)
}

/// Splits the comma-separated feature text into trimmed, ordered labels.
/// Empty input yields an empty sequence, never one empty label; duplicate
/// labels survive since display order is significant.
pub fn split_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn required_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

fn unknown_value(field: &'static str, raw: &str, source: UnknownVariant) -> ValidationError {
    if raw.trim().is_empty() {
        ValidationError::MissingField { field }
    } else {
        ValidationError::UnknownValue { field, source }
    }
}

fn parse_required_u64(field: &'static str, raw: &str) -> Result<u64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    trimmed.parse().map_err(|_| ValidationError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Counts (bedrooms, bathrooms, area) may be omitted, which means zero;
/// anything present must parse.
fn parse_count(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| ValidationError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_year_built(raw: &str) -> Result<Option<u32>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let year: u32 = trimmed.parse().map_err(|_| ValidationError::InvalidNumber {
        field: "year_built",
        value: raw.to_string(),
    })?;
    if year == 0 {
        return Err(ValidationError::NotPositive {
            field: "year_built",
            value: raw.to_string(),
        });
    }
    Ok(Some(year))
}

fn parse_optional_f32(field: &'static str, raw: &str) -> Result<Option<f32>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ValidationError::InvalidDecimal {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ListingForm {
        ListingForm {
            title: "Lekki duplex".to_string(),
            description: "Bright and airy.".to_string(),
            location: "Lagos".to_string(),
            price: "40000000".to_string(),
            bedrooms: "3".to_string(),
            bathrooms: "2".to_string(),
            area: "2400".to_string(),
            property_type: "house".to_string(),
            status: "For Sale".to_string(),
            year_built: "2019".to_string(),
            features: " garage ,pool, garage ".to_string(),
            agent_name: "A. Ramos".to_string(),
            agent_phone: "+234 800 123 4567".to_string(),
            agent_email: "agent@ramosrealty.ng".to_string(),
            agent_rating: "4.5".to_string(),
        }
    }

    fn uploads() -> Vec<StoredAsset> {
        vec![
            StoredAsset {
                source_file_name: "front.jpg".to_string(),
                public_url: "https://cdn.example/front.jpg".to_string(),
            },
            StoredAsset {
                source_file_name: "yard.jpg".to_string(),
                public_url: "https://cdn.example/yard.jpg".to_string(),
            },
        ]
    }

    #[test]
    fn assembles_a_complete_draft() {
        let draft = assemble(&valid_form(), &uploads()).expect("valid form assembles");

        assert_eq!(draft.price, 40_000_000);
        assert_eq!(draft.property_type, PropertyType::House);
        assert_eq!(draft.status, ListingStatus::Sale);
        assert_eq!(draft.year_built, Some(2019));
        // Trimmed, ordered, duplicates kept.
        assert_eq!(draft.features, vec!["garage", "pool", "garage"]);
        assert_eq!(draft.image, "https://cdn.example/front.jpg");
        assert_eq!(draft.images.len(), 2);
        assert_eq!(draft.agent.rating, Some(4.5));
    }

    #[test]
    fn primary_image_tracks_the_first_upload() {
        let draft = assemble(&valid_form(), &uploads()).expect("assembles");
        assert_eq!(draft.image, draft.images[0]);

        let bare = assemble(&valid_form(), &[]).expect("assembles without images");
        assert_eq!(bare.image, "");
        assert!(bare.images.is_empty());
    }

    #[test]
    fn malformed_price_blocks_the_submission() {
        let mut form = valid_form();
        form.price = "forty million".to_string();
        let err = assemble(&form, &[]).expect_err("price must parse");
        assert!(matches!(
            err,
            ValidationError::InvalidNumber { field: "price", .. }
        ));
    }

    #[test]
    fn empty_counts_default_to_zero_but_garbage_fails() {
        let mut form = valid_form();
        form.bedrooms = String::new();
        form.bathrooms = "  ".to_string();
        let draft = assemble(&form, &[]).expect("empty counts allowed");
        assert_eq!(draft.bedrooms, 0);
        assert_eq!(draft.bathrooms, 0);

        form.area = "big".to_string();
        let err = assemble(&form, &[]).expect_err("area must parse");
        assert!(matches!(
            err,
            ValidationError::InvalidNumber { field: "area", .. }
        ));
    }

    #[test]
    fn empty_features_yield_an_empty_sequence() {
        assert!(split_features("").is_empty());
        assert!(split_features("  ,  , ").is_empty());
        assert_eq!(split_features("pool"), vec!["pool"]);
    }

    #[test]
    fn absent_rating_is_explicitly_unset() {
        let mut form = valid_form();
        form.agent_rating = String::new();
        let draft = assemble(&form, &[]).expect("assembles");
        assert_eq!(draft.agent.rating, None);
    }

    #[test]
    fn zero_year_built_is_rejected() {
        let mut form = valid_form();
        form.year_built = "0".to_string();
        let err = assemble(&form, &[]).expect_err("year 0 rejected");
        assert!(matches!(err, ValidationError::NotPositive { .. }));
    }

    #[test]
    fn unknown_type_names_the_field() {
        let mut form = valid_form();
        form.property_type = "castle".to_string();
        let err = assemble(&form, &[]).expect_err("unknown type rejected");
        assert!(err.to_string().contains("type"));
        assert!(err.to_string().contains("castle"));
    }

    #[test]
    fn merge_revalidates_only_supplied_fields() {
        let existing = Listing {
            id: super::super::domain::ListingId("lst-000001".to_string()),
            created_at: None,
            draft: assemble(&valid_form(), &uploads()).expect("assembles"),
        };

        let patch = ListingPatch {
            price: Some("45000000".to_string()),
            features: Some("pool".to_string()),
            ..ListingPatch::default()
        };
        let merged = merge(&existing, &patch, None).expect("patch merges");
        assert_eq!(merged.price, 45_000_000);
        assert_eq!(merged.features, vec!["pool"]);
        // Untouched fields carry over, including images.
        assert_eq!(merged.title, "Lekki duplex");
        assert_eq!(merged.images, existing.draft.images);

        let bad = ListingPatch {
            price: Some("lots".to_string()),
            ..ListingPatch::default()
        };
        assert!(merge(&existing, &bad, None).is_err());
    }

    #[test]
    fn merge_replaces_images_only_with_a_new_batch() {
        let existing = Listing {
            id: super::super::domain::ListingId("lst-000001".to_string()),
            created_at: None,
            draft: assemble(&valid_form(), &uploads()).expect("assembles"),
        };

        let fresh = vec![StoredAsset {
            source_file_name: "new.jpg".to_string(),
            public_url: "https://cdn.example/new.jpg".to_string(),
        }];
        let merged =
            merge(&existing, &ListingPatch::default(), Some(&fresh)).expect("merges");
        assert_eq!(merged.images, vec!["https://cdn.example/new.jpg"]);
        assert_eq!(merged.image, "https://cdn.example/new.jpg");
    }
}
