use super::domain::{Listing, ListingId};

/// In-memory listing collection, fetched once on catalog load. Insertion
/// order is the display order the filter engine preserves. Mutations only
/// happen after the record store confirms the matching create/edit/delete.
#[derive(Debug, Default)]
pub struct ListingStore {
    listings: Vec<Listing>,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, listings: Vec<Listing>) {
        self.listings = listings;
    }

    /// Appends a new listing, or replaces in place when the id already
    /// exists so a confirmed re-create cannot duplicate a row.
    pub fn add(&mut self, listing: Listing) {
        match self.position(&listing.id) {
            Some(idx) => self.listings[idx] = listing,
            None => self.listings.push(listing),
        }
    }

    /// Replaces an existing listing, keeping its position. Returns false
    /// when the id is unknown.
    pub fn replace(&mut self, listing: Listing) -> bool {
        match self.position(&listing.id) {
            Some(idx) => {
                self.listings[idx] = listing;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &ListingId) -> Option<Listing> {
        self.position(id).map(|idx| self.listings.remove(idx))
    }

    pub fn get(&self, id: &ListingId) -> Option<&Listing> {
        self.listings.iter().find(|listing| &listing.id == id)
    }

    pub fn all(&self) -> &[Listing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    fn position(&self, id: &ListingId) -> Option<usize> {
        self.listings.iter().position(|listing| &listing.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{Agent, ListingDraft, ListingStatus, PropertyType};

    fn listing(id: &str, title: &str) -> Listing {
        Listing {
            id: ListingId(id.to_string()),
            created_at: None,
            draft: ListingDraft {
                title: title.to_string(),
                description: String::new(),
                location: "Lagos".to_string(),
                price: 1_000_000,
                property_type: PropertyType::Apartment,
                status: ListingStatus::Rent,
                bedrooms: 1,
                bathrooms: 1,
                area: 600,
                year_built: None,
                features: Vec::new(),
                image: String::new(),
                images: Vec::new(),
                agent: Agent {
                    name: "Agent".to_string(),
                    phone: String::new(),
                    email: "agent@example.com".to_string(),
                    rating: None,
                },
            },
        }
    }

    #[test]
    fn add_keeps_insertion_order_and_deduplicates_by_id() {
        let mut store = ListingStore::new();
        store.add(listing("a", "first"));
        store.add(listing("b", "second"));
        store.add(listing("a", "first, revised"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0].draft.title, "first, revised");
        assert_eq!(store.all()[1].id.0, "b");
    }

    #[test]
    fn replace_preserves_position() {
        let mut store = ListingStore::new();
        store.replace_all(vec![listing("a", "one"), listing("b", "two")]);

        assert!(store.replace(listing("a", "one, edited")));
        assert_eq!(store.all()[0].draft.title, "one, edited");
        assert!(!store.replace(listing("zz", "ghost")));
    }

    #[test]
    fn remove_returns_the_evicted_listing() {
        let mut store = ListingStore::new();
        store.replace_all(vec![listing("a", "one"), listing("b", "two")]);

        let gone = store.remove(&ListingId("a".to_string())).expect("removed");
        assert_eq!(gone.id.0, "a");
        assert_eq!(store.len(), 1);
        assert!(store.remove(&ListingId("a".to_string())).is_none());
    }
}
