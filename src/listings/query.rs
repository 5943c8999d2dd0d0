//! The listing query pipeline.
//!
//! Pure derivation of the visible, ordered subset of listings from the full
//! in-memory collection plus the user's filter/sort criteria. No I/O and no
//! mutation of the source collection, so it is safe to recompute on every
//! settled search value or toggle flip. The search term fed in here should
//! be the debounced value (see [`crate::debounce`]), not the raw keystrokes.

use crate::models::{FoodListing, ListingStatus};

/// Sort key applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Descending `createdAt`
    #[default]
    Newest,
    /// Urgent items first; ascending expiry within each group
    Urgent,
    /// Descending quantity
    Quantity,
    /// Ascending expiry
    ExpiryAsc,
}

/// Filter and sort criteria for the listing view.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Case-insensitive substring matched against the listing name or the
    /// donor name. Empty matches everything.
    pub search_term: String,
    /// Keep only urgent listings.
    pub show_urgent_only: bool,
    /// Keep only listings with exactly this status. `None` keeps all.
    pub status: Option<ListingStatus>,
    pub sort_by: SortKey,
}

impl Default for QueryConfig {
    /// The listing page default, which "clear filters" also restores: no
    /// search, urgent off, available items only, newest first.
    fn default() -> Self {
        Self {
            search_term: String::new(),
            show_urgent_only: false,
            status: Some(ListingStatus::Available),
            sort_by: SortKey::Newest,
        }
    }
}

impl QueryConfig {
    /// Run the pipeline over a borrowed collection.
    ///
    /// Returns a fresh, ordered `Vec`; the input order (server response
    /// order) and contents are left untouched. An empty result is a valid
    /// outcome, distinct from "still loading" and "fetch failed", which are
    /// represented by [`crate::listings::LoadState`] around the input.
    pub fn apply(&self, listings: &[FoodListing]) -> Vec<FoodListing> {
        let needle = self.search_term.trim().to_lowercase();

        let mut out: Vec<FoodListing> = listings
            .iter()
            .filter(|listing| {
                needle.is_empty()
                    || listing.name.to_lowercase().contains(&needle)
                    || listing.donator.name.to_lowercase().contains(&needle)
            })
            .filter(|listing| !self.show_urgent_only || listing.is_urgent)
            .filter(|listing| self.status.map_or(true, |status| listing.status == status))
            .cloned()
            .collect();

        match self.sort_by {
            SortKey::Newest => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::Urgent => out.sort_by_key(|l| (!l.is_urgent, l.expiry_date)),
            SortKey::Quantity => out.sort_by(|a, b| b.quantity.cmp(&a.quantity)),
            SortKey::ExpiryAsc => out.sort_by_key(|l| l.expiry_date),
        }

        out
    }
}
