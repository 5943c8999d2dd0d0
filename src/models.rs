//! Data model for the SharedSpoon platform.
//!
//! Serde renames follow the platform wire format exactly (`foodName`,
//! `expiredDate`, `_id`, ...), so these types round-trip against the REST
//! API without translation layers. Expiry is canonically a calendar date
//! with no time component.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lifecycle status of a listing.
///
/// Starts at `available` and moves to `requested` once a pickup request is
/// accepted. One-way from the client's point of view; only the server can
/// take a listing back to `available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Requested,
}

/// Donor details captured when the listing was created.
///
/// A snapshot, not a live reference: later edits to the donor's profile do
/// not update existing listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorSnapshot {
    #[serde(rename = "donatorName")]
    pub name: String,
    #[serde(rename = "donatorEmail")]
    pub email: String,
    #[serde(rename = "donatorImage")]
    pub image_url: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
}

/// A single donor-submitted food item available for request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodListing {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "foodName")]
    pub name: String,
    #[serde(rename = "foodImage")]
    pub image_url: String,
    #[serde(rename = "foodQuantity")]
    pub quantity: u32,
    #[serde(rename = "pickupLocation")]
    pub pickup_location: String,
    #[serde(rename = "expiredDate")]
    pub expiry_date: NaiveDate,
    #[serde(rename = "additionalNotes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "isUrgent", default)]
    pub is_urgent: bool,
    #[serde(rename = "foodStatus")]
    pub status: ListingStatus,
    #[serde(flatten)]
    pub donator: DonorSnapshot,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Donor-supplied fields for a new listing.
///
/// The donor snapshot and initial status are filled in by the client from
/// the current session at submission time.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub pickup_location: String,
    pub expiry_date: NaiveDate,
    pub notes: Option<String>,
    pub is_urgent: bool,
}

impl NewListing {
    /// Client-side checks applied before any network call.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("food name is required"));
        }
        if self.image_url.trim().is_empty() {
            return Err(Error::validation("food image is required"));
        }
        if self.pickup_location.trim().is_empty() {
            return Err(Error::validation("pickup location is required"));
        }
        if self.quantity < 1 {
            return Err(Error::validation("quantity must be at least 1"));
        }
        if self.expiry_date < today {
            return Err(Error::validation("expiry date must not be in the past"));
        }
        Ok(())
    }
}

/// Donor-editable fields for an existing listing.
#[derive(Debug, Clone)]
pub struct ListingUpdate {
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub pickup_location: String,
    pub expiry_date: NaiveDate,
    pub notes: Option<String>,
    pub is_urgent: bool,
    pub status: ListingStatus,
}

impl ListingUpdate {
    /// Required-field checks; expiry is not re-validated against today so a
    /// donor can still edit a listing that has already lapsed.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("food name is required"));
        }
        if self.pickup_location.trim().is_empty() {
            return Err(Error::validation("pickup location is required"));
        }
        if self.quantity < 1 {
            return Err(Error::validation("quantity must be at least 1"));
        }
        Ok(())
    }
}

/// A requester's claim of interest in a specific listing.
///
/// Snapshot of the listing plus requester identity, created at submission
/// time and immutable afterwards from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRequest {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "foodId")]
    pub listing_id: String,
    #[serde(rename = "foodName")]
    pub listing_name: String,
    #[serde(rename = "foodImage")]
    pub listing_image: String,
    #[serde(rename = "foodDonatorName")]
    pub donator_name: String,
    #[serde(rename = "foodDonatorEmail")]
    pub donator_email: String,
    #[serde(rename = "requesterName")]
    pub requester_name: String,
    #[serde(rename = "requesterEmail")]
    pub requester_email: String,
    #[serde(rename = "requestDate")]
    pub request_date: DateTime<Utc>,
    #[serde(rename = "pickupLocation")]
    pub pickup_location: String,
    #[serde(rename = "expiredDate")]
    pub expiry_date: NaiveDate,
    #[serde(rename = "additionalNotes", default)]
    pub notes: Option<String>,
    #[serde(rename = "originalFoodNotes", default)]
    pub original_notes: Option<String>,
    #[serde(rename = "foodStatus")]
    pub status: ListingStatus,
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl CurrentUser {
    /// Display name with the platform's anonymous fallback.
    pub fn name_or_anonymous(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Anonymous")
    }
}
