//! Data-access layer for listings and pickup requests.
//!
//! All page-level fetch/mutate paths go through [`ListingsClient`] so that
//! error mapping, bearer handling, and credential-rejection cleanup live in
//! one place instead of being re-rolled per page.

pub mod query;

use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;

use crate::auth::Auth;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::models::{FoodListing, FoodRequest, ListingStatus, ListingUpdate, NewListing};

/// Render state for primary page data.
///
/// Keeps "still loading", "fetch failed", and "loaded but empty"
/// distinguishable; the query pipeline only ever runs against `Ready` data.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    /// Fold a fetch result into a render state.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => LoadState::Ready(value),
            Err(err) => LoadState::Failed(err.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// The loaded value, if any.
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Submission lifecycle for a single logical action (add, update, delete,
/// request). Gates the control so at most one mutation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    InFlight,
    Settled,
}

/// Tri-state guard around a submit control.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    phase: SubmitPhase,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// Try to start a submission. Returns `false` while one is in flight.
    pub fn begin(&mut self) -> bool {
        if self.phase == SubmitPhase::InFlight {
            return false;
        }
        self.phase = SubmitPhase::InFlight;
        true
    }

    /// Mark the in-flight submission as finished, success or failure.
    pub fn settle(&mut self) {
        self.phase = SubmitPhase::Settled;
    }

    /// Re-arm the guard, e.g. when the form is reset.
    pub fn reset(&mut self) {
        self.phase = SubmitPhase::Idle;
    }
}

/// Replace the entity with the same id in a held collection.
///
/// Used after a successful mutation: the server response is authoritative
/// for that one entity, and nothing else needs a re-fetch. Returns whether
/// a matching entity was found.
pub fn patch_listing(collection: &mut [FoodListing], updated: &FoodListing) -> bool {
    match collection.iter_mut().find(|l| l.id == updated.id) {
        Some(slot) => {
            *slot = updated.clone();
            true
        }
        None => false,
    }
}

/// Typed client for the platform's listing and request endpoints.
#[derive(Clone)]
pub struct ListingsClient {
    config: Config,
    http_client: Client,
    auth: Arc<Auth>,
}

impl ListingsClient {
    pub(crate) fn new(config: Config, http_client: Client, auth: Arc<Auth>) -> Self {
        Self {
            config,
            http_client,
            auth,
        }
    }

    /// Fetch the full listing collection. Works anonymously.
    pub async fn list(&self) -> Result<Vec<FoodListing>> {
        let url = self.config.api_url.join("api/foods")?;
        let token = self.auth.bearer_token().await?;
        let result = Fetch::get(&self.http_client, url.as_str())
            .opt_bearer_auth(token.as_deref())
            .execute()
            .await;
        self.guard_credential(result).await
    }

    /// Fetch a single listing by id. Works anonymously; a miss is
    /// [`Error::NotFound`].
    pub async fn get(&self, id: &str) -> Result<FoodListing> {
        let url = self.config.api_url.join(&format!("api/foods/{id}"))?;
        let token = self.auth.bearer_token().await?;
        let result = Fetch::get(&self.http_client, url.as_str())
            .opt_bearer_auth(token.as_deref())
            .execute()
            .await;
        self.guard_credential(result).await
    }

    /// Create a listing for the signed-in donor.
    ///
    /// Validation failures never reach the network. The donor snapshot is
    /// captured from the current session at this moment and travels with the
    /// listing from then on.
    pub async fn create(&self, new: NewListing) -> Result<FoodListing> {
        let user = self.auth.current_user().ok_or(Error::AuthRequired)?;
        new.validate(Utc::now().date_naive())?;

        let payload = serde_json::json!({
            "foodName": new.name,
            "foodImage": new.image_url,
            "foodQuantity": new.quantity,
            "pickupLocation": new.pickup_location,
            "expiredDate": new.expiry_date,
            "additionalNotes": new.notes,
            "isUrgent": new.is_urgent,
            "foodStatus": ListingStatus::Available,
            "donatorName": user.name_or_anonymous(),
            "donatorEmail": user.email,
            "donatorImage": user.photo_url,
            "userId": user.uid,
        });

        tracing::debug!(name = %new.name, "creating listing");
        let url = self.config.api_url.join("api/foods")?;
        let token = self.require_token().await?;
        let result = Fetch::post(&self.http_client, url.as_str())
            .bearer_auth(&token)
            .json(&payload)?
            .execute()
            .await;
        self.guard_credential(result).await
    }

    /// Update one of the signed-in donor's listings.
    pub async fn update(&self, id: &str, update: ListingUpdate) -> Result<FoodListing> {
        update.validate()?;

        let payload = serde_json::json!({
            "foodName": update.name,
            "foodImage": update.image_url,
            "foodQuantity": update.quantity,
            "pickupLocation": update.pickup_location,
            "expiredDate": update.expiry_date,
            "additionalNotes": update.notes,
            "isUrgent": update.is_urgent,
            "foodStatus": update.status,
        });

        let url = self.config.api_url.join(&format!("api/foods/{id}"))?;
        let token = self.require_token().await?;
        let result = Fetch::put(&self.http_client, url.as_str())
            .bearer_auth(&token)
            .json(&payload)?
            .execute()
            .await;
        self.guard_credential(result).await
    }

    /// Delete one of the signed-in donor's listings.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.config.api_url.join(&format!("api/foods/{id}"))?;
        let token = self.require_token().await?;
        let result = Fetch::delete(&self.http_client, url.as_str())
            .bearer_auth(&token)
            .execute_unit()
            .await;
        self.guard_credential(result).await
    }

    /// The signed-in donor's own listings.
    pub async fn my_listings(&self) -> Result<Vec<FoodListing>> {
        let url = self.config.api_url.join("api/my-foods")?;
        let token = self.require_token().await?;
        let result = Fetch::get(&self.http_client, url.as_str())
            .bearer_auth(&token)
            .execute()
            .await;
        self.guard_credential(result).await
    }

    /// The signed-in user's own pickup requests.
    pub async fn my_requests(&self) -> Result<Vec<FoodRequest>> {
        let url = self.config.api_url.join("api/my-food-requests")?;
        let token = self.require_token().await?;
        let result = Fetch::get(&self.http_client, url.as_str())
            .bearer_auth(&token)
            .execute()
            .await;
        self.guard_credential(result).await
    }

    /// Submit a pickup request for a listing.
    ///
    /// The payload is a snapshot of the listing plus requester identity,
    /// immutable after creation. On success the caller should mark the held
    /// listing as requested (see [`patch_listing`]); the status transition
    /// is one-way on the client.
    pub async fn submit_request(
        &self,
        listing: &FoodListing,
        notes: Option<String>,
    ) -> Result<FoodRequest> {
        let user = self.auth.current_user().ok_or(Error::AuthRequired)?;
        if listing.status != ListingStatus::Available {
            return Err(Error::validation("listing is no longer available"));
        }
        if user.email == listing.donator.email {
            return Err(Error::validation("donors cannot request their own listing"));
        }

        let request = FoodRequest {
            id: None,
            listing_id: listing.id.clone(),
            listing_name: listing.name.clone(),
            listing_image: listing.image_url.clone(),
            donator_name: listing.donator.name.clone(),
            donator_email: listing.donator.email.clone(),
            requester_name: user.name_or_anonymous().to_string(),
            requester_email: user.email.clone(),
            request_date: Utc::now(),
            pickup_location: listing.pickup_location.clone(),
            expiry_date: listing.expiry_date,
            notes,
            original_notes: listing.notes.clone(),
            status: ListingStatus::Requested,
        };

        tracing::debug!(listing = %listing.id, "submitting pickup request");
        let url = self.config.api_url.join("api/food-requests")?;
        let token = self.require_token().await?;
        let result = Fetch::post(&self.http_client, url.as_str())
            .bearer_auth(&token)
            .json(&request)?
            .execute()
            .await;
        self.guard_credential(result).await
    }

    async fn require_token(&self) -> Result<String> {
        self.auth
            .bearer_token()
            .await?
            .ok_or(Error::AuthRequired)
    }

    /// Funnel 401/403 into session teardown before handing the error back.
    async fn guard_credential<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_auth_rejection() {
                tracing::warn!("credential rejected by API");
                self.auth.credential_rejected().await;
            }
        }
        result
    }
}
