use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sharedspoon::auth::AuthState;
use sharedspoon::error::Error;
use sharedspoon::listings::patch_listing;
use sharedspoon::models::{CurrentUser, ListingStatus, ListingUpdate, NewListing};
use sharedspoon::SharedSpoon;

fn listing_body(id: &str, status: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "foodName": "Fresh apples",
        "foodImage": "https://img.example/apples.jpg",
        "foodQuantity": 4,
        "pickupLocation": "Old Market",
        "expiredDate": "2030-07-01",
        "additionalNotes": "Slightly bruised",
        "isUrgent": false,
        "foodStatus": status,
        "donatorName": "John Doe",
        "donatorEmail": "john@example.com",
        "donatorImage": "https://img.example/john.png",
        "userId": "uid-1",
        "createdAt": "2025-05-01T12:00:00Z"
    })
}

fn requester() -> CurrentUser {
    CurrentUser {
        uid: "uid-9".to_string(),
        email: "maria@example.com".to_string(),
        display_name: Some("Maria".to_string()),
        photo_url: Some("https://img.example/maria.png".to_string()),
    }
}

fn client(server: &MockServer) -> SharedSpoon {
    SharedSpoon::new(&server.uri(), &server.uri()).unwrap()
}

#[tokio::test]
async fn list_works_anonymously_and_parses_the_wire_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/foods"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([listing_body("a1", "available")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let listings = client.listings().list().await.unwrap();

    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, "a1");
    assert_eq!(listings[0].name, "Fresh apples");
    assert_eq!(listings[0].status, ListingStatus::Available);
    assert_eq!(listings[0].donator.name, "John Doe");
}

#[tokio::test]
async fn list_carries_the_bearer_token_when_signed_in() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/foods"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    let listings = client.listings().list().await.unwrap();
    assert!(listings.is_empty());
}

#[tokio::test]
async fn missing_listing_maps_to_not_found() {
    let mock_server = MockServer::start().await;
    let unknown_id = uuid::Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path(format!("/api/foods/{unknown_id}")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Food not found"})),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = client.listings().get(&unknown_id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound));
}

#[tokio::test]
async fn invalid_listing_is_rejected_before_any_network_call() {
    let mock_server = MockServer::start().await;

    // the mock asserts on drop that nothing reached the server
    Mock::given(method("POST"))
        .and(path("/api/foods"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    let stale = NewListing {
        name: "Bread".to_string(),
        image_url: "https://img.example/bread.jpg".to_string(),
        quantity: 5,
        pickup_location: "Main St".to_string(),
        expiry_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        notes: None,
        is_urgent: false,
    };

    let err = client.listings().create(stale).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn create_posts_the_donor_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/foods"))
        .and(header("Authorization", "Bearer test_token"))
        .and(body_partial_json(json!({
            "foodName": "Bread",
            "foodQuantity": 5,
            "expiredDate": "2030-07-01",
            "foodStatus": "available",
            "donatorName": "Maria",
            "donatorEmail": "maria@example.com",
            "userId": "uid-9"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(listing_body("new1", "available")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    let new = NewListing {
        name: "Bread".to_string(),
        image_url: "https://img.example/bread.jpg".to_string(),
        quantity: 5,
        pickup_location: "Main St".to_string(),
        expiry_date: NaiveDate::from_ymd_opt(2030, 7, 1).unwrap(),
        notes: Some("Sourdough".to_string()),
        is_urgent: false,
    };

    let created = client.listings().create(new).await.unwrap();
    assert_eq!(created.id, "new1");
}

#[tokio::test]
async fn create_without_a_session_needs_no_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/foods"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let new = NewListing {
        name: "Bread".to_string(),
        image_url: "https://img.example/bread.jpg".to_string(),
        quantity: 5,
        pickup_location: "Main St".to_string(),
        expiry_date: NaiveDate::from_ymd_opt(2030, 7, 1).unwrap(),
        notes: None,
        is_urgent: false,
    };

    let err = client.listings().create(new).await.unwrap_err();
    assert!(matches!(err, Error::AuthRequired));
}

#[tokio::test]
async fn update_puts_the_edited_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/foods/a1"))
        .and(header("Authorization", "Bearer test_token"))
        .and(body_partial_json(json!({
            "foodName": "Fresh apples",
            "foodQuantity": 2,
            "foodStatus": "available"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body("a1", "available")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    let update = ListingUpdate {
        name: "Fresh apples".to_string(),
        image_url: "https://img.example/apples.jpg".to_string(),
        quantity: 2,
        pickup_location: "Old Market".to_string(),
        expiry_date: NaiveDate::from_ymd_opt(2030, 7, 1).unwrap(),
        notes: None,
        is_urgent: false,
        status: ListingStatus::Available,
    };

    let updated = client.listings().update("a1", update).await.unwrap();
    assert_eq!(updated.id, "a1");
}

#[tokio::test]
async fn delete_succeeds_on_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/foods/a1"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    client.listings().delete("a1").await.unwrap();
}

#[tokio::test]
async fn credential_rejection_clears_the_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/my-foods"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "token expired"})),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("stale_token"))
        .await;

    let err = client.listings().my_listings().await.unwrap_err();
    assert!(matches!(err, Error::AuthRequired));

    // token is gone and the session stream resolved to signed-out
    assert_eq!(client.auth().bearer_token().await.unwrap(), None);
    assert_eq!(*client.auth().subscribe().borrow(), AuthState::SignedOut);
}

#[tokio::test]
async fn my_requests_parses_request_snapshots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/my-food-requests"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "r1",
            "foodId": "a1",
            "foodName": "Fresh apples",
            "foodImage": "https://img.example/apples.jpg",
            "foodDonatorName": "John Doe",
            "foodDonatorEmail": "john@example.com",
            "requesterName": "Maria",
            "requesterEmail": "maria@example.com",
            "requestDate": "2025-06-10T09:30:00Z",
            "pickupLocation": "Old Market",
            "expiredDate": "2030-07-01",
            "additionalNotes": "After 5pm works best",
            "originalFoodNotes": "Slightly bruised",
            "foodStatus": "requested"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    let requests = client.listings().my_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id.as_deref(), Some("r1"));
    assert_eq!(requests[0].listing_id, "a1");
    assert_eq!(requests[0].status, ListingStatus::Requested);
}

#[tokio::test]
async fn submit_request_posts_the_snapshot_and_patches_locally() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/food-requests"))
        .and(header("Authorization", "Bearer test_token"))
        .and(body_partial_json(json!({
            "foodId": "a1",
            "foodName": "Fresh apples",
            "foodDonatorEmail": "john@example.com",
            "requesterEmail": "maria@example.com",
            "additionalNotes": "After 5pm works best",
            "originalFoodNotes": "Slightly bruised",
            "foodStatus": "requested"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "r1",
            "foodId": "a1",
            "foodName": "Fresh apples",
            "foodImage": "https://img.example/apples.jpg",
            "foodDonatorName": "John Doe",
            "foodDonatorEmail": "john@example.com",
            "requesterName": "Maria",
            "requesterEmail": "maria@example.com",
            "requestDate": "2025-06-10T09:30:00Z",
            "pickupLocation": "Old Market",
            "expiredDate": "2030-07-01",
            "additionalNotes": "After 5pm works best",
            "originalFoodNotes": "Slightly bruised",
            "foodStatus": "requested"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    let mut collection: Vec<sharedspoon::models::FoodListing> =
        serde_json::from_value(json!([listing_body("a1", "available")])).unwrap();

    let request = client
        .listings()
        .submit_request(&collection[0], Some("After 5pm works best".to_string()))
        .await
        .unwrap();
    assert_eq!(request.id.as_deref(), Some("r1"));

    // the mutation response is authoritative for this one entity
    let mut confirmed = collection[0].clone();
    confirmed.status = ListingStatus::Requested;
    assert!(patch_listing(&mut collection, &confirmed));
    assert_eq!(collection[0].status, ListingStatus::Requested);
}

#[tokio::test]
async fn donors_cannot_request_their_own_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/food-requests"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let donor = CurrentUser {
        uid: "uid-1".to_string(),
        email: "john@example.com".to_string(),
        display_name: Some("John Doe".to_string()),
        photo_url: None,
    };
    client
        .auth()
        .set_session_for_test(Some(donor), Some("test_token"))
        .await;

    let collection: Vec<sharedspoon::models::FoodListing> =
        serde_json::from_value(json!([listing_body("a1", "available")])).unwrap();

    let err = client
        .listings()
        .submit_request(&collection[0], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn requested_listings_cannot_be_requested_again() {
    let mock_server = MockServer::start().await;

    let client = client(&mock_server);
    client
        .auth()
        .set_session_for_test(Some(requester()), Some("test_token"))
        .await;

    let collection: Vec<sharedspoon::models::FoodListing> =
        serde_json::from_value(json!([listing_body("a1", "requested")])).unwrap();

    let err = client
        .listings()
        .submit_request(&collection[0], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn server_errors_surface_the_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/foods"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = client.listings().list().await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
