//! HTTP transport tests against a fake gateway

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use stagepass_gateway::{
    BearerToken, BookingId, BookingStatus, CreateBookingRequest, CreateReviewRequest,
    CredentialSlot, Credentials, Gateway, GatewayError, HttpGateway, LoginRequest, Money,
    PaymentRequest, PerformanceCategory, PerformanceId, ReviewId, SignupRequest,
    UpdateReviewRequest,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token_for(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub }).to_string());
    format!("{header}.{payload}.sig")
}

fn signed_in(server: &MockServer, sub: &str) -> (HttpGateway, CredentialSlot) {
    let slot = CredentialSlot::new();
    slot.install(Credentials::from_token(BearerToken::new(token_for(sub)).unwrap()));
    (HttpGateway::new(server.uri(), slot.clone()), slot)
}

fn performance_json(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Hamlet",
        "description": "A prince hesitates",
        "category": "THEATER",
        "venue": "Globe",
        "price": 45000,
        "totalSeats": 100,
        "availableSeats": 42,
        "createdAt": { "_seconds": 1_700_000_000, "_nanoseconds": 0 }
    })
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn login_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "a@b.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "token": "t-1", "userId": "u-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let grant = gateway
        .login(LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(grant.token, "t-1");
    assert_eq!(grant.user_id.as_deref(), Some("u-1"));
}

#[tokio::test]
async fn login_accepts_numeric_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "t", "user_id": 42 })),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let grant = gateway
        .login(LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(grant.token, "t");
    assert_eq!(grant.user_id.as_deref(), Some("42"));
}

#[tokio::test]
async fn login_rejection_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Invalid email or password"
        })))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let error = gateway
        .login(LoginRequest {
            email: "a@b.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        error,
        GatewayError::authentication("Invalid email or password")
    );
}

#[tokio::test]
async fn login_unauthorized_without_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let error = gateway
        .login(LoginRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error, GatewayError::authentication("Login failed"));
}

#[tokio::test]
async fn signup_surfaces_gateway_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Email already in use" })),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let error = gateway
        .signup(SignupRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
            name: "a".to_string(),
        })
        .await
        .unwrap_err();

    assert!(error.is_conflict());
    assert_eq!(error.message(), "Email already in use");
}

// ============================================================================
// Headers
// ============================================================================

#[tokio::test]
async fn credentials_are_attached_to_requests() {
    let server = MockServer::start().await;
    let token = token_for("user-7");
    Mock::given(method("GET"))
        .and(path("/booking/booking/my"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .and(header("x-user-id", "user-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");
    assert!(gateway.my_bookings().await.unwrap().is_empty());
}

#[tokio::test]
async fn user_id_header_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/performances/performances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");
    let gateway = gateway.with_user_id_header(false);
    gateway.list_performances().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_some());
    assert!(requests[0].headers.get("x-user-id").is_none());
}

#[tokio::test]
async fn logout_stops_sending_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/performances/performances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (gateway, slot) = signed_in(&server, "user-7");
    slot.clear();
    gateway.list_performances().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert!(requests[0].headers.get("x-user-id").is_none());
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn performances_accept_bare_and_enveloped_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/performances/performances"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [performance_json(7)] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/performances/performances/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(performance_json(7)))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let listed = gateway.list_performances().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category, PerformanceCategory::Theater);
    assert_eq!(listed[0].price, Money::new(45_000));

    let single = gateway
        .get_performance(PerformanceId::new(7))
        .await
        .unwrap();
    assert_eq!(single, listed[0]);
}

#[tokio::test]
async fn one_malformed_performance_does_not_hide_the_catalog() {
    let server = MockServer::start().await;
    let mut fractional = performance_json(8);
    fractional["price"] = json!(49.5);
    Mock::given(method("GET"))
        .and(path("/performances/performances"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([performance_json(7), fractional])),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let listed = gateway.list_performances().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, PerformanceId::new(7));
}

#[tokio::test]
async fn unknown_performance_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/performances/performances/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Performance not found" })),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let error = gateway
        .get_performance(PerformanceId::new(99))
        .await
        .unwrap_err();
    assert!(error.is_not_found());
    assert_eq!(error.to_string(), "Performance not found");
}

// ============================================================================
// Bookings and payments
// ============================================================================

#[tokio::test]
async fn create_booking_sends_string_performance_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/booking/booking"))
        .and(body_json(json!({
            "performanceId": "7",
            "quantity": 3,
            "paymentMethod": "CREDIT_CARD"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Booking created",
            "bookingId": "BK1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");
    let receipt = gateway
        .create_booking(CreateBookingRequest {
            performance_id: "7".to_string(),
            quantity: 3,
            payment_method: "CREDIT_CARD".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(receipt.booking_id, BookingId::new("BK1"));
}

#[tokio::test]
async fn quota_exceeded_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/booking/booking"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "error": "Seat limit" })))
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");
    let error = gateway
        .create_booking(CreateBookingRequest {
            performance_id: "7".to_string(),
            quantity: 10,
            payment_method: "CREDIT_CARD".to_string(),
        })
        .await
        .unwrap_err();
    assert!(error.is_conflict());
}

#[tokio::test]
async fn my_bookings_canonicalise_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/booking/booking/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "bookingId": "BK1",
                "userId": "user-7",
                "performanceId": "7",
                "quantity": 2,
                "paymentMethod": "CREDIT_CARD",
                "status": "PENDDING",
                "totalAmount": 90000,
                "createdAt": "2025-05-01T10:00:00Z"
            },
            {
                "bookingId": 2,
                "performanceId": 8,
                "quantity": 1,
                "status": "success",
                "totalAmount": 1000.0
            }
        ])))
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");
    let bookings = gateway.my_bookings().await.unwrap();
    assert_eq!(bookings[0].status, BookingStatus::Pending);
    assert_eq!(bookings[0].performance_id, PerformanceId::new(7));
    assert_eq!(bookings[1].booking_id, BookingId::new("2"));
    assert_eq!(bookings[1].status, BookingStatus::Paid);
    assert_eq!(bookings[1].total_amount, Money::new(1000));
}

#[tokio::test]
async fn cancel_booking_sends_id_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/booking/booking/my"))
        .and(body_json(json!({ "bookingId": "BK1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Cancelled" })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");
    let receipt = gateway.cancel_booking(BookingId::new("BK1")).await.unwrap();
    assert_eq!(receipt.message.as_deref(), Some("Cancelled"));
}

#[tokio::test]
async fn payment_response_is_returned_even_when_declined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/payment/execute"))
        .and(body_json(json!({
            "bookingId": "BK1",
            "paymentMethodToken": "creditCard",
            "cardNumber": "4111111111111112",
            "cvv": "122"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Card declined",
            "finalStatus": "FAILED",
            "bookingId": "BK1"
        })))
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");
    let response = gateway
        .execute_payment(PaymentRequest {
            booking_id: BookingId::new("BK1"),
            payment_method_token: "creditCard".to_string(),
            card_number: "4111111111111112".to_string(),
            cvv: "122".to_string(),
        })
        .await
        .unwrap();
    assert!(!response.is_success());
    assert_eq!(response.message.as_deref(), Some("Card declined"));
}

// ============================================================================
// Reviews
// ============================================================================

fn review_json(id: u64, rating: u8) -> serde_json::Value {
    json!({
        "id": id,
        "performanceId": 7,
        "userId": "user-7",
        "rating": rating,
        "content": "Wonderful staging throughout"
    })
}

#[tokio::test]
async fn review_lifecycle_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/review/reviews"))
        .and(body_json(json!({
            "performanceId": 7,
            "rating": 5,
            "content": "Wonderful staging throughout"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "success": true, "data": review_json(1, 5) })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/review/reviews/performance/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [review_json(1, 5)] })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/review/reviews/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_json(1, 4)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/review/reviews/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _slot) = signed_in(&server, "user-7");

    let created = gateway
        .create_review(CreateReviewRequest {
            performance_id: PerformanceId::new(7),
            rating: 5,
            content: "Wonderful staging throughout".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, ReviewId::new(1));

    let listed = gateway
        .performance_reviews(PerformanceId::new(7))
        .await
        .unwrap();
    assert_eq!(listed, vec![created]);

    let updated = gateway
        .update_review(
            ReviewId::new(1),
            UpdateReviewRequest {
                rating: 4,
                content: "Wonderful staging throughout".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.rating, 4);

    gateway.delete_review(ReviewId::new(1)).await.unwrap();
}

#[tokio::test]
async fn my_reviews_surface_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/review/reviews/my"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(server.uri(), CredentialSlot::new());
    let error = gateway.my_reviews().await.unwrap_err();
    assert!(error.is_authentication());
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error() {
    let gateway = HttpGateway::new("http://127.0.0.1:9", CredentialSlot::new());
    let error = gateway.list_performances().await.unwrap_err();
    assert!(matches!(error, GatewayError::Gateway { status: None, .. }));
}
