//! # Stagepass Gateway
//!
//! Client side of the stagepass API gateway, the system of record for accounts,
//! performances, bookings, payments and reviews.
//!
//! ## Example
//!
//! ```no_run
//! use stagepass_gateway::{BearerToken, CredentialSlot, Credentials, Gateway, HttpGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = CredentialSlot::new();
//!     let gateway = HttpGateway::new("https://apigateway-iota.vercel.app", credentials.clone());
//!
//!     if let Some(token) = BearerToken::new(std::env::var("STAGEPASS_TOKEN")?) {
//!         credentials.install(Credentials::from_token(token));
//!     }
//!
//!     for performance in gateway.list_performances().await? {
//!         println!("{} at {}", performance.title, performance.venue);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`types`]: wire models in the gateway's camelCase JSON
//! - [`envelope`]: the one place `{ success, data, message, error }` envelopes are peeled
//! - [`claims`]: advisory identity read from a token payload
//! - [`Gateway`]: the contract features depend on
//! - [`HttpGateway`]: the reqwest transport

pub mod claims;
pub mod client;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod types;

// Re-export main types for convenience
pub use claims::user_id_from_token;
pub use client::{HttpGateway, USER_ID_HEADER};
pub use credentials::{BearerToken, CredentialSlot, Credentials};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{Gateway, GatewayFuture};
pub use types::{
    AuthGrant, Booking, BookingId, BookingReceipt, BookingStatus, CancelReceipt,
    CreateBookingRequest, CreateReviewRequest, LoginRequest, Money, PaymentRequest,
    PaymentResponse, Performance, PerformanceCategory, PerformanceId, Review, ReviewId,
    ServerTimestamp, SignupReceipt, SignupRequest, UpdateReviewRequest,
};
