//! The gateway contract.
//!
//! Features depend on [`Gateway`] as a trait object so tests can swap the HTTP
//! transport for a scripted double.

use crate::error::GatewayResult;
use crate::types::{
    AuthGrant, Booking, BookingId, BookingReceipt, CancelReceipt, CreateBookingRequest,
    CreateReviewRequest, LoginRequest, PaymentRequest, PaymentResponse, Performance,
    PerformanceId, Review, ReviewId, SignupReceipt, SignupRequest, UpdateReviewRequest,
};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every gateway operation
pub type GatewayFuture<T> = Pin<Box<dyn Future<Output = GatewayResult<T>> + Send>>;

/// Remote system of record for accounts, performances, bookings, payments and reviews
///
/// Implementations return envelope-free payloads and map failures into the
/// [`GatewayError`](crate::GatewayError) taxonomy.
pub trait Gateway: Send + Sync {
    /// Register an account
    ///
    /// # Errors
    ///
    /// Returns the gateway's rejection, e.g. an email already in use
    fn signup(&self, request: SignupRequest) -> GatewayFuture<SignupReceipt>;

    /// Exchange credentials for a bearer token
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Authentication`](crate::GatewayError::Authentication) for bad credentials
    fn login(&self, request: LoginRequest) -> GatewayFuture<AuthGrant>;

    /// The whole catalog
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn list_performances(&self) -> GatewayFuture<Vec<Performance>>;

    /// One performance
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`](crate::GatewayError::NotFound) for unknown ids
    fn get_performance(&self, id: PerformanceId) -> GatewayFuture<Performance>;

    /// Reserve seats, creating a pending booking
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Conflict`](crate::GatewayError::Conflict) when the per-account seat quota is exceeded
    fn create_booking(&self, request: CreateBookingRequest) -> GatewayFuture<BookingReceipt>;

    /// Bookings of the current account
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn my_bookings(&self) -> GatewayFuture<Vec<Booking>>;

    /// Cancel one of the current account's bookings
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn cancel_booking(&self, id: BookingId) -> GatewayFuture<CancelReceipt>;

    /// Pay for a pending booking
    ///
    /// A well-formed response is not necessarily a successful payment; check
    /// [`PaymentResponse::is_success`].
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn execute_payment(&self, request: PaymentRequest) -> GatewayFuture<PaymentResponse>;

    /// Post a review
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn create_review(&self, request: CreateReviewRequest) -> GatewayFuture<Review>;

    /// Reviews written by the current account
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure, 401 included
    fn my_reviews(&self) -> GatewayFuture<Vec<Review>>;

    /// Reviews of one performance
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn performance_reviews(&self, id: PerformanceId) -> GatewayFuture<Vec<Review>>;

    /// Edit a review
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn update_review(&self, id: ReviewId, request: UpdateReviewRequest) -> GatewayFuture<Review>;

    /// Delete a review
    ///
    /// # Errors
    ///
    /// Returns any transport or gateway failure
    fn delete_review(&self, id: ReviewId) -> GatewayFuture<()>;
}
