//! HTTP transport for the gateway.

use crate::credentials::CredentialSlot;
use crate::envelope::{decode_list, error_message, unwrap_list, unwrap_value};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{Gateway, GatewayFuture};
use crate::types::{
    AuthGrant, Booking, BookingId, BookingReceipt, CancelReceipt, CreateBookingRequest,
    CreateReviewRequest, LoginRequest, PaymentRequest, PaymentResponse, Performance,
    PerformanceId, Review, ReviewId, SignupReceipt, SignupRequest, UpdateReviewRequest,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Header carrying the client-asserted user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// [`Gateway`] over HTTPS
///
/// Credentials are read from the injected [`CredentialSlot`] when each request is
/// built, so a login or logout takes effect on the very next call.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    credentials: CredentialSlot,
    send_user_id_header: bool,
}

impl HttpGateway {
    /// Create a transport for the gateway at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, credentials: CredentialSlot) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            send_user_id_header: true,
        }
    }

    /// Toggle the `x-user-id` compatibility header
    #[must_use]
    pub const fn with_user_id_header(mut self, enabled: bool) -> Self {
        self.send_user_id_header = enabled;
        self
    }

    /// Use a preconfigured reqwest client
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let credentials = self.credentials.current();
        tracing::debug!(
            %method,
            path,
            authenticated = credentials.is_some(),
            user_id = ?credentials.as_ref().and_then(|c| c.user_id.as_deref()),
            "Gateway request"
        );

        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(credentials) = credentials {
            builder = builder.bearer_auth(credentials.token.expose());
            if self.send_user_id_header {
                if let Some(user_id) = &credentials.user_id {
                    builder = builder.header(USER_ID_HEADER, user_id);
                }
            }
        }
        builder
    }
}

async fn send(builder: RequestBuilder) -> GatewayResult<Value> {
    let response = builder.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!(status = status.as_u16(), "Gateway returned an error status");
        return Err(GatewayError::from_status(
            status.as_u16(),
            error_message(&body),
        ));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

async fn fetch_value<T: DeserializeOwned>(builder: RequestBuilder) -> GatewayResult<T> {
    let value = unwrap_value(send(builder).await?)?;
    Ok(serde_json::from_value(value)?)
}

async fn fetch_list<T: DeserializeOwned>(builder: RequestBuilder) -> GatewayResult<Vec<T>> {
    Ok(decode_list(unwrap_list(send(builder).await?)?))
}

/// Treat a rejected login as bad credentials
fn login_failure(error: GatewayError) -> GatewayError {
    match error {
        GatewayError::Rejected { message }
        | GatewayError::Gateway {
            status: Some(400),
            message,
        } => GatewayError::Authentication { message },
        other => other,
    }
    .or_message("Login failed")
}

impl Gateway for HttpGateway {
    fn signup(&self, request: SignupRequest) -> GatewayFuture<SignupReceipt> {
        let builder = self.request(Method::POST, "/auth/signup").json(&request);
        Box::pin(async move {
            let value = match send(builder).await.and_then(unwrap_value) {
                Ok(value) => value,
                Err(error) => return Err(error.or_message("Signup failed")),
            };
            Ok(serde_json::from_value(value).unwrap_or_default())
        })
    }

    fn login(&self, request: LoginRequest) -> GatewayFuture<AuthGrant> {
        let builder = self.request(Method::POST, "/auth/login").json(&request);
        Box::pin(async move { fetch_value(builder).await.map_err(login_failure) })
    }

    fn list_performances(&self) -> GatewayFuture<Vec<Performance>> {
        let builder = self.request(Method::GET, "/performances/performances");
        Box::pin(fetch_list(builder))
    }

    fn get_performance(&self, id: PerformanceId) -> GatewayFuture<Performance> {
        let builder = self.request(Method::GET, &format!("/performances/performances/{id}"));
        Box::pin(fetch_value(builder))
    }

    fn create_booking(&self, request: CreateBookingRequest) -> GatewayFuture<BookingReceipt> {
        let builder = self.request(Method::POST, "/booking/booking").json(&request);
        Box::pin(fetch_value(builder))
    }

    fn my_bookings(&self) -> GatewayFuture<Vec<Booking>> {
        let builder = self.request(Method::GET, "/booking/booking/my");
        Box::pin(fetch_list(builder))
    }

    fn cancel_booking(&self, id: BookingId) -> GatewayFuture<CancelReceipt> {
        let builder = self
            .request(Method::DELETE, "/booking/booking/my")
            .json(&json!({ "bookingId": id }));
        Box::pin(async move {
            let value = unwrap_value(send(builder).await?)?;
            Ok(serde_json::from_value(value).unwrap_or_default())
        })
    }

    fn execute_payment(&self, request: PaymentRequest) -> GatewayFuture<PaymentResponse> {
        let builder = self
            .request(Method::POST, "/payment/payment/execute")
            .json(&request);
        Box::pin(fetch_value(builder))
    }

    fn create_review(&self, request: CreateReviewRequest) -> GatewayFuture<Review> {
        let builder = self.request(Method::POST, "/review/reviews").json(&request);
        Box::pin(fetch_value(builder))
    }

    fn my_reviews(&self) -> GatewayFuture<Vec<Review>> {
        let builder = self.request(Method::GET, "/review/reviews/my");
        Box::pin(fetch_list(builder))
    }

    fn performance_reviews(&self, id: PerformanceId) -> GatewayFuture<Vec<Review>> {
        let builder = self.request(Method::GET, &format!("/review/reviews/performance/{id}"));
        Box::pin(fetch_list(builder))
    }

    fn update_review(&self, id: ReviewId, request: UpdateReviewRequest) -> GatewayFuture<Review> {
        let builder = self
            .request(Method::PATCH, &format!("/review/reviews/{id}"))
            .json(&request);
        Box::pin(fetch_value(builder))
    }

    fn delete_review(&self, id: ReviewId) -> GatewayFuture<()> {
        let builder = self.request(Method::DELETE, &format!("/review/reviews/{id}"));
        Box::pin(async move {
            unwrap_value(send(builder).await?)?;
            Ok(())
        })
    }
}
