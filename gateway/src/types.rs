//! Wire models exchanged with the gateway.
//!
//! The gateway is the system of record for every entity here; the client only ever
//! holds a transient copy. Field names follow the gateway's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a performance in the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PerformanceId(u64);

impl PerformanceId {
    /// Wrap a raw catalog id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw catalog id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PerformanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Bookings carry the performance id as a string, the catalog as a number.
impl<'de> Deserialize<'de> for PerformanceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(id) => Ok(Self(id)),
            NumberOrText::Text(text) => text
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| D::Error::custom(format!("invalid performance id `{text}`"))),
        }
    }
}

/// Opaque booking identifier assigned by the gateway
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Wrap a gateway-issued id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BookingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(match NumberOrText::deserialize(deserializer)? {
            NumberOrText::Number(id) => id.to_string(),
            NumberOrText::Text(text) => text,
        }))
    }
}

/// Identifier of a review
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(u64);

impl ReviewId {
    /// Wrap a raw review id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw review id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => n.to_string(),
        Some(NumberOrText::Text(text)) => text,
        None => String::new(),
    })
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let text = lenient_string(deserializer)?;
    Ok((!text.is_empty()).then_some(text))
}

// ============================================================================
// Value objects
// ============================================================================

/// A whole-unit price or total, as the gateway quotes it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Create an amount
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// The raw amount
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Unit price times a seat count
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        f.write_str(&grouped)
    }
}

impl<'de> Deserialize<'de> for Money {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Whole(u64),
            Fractional(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Whole(amount) => Ok(Self(amount)),
            Raw::Fractional(amount)
                if amount >= 0.0 && amount.fract() == 0.0 && amount <= u64::MAX as f64 =>
            {
                Ok(Self(amount as u64))
            },
            Raw::Fractional(amount) => {
                Err(D::Error::custom(format!("invalid amount {amount}")))
            },
        }
    }
}

/// A server-side timestamp
///
/// Accepts `{"_seconds": .., "_nanoseconds": ..}`, an RFC 3339 string, or epoch millis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerTimestamp(DateTime<Utc>);

impl ServerTimestamp {
    /// Wrap a UTC instant
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// The UTC instant
    #[must_use]
    pub const fn at(self) -> DateTime<Utc> {
        self.0
    }
}

impl Serialize for ServerTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for ServerTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Firestore {
                #[serde(rename = "_seconds")]
                seconds: i64,
                #[serde(rename = "_nanoseconds", default)]
                nanoseconds: u32,
            },
            Millis(i64),
            Text(String),
        }

        let at = match Raw::deserialize(deserializer)? {
            Raw::Firestore {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(seconds, nanoseconds),
            Raw::Millis(millis) => DateTime::from_timestamp_millis(millis),
            Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
                .ok()
                .map(|at| at.with_timezone(&Utc)),
        };

        at.map(Self)
            .ok_or_else(|| D::Error::custom("timestamp out of range or malformed"))
    }
}

// ============================================================================
// Performances
// ============================================================================

/// Catalog category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceCategory {
    /// Theater
    Theater,
    /// Musical
    Musical,
    /// Concert
    Concert,
    /// Exhibition
    Exhibition,
    /// Movie
    Movie,
    /// A category this client does not know yet
    #[serde(other)]
    Other,
}

impl PerformanceCategory {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Theater => "Theater",
            Self::Musical => "Musical",
            Self::Concert => "Concert",
            Self::Exhibition => "Exhibition",
            Self::Movie => "Movie",
            Self::Other => "Other",
        }
    }
}

/// Read-only catalog entry
///
/// Seat counts are as of the last fetch; bookings decrement them server-side only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Catalog id
    pub id: PerformanceId,
    /// Title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Category
    pub category: PerformanceCategory,
    /// Venue
    #[serde(default)]
    pub venue: String,
    /// Poster image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Unit price per seat
    pub price: Money,
    /// Seats in the house
    #[serde(default)]
    pub total_seats: u32,
    /// Seats still available
    #[serde(default)]
    pub available_seats: u32,
    /// Seats currently held by reservations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_seats: Option<u32>,
    /// Created at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<ServerTimestamp>,
    /// Updated at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<ServerTimestamp>,
}

// ============================================================================
// Bookings
// ============================================================================

/// Booking lifecycle status, canonicalised from the gateway's mixed spellings
///
/// | wire                                  | canonical       |
/// |---------------------------------------|-----------------|
/// | `PENDING`, `pending`, `PENDDING`      | `Pending`       |
/// | `PAID`, `paid`, `SUCCESS`             | `Paid`          |
/// | `CANCELLED`, `cancelled`, `CANCELED`  | `Cancelled`     |
/// | `PAYMENT_FAILED`, `payment_failed`, `FAILED` | `PaymentFailed` |
/// | `REFUNDED`                            | `Refunded`      |
/// | anything else                         | `Unknown(raw)`  |
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    /// Reserved, awaiting payment
    Pending,
    /// Paid
    Paid,
    /// Cancelled
    Cancelled,
    /// Payment attempt failed
    PaymentFailed,
    /// Refunded
    Refunded,
    /// A value the mapping does not cover, kept verbatim
    Unknown(String),
}

impl BookingStatus {
    /// Canonical wire spelling
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::Refunded => "REFUNDED",
            Self::Unknown(raw) => raw,
        }
    }

    /// Badge label for listings
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Awaiting payment",
            Self::Paid => "Paid",
            Self::Cancelled => "Cancelled",
            Self::PaymentFailed => "Payment failed",
            Self::Refunded => "Refunded",
            Self::Unknown(raw) => raw,
        }
    }

    /// Only pending and paid bookings may be cancelled
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }
}

impl From<String> for BookingStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDDING" => Self::Pending,
            "PAID" | "SUCCESS" => Self::Paid,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            "PAYMENT_FAILED" | "FAILED" => Self::PaymentFailed,
            "REFUNDED" => Self::Refunded,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking as listed under "my bookings"
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Gateway-assigned id
    pub booking_id: BookingId,
    /// Owner, as the gateway recorded it
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    /// Booked performance
    pub performance_id: PerformanceId,
    /// Seat count
    pub quantity: u32,
    /// Payment method chosen at reservation
    #[serde(default)]
    pub payment_method: String,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Total as computed by the gateway
    #[serde(default)]
    pub total_amount: Money,
    /// Assigned seats, once allocated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_ids: Option<Vec<String>>,
    /// Underlying seat reservation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<u64>,
    /// Created at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<ServerTimestamp>,
    /// Updated at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<ServerTimestamp>,
}

/// Body of `POST /booking/booking`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Performance id, sent as a string
    pub performance_id: String,
    /// Seat count
    pub quantity: u32,
    /// Payment method code, e.g. `CREDIT_CARD`
    pub payment_method: String,
}

/// Answer to a booking creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    /// Free-text confirmation
    #[serde(default)]
    pub message: Option<String>,
    /// The new booking's id
    pub booking_id: BookingId,
}

/// Answer to a booking cancellation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReceipt {
    /// Free-text confirmation
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Payments
// ============================================================================

/// Body of `POST /payment/payment/execute`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Booking being paid
    pub booking_id: BookingId,
    /// Payment method token, e.g. `creditCard`
    pub payment_method_token: String,
    /// Card number
    pub card_number: String,
    /// Card verification value
    pub cvv: String,
}

impl fmt::Debug for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("booking_id", &self.booking_id)
            .field("payment_method_token", &self.payment_method_token)
            .field("card_number", &"<redacted>")
            .field("cvv", &"<redacted>")
            .finish()
    }
}

/// Outcome of a payment execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Free-text outcome
    #[serde(default)]
    pub message: Option<String>,
    /// Final status reported by the payment processor
    pub final_status: String,
    /// Booking the payment applied to
    #[serde(default)]
    pub booking_id: Option<BookingId>,
}

impl PaymentResponse {
    /// Only an explicit `SUCCESS` counts as paid
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.final_status.trim().eq_ignore_ascii_case("SUCCESS")
    }
}

// ============================================================================
// Reviews
// ============================================================================

/// A user review of a performance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review id
    pub id: ReviewId,
    /// Reviewed performance
    pub performance_id: PerformanceId,
    /// Author
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    /// Rating, 1 to 5
    pub rating: u8,
    /// Text
    pub content: String,
    /// Created at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<ServerTimestamp>,
    /// Updated at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<ServerTimestamp>,
}

/// Body of `POST /review/reviews`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    /// Reviewed performance
    pub performance_id: PerformanceId,
    /// Rating, 1 to 5
    pub rating: u8,
    /// Text
    pub content: String,
}

/// Body of `PATCH /review/reviews/{id}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReviewRequest {
    /// Rating, 1 to 5
    pub rating: u8,
    /// Text
    pub content: String,
}

// ============================================================================
// Authentication
// ============================================================================

/// Body of `POST /auth/signup`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Email
    pub email: String,
    /// Password
    pub password: String,
    /// Display name
    pub name: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Body of `POST /auth/login`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email
    pub email: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Answer to a successful signup
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupReceipt {
    /// New account id, when the gateway reports it
    #[serde(default, alias = "userId", deserialize_with = "lenient_optional_string")]
    pub user_id: Option<String>,
}

/// Answer to a successful login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    /// Bearer token
    pub token: String,
    /// Account id, when the gateway reports it
    #[serde(default, alias = "userId", deserialize_with = "lenient_optional_string")]
    pub user_id: Option<String>,
}

impl fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGrant")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}
