//! Booking wizard: reserve seats, pay for them, done.
//!
//! One `BookingState` drives one booking through
//! `Reserving → Paying → Complete`, or `Paying → Cancelled` when the user backs out.
//! Every step calls the gateway and only moves forward when the call succeeds;
//! a failed step leaves the stage where it was so the user can retry.

use super::FeatureState;
use crate::confirm::Confirmer;
use crate::types::{Screen, SeatQuantity};
use chrono::Duration;
use stagepass_core::environment::Clock;
use stagepass_core::{DateTime, SmallVec, Utc, effect::Effect, reducer::Reducer, smallvec};
use stagepass_gateway::{
    BookingId, BookingReceipt, CreateBookingRequest, Gateway, GatewayError, Money,
    PaymentRequest, PaymentResponse, Performance,
};
use std::fmt;
use std::sync::Arc;

/// Payment method sent with every reservation
pub const PAYMENT_METHOD: &str = "CREDIT_CARD";

/// Payment method token sent with every payment
pub const PAYMENT_METHOD_TOKEN: &str = "creditCard";

/// Reported when the gateway refuses a reservation for exceeding the per-account quota
pub const QUOTA_EXCEEDED: &str = "You cannot reserve more than 10 seats per account.";

const RESERVATION_FAILED: &str = "Reservation failed.";
const PAYMENT_FAILED: &str = "Payment failed.";
const CANCEL_FAILED: &str = "Failed to cancel the reservation.";
const CARD_INCOMPLETE: &str = "Please enter the card number and CVV.";

const CARD_NUMBER_DIGITS: usize = 16;
const CVV_DIGITS: usize = 3;

// ============================================================================
// State
// ============================================================================

/// Where the wizard is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStage {
    /// Choosing a quantity; nothing held yet
    Reserving,
    /// Seats held under a booking id, waiting for payment
    Paying,
    /// Paid
    Complete,
    /// The held booking was cancelled
    Cancelled,
}

/// Card input, normalised to digits
///
/// `Debug` masks both fields.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    number: String,
    cvv: String,
}

impl CardDetails {
    /// Keep the digits of each field, truncated to 16 and 3 digits
    #[must_use]
    pub fn new(number: &str, cvv: &str) -> Self {
        Self {
            number: digits(number, CARD_NUMBER_DIGITS),
            cvv: digits(cvv, CVV_DIGITS),
        }
    }

    /// Card number digits
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// CVV digits
    #[must_use]
    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    /// Card number in dash-separated groups of four, e.g. `1234-5678-9012-3450`
    #[must_use]
    pub fn grouped_number(&self) -> String {
        self.number
            .as_bytes()
            .chunks(4)
            .map(|group| String::from_utf8_lossy(group).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Both fields are filled in
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.number.is_empty() && !self.cvv.is_empty()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.number.len().saturating_sub(4);
        f.debug_struct("CardDetails")
            .field("number", &format_args!("****{}", &self.number[last..]))
            .field("cvv", &"***")
            .finish()
    }
}

fn digits(input: &str, max: usize) -> String {
    input.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Booking wizard state
#[derive(Clone, Debug, PartialEq)]
pub struct BookingState {
    /// What is being booked
    pub performance: Performance,
    /// How many seats
    pub quantity: SeatQuantity,
    /// Current stage
    pub stage: BookingStage,
    /// Assigned by the gateway on reservation
    pub booking_id: Option<BookingId>,
    /// A step is waiting on the gateway
    pub in_flight: bool,
    /// Last failure
    pub error: Option<GatewayError>,
    /// When payment is expected by. Shown to the user, never enforced.
    pub payment_deadline: Option<DateTime<Utc>>,
    /// Where the shell should go next
    pub navigate_to: Option<Screen>,
    /// Gateway message for a completed payment
    pub confirmation: Option<String>,
}

impl BookingState {
    /// Start a booking for `quantity` seats of `performance`
    #[must_use]
    pub const fn new(performance: Performance, quantity: SeatQuantity) -> Self {
        Self {
            performance,
            quantity,
            stage: BookingStage::Reserving,
            booking_id: None,
            in_flight: false,
            error: None,
            payment_deadline: None,
            navigate_to: None,
            confirmation: None,
        }
    }

    /// Unit price × quantity
    #[must_use]
    pub const fn total_price(&self) -> Money {
        self.performance.price.times(self.quantity.get())
    }

    /// A held booking can still be cancelled
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        matches!(self.stage, BookingStage::Paying) && self.booking_id.is_some()
    }
}

impl FeatureState for BookingState {
    fn last_error(&self) -> Option<&GatewayError> {
        self.error.as_ref()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Booking wizard actions
#[derive(Clone, Debug)]
pub enum BookingAction {
    // Commands
    /// Change the quantity before reserving
    SetQuantity {
        /// New quantity
        quantity: SeatQuantity,
    },
    /// Hold the seats
    Reserve,
    /// Pay for the held seats
    Pay {
        /// Card to charge
        card: CardDetails,
    },
    /// Cancel the held booking, after confirmation
    Cancel,

    // Events
    /// Seats held
    Reserved {
        /// Gateway receipt
        receipt: BookingReceipt,
    },
    /// Reservation refused
    ReserveFailed {
        /// Why
        error: GatewayError,
    },
    /// The gateway answered the payment call
    PaymentSettled {
        /// Gateway verdict
        response: PaymentResponse,
    },
    /// The payment call failed
    PaymentFailed {
        /// Why
        error: GatewayError,
    },
    /// The user said no to cancelling
    CancelDeclined,
    /// Booking cancelled
    Cancelled,
    /// Cancellation refused
    CancelFailed {
        /// Why
        error: GatewayError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the booking wizard
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Remote gateway
    pub gateway: Arc<dyn Gateway>,
    /// Asks the user before cancelling
    pub confirmer: Arc<dyn Confirmer>,
    /// Clock for the payment deadline
    pub clock: Arc<dyn Clock>,
    /// How long the user is told they have to pay
    pub payment_window: Duration,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(
        gateway: Arc<dyn Gateway>,
        confirmer: Arc<dyn Confirmer>,
        clock: Arc<dyn Clock>,
        payment_window: Duration,
    ) -> Self {
        Self {
            gateway,
            confirmer,
            clock,
            payment_window,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the booking wizard
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::SetQuantity { quantity } => {
                if state.stage == BookingStage::Reserving && !state.in_flight {
                    state.quantity = quantity;
                }
                smallvec![]
            },

            BookingAction::Reserve => {
                if state.in_flight || state.stage != BookingStage::Reserving {
                    return smallvec![];
                }
                state.in_flight = true;
                state.error = None;

                let request = CreateBookingRequest {
                    performance_id: state.performance.id.get().to_string(),
                    quantity: state.quantity.get(),
                    payment_method: PAYMENT_METHOD.to_string(),
                };
                tracing::info!(
                    performance_id = %state.performance.id,
                    quantity = request.quantity,
                    "Reserving seats"
                );

                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.create_booking(request).await {
                        Ok(receipt) => BookingAction::Reserved { receipt },
                        Err(error) => BookingAction::ReserveFailed { error },
                    })
                }))]
            },

            BookingAction::Reserved { receipt } => {
                tracing::info!(booking_id = %receipt.booking_id, "Seats reserved");
                state.in_flight = false;
                state.booking_id = Some(receipt.booking_id);
                state.stage = BookingStage::Paying;
                state.payment_deadline = Some(env.clock.now() + env.payment_window);
                smallvec![]
            },

            BookingAction::ReserveFailed { error } => {
                tracing::warn!(%error, "Reservation failed");
                state.in_flight = false;
                state.error = Some(if error.is_conflict() {
                    error.with_message(QUOTA_EXCEEDED)
                } else {
                    error.or_message(RESERVATION_FAILED)
                });
                smallvec![]
            },

            BookingAction::Pay { card } => {
                if state.in_flight || state.stage != BookingStage::Paying {
                    return smallvec![];
                }
                let Some(booking_id) = state.booking_id.clone() else {
                    return smallvec![];
                };
                if !card.is_complete() {
                    state.error = Some(GatewayError::validation(CARD_INCOMPLETE));
                    return smallvec![];
                }
                state.in_flight = true;
                state.error = None;
                tracing::info!(booking_id = %booking_id, "Submitting payment");

                let request = PaymentRequest {
                    booking_id,
                    payment_method_token: PAYMENT_METHOD_TOKEN.to_string(),
                    card_number: card.number,
                    cvv: card.cvv,
                };
                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.execute_payment(request).await {
                        Ok(response) => BookingAction::PaymentSettled { response },
                        Err(error) => BookingAction::PaymentFailed { error },
                    })
                }))]
            },

            BookingAction::PaymentSettled { response } => {
                state.in_flight = false;
                if response.is_success() {
                    tracing::info!("Payment complete");
                    state.stage = BookingStage::Complete;
                    state.confirmation = response.message;
                } else {
                    tracing::warn!(final_status = %response.final_status, "Payment not accepted");
                    let message = response
                        .message
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| PAYMENT_FAILED.to_string());
                    state.error = Some(GatewayError::Rejected { message });
                }
                smallvec![]
            },

            BookingAction::PaymentFailed { error } => {
                tracing::warn!(%error, "Payment failed");
                state.in_flight = false;
                state.error = Some(error.or_message(PAYMENT_FAILED));
                smallvec![]
            },

            BookingAction::Cancel => {
                if state.in_flight || !state.can_cancel() {
                    return smallvec![];
                }
                let Some(booking_id) = state.booking_id.clone() else {
                    return smallvec![];
                };
                state.in_flight = true;
                state.error = None;

                let gateway = Arc::clone(&env.gateway);
                let confirmer = Arc::clone(&env.confirmer);
                smallvec![Effect::Future(Box::pin(async move {
                    let prompt = "Cancel this reservation?".to_string();
                    if !confirmer.confirm(prompt).await {
                        return Some(BookingAction::CancelDeclined);
                    }
                    Some(match gateway.cancel_booking(booking_id).await {
                        Ok(_) => BookingAction::Cancelled,
                        Err(error) => BookingAction::CancelFailed { error },
                    })
                }))]
            },

            BookingAction::CancelDeclined => {
                state.in_flight = false;
                smallvec![]
            },

            BookingAction::Cancelled => {
                tracing::info!(booking_id = ?state.booking_id, "Reservation cancelled");
                state.in_flight = false;
                state.stage = BookingStage::Cancelled;
                state.navigate_to = Some(Screen::Performance(state.performance.id));
                smallvec![]
            },

            BookingAction::CancelFailed { error } => {
                tracing::warn!(%error, "Cancellation failed");
                state.in_flight = false;
                state.error = Some(error.with_message(CANCEL_FAILED));
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedConfirmer;
    use serde_json::json;
    use stagepass_gateway::{PerformanceCategory, PerformanceId};
    use stagepass_testing::{
        MockGateway, Operation, RecordedCall, ReducerTest, assertions, collect_actions, test_clock,
    };

    fn performance() -> Performance {
        Performance {
            id: PerformanceId::new(7),
            title: "Hamlet".to_string(),
            description: String::new(),
            category: PerformanceCategory::Theater,
            venue: "Globe".to_string(),
            image_url: None,
            price: Money::new(50_000),
            total_seats: 100,
            available_seats: 40,
            reserved_seats: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn three() -> SeatQuantity {
        SeatQuantity::try_from(3).unwrap()
    }

    fn env_with(gateway: &MockGateway, confirmer: ScriptedConfirmer) -> BookingEnvironment {
        BookingEnvironment::new(
            Arc::new(gateway.clone()),
            Arc::new(confirmer),
            Arc::new(test_clock()),
            Duration::minutes(10),
        )
    }

    fn env() -> BookingEnvironment {
        env_with(&MockGateway::new(), ScriptedConfirmer::accepting())
    }

    fn paying() -> BookingState {
        BookingState {
            stage: BookingStage::Paying,
            booking_id: Some(BookingId::new("BK1")),
            ..BookingState::new(performance(), three())
        }
    }

    // ========================================================================
    // Card input
    // ========================================================================

    #[test]
    fn card_details_keep_digits_only() {
        let card = CardDetails::new("1234 5678-9012 34567890", "12a34");
        assert_eq!(card.number(), "1234567890123456");
        assert_eq!(card.cvv(), "123");
        assert_eq!(card.grouped_number(), "1234-5678-9012-3456");
        assert!(card.is_complete());
    }

    #[test]
    fn card_debug_masks_digits() {
        let card = CardDetails::new("4111111111111110", "123");
        let debug = format!("{card:?}");
        assert!(!debug.contains("4111111111111110"));
        assert!(!debug.contains("123\""));
        assert!(debug.contains("****1110"));
    }

    #[test]
    fn partial_card_groups() {
        assert_eq!(CardDetails::new("123456", "").grouped_number(), "1234-56");
        assert!(!CardDetails::new("123456", "").is_complete());
    }

    // ========================================================================
    // Reserve
    // ========================================================================

    #[test]
    fn total_is_unit_price_times_quantity() {
        let state = BookingState::new(performance(), three());
        assert_eq!(state.total_price(), Money::new(150_000));
    }

    #[test]
    fn quantity_changes_only_before_reserving() {
        let five = SeatQuantity::try_from(5).unwrap();
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(paying())
            .when_action(BookingAction::SetQuantity { quantity: five })
            .then_state(|state| assert_eq!(state.quantity.get(), 3))
            .run();

        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState::new(performance(), three()))
            .when_action(BookingAction::SetQuantity { quantity: five })
            .then_state(|state| assert_eq!(state.quantity.get(), 5))
            .run();
    }

    #[tokio::test]
    async fn reserve_sends_performance_and_quantity() {
        let gateway = MockGateway::new();
        gateway.respond(
            Operation::CreateBooking,
            json!({ "success": true, "data": { "bookingId": "BK1" } }),
        );
        let env = env_with(&gateway, ScriptedConfirmer::accepting());

        let mut state = BookingState::new(performance(), three());
        let effects = BookingReducer::new().reduce(&mut state, BookingAction::Reserve, &env);
        assert!(state.in_flight);

        let actions = collect_actions(effects).await;
        assert!(matches!(
            actions.as_slice(),
            [BookingAction::Reserved { receipt }] if receipt.booking_id.as_str() == "BK1"
        ));
        assert_eq!(
            gateway.last_call(),
            Some(RecordedCall::CreateBooking(CreateBookingRequest {
                performance_id: "7".to_string(),
                quantity: 3,
                payment_method: "CREDIT_CARD".to_string(),
            }))
        );
    }

    #[test]
    fn reserve_while_in_flight_is_ignored() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState {
                in_flight: true,
                ..BookingState::new(performance(), three())
            })
            .when_action(BookingAction::Reserve)
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn reserved_moves_to_paying_with_deadline() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState {
                in_flight: true,
                ..BookingState::new(performance(), three())
            })
            .when_action(BookingAction::Reserved {
                receipt: BookingReceipt {
                    message: None,
                    booking_id: BookingId::new("BK1"),
                },
            })
            .then_state(|state| {
                assert_eq!(state.stage, BookingStage::Paying);
                assert_eq!(state.booking_id, Some(BookingId::new("BK1")));
                assert!(!state.in_flight);
                assert_eq!(
                    state.payment_deadline,
                    Some(test_clock().now() + Duration::minutes(10))
                );
                assert!(state.can_cancel());
            })
            .run();
    }

    #[test]
    fn quota_conflict_has_its_own_message() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState::new(performance(), three()))
            .when_action(BookingAction::ReserveFailed {
                error: GatewayError::from_status(409, "quota"),
            })
            .then_state(|state| {
                assert_eq!(state.stage, BookingStage::Reserving);
                assert_eq!(
                    state.error.as_ref().map(ToString::to_string).as_deref(),
                    Some(QUOTA_EXCEEDED)
                );
            })
            .run();
    }

    #[test]
    fn other_reserve_failures_fall_back() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState::new(performance(), three()))
            .when_action(BookingAction::ReserveFailed {
                error: GatewayError::from_status(500, ""),
            })
            .then_state(|state| {
                assert_eq!(
                    state.error.as_ref().map(ToString::to_string).as_deref(),
                    Some("Reservation failed.")
                );
            })
            .run();
    }

    // ========================================================================
    // Pay
    // ========================================================================

    #[tokio::test]
    async fn pay_sends_card_and_fixed_token() {
        let gateway = MockGateway::new();
        gateway.respond(
            Operation::ExecutePayment,
            json!({ "finalStatus": "SUCCESS", "message": "Paid" }),
        );
        let env = env_with(&gateway, ScriptedConfirmer::accepting());

        let mut state = paying();
        let card = CardDetails::new("4111-1111-1111-1110", "123");
        let effects = BookingReducer::new().reduce(&mut state, BookingAction::Pay { card }, &env);
        collect_actions(effects).await;

        assert_eq!(
            gateway.last_call(),
            Some(RecordedCall::ExecutePayment(PaymentRequest {
                booking_id: BookingId::new("BK1"),
                payment_method_token: "creditCard".to_string(),
                card_number: "4111111111111110".to_string(),
                cvv: "123".to_string(),
            }))
        );
    }

    #[test]
    fn incomplete_card_is_rejected_locally() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(paying())
            .when_action(BookingAction::Pay {
                card: CardDetails::new("4111111111111110", ""),
            })
            .then_state(|state| {
                assert!(!state.in_flight);
                assert!(matches!(state.error, Some(GatewayError::Validation { .. })));
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn pay_before_reserving_is_ignored() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState::new(performance(), three()))
            .when_action(BookingAction::Pay {
                card: CardDetails::new("4111111111111110", "123"),
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn success_completes() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(paying())
            .when_action(BookingAction::PaymentSettled {
                response: PaymentResponse {
                    message: Some("Payment complete".to_string()),
                    final_status: "success".to_string(),
                    booking_id: None,
                },
            })
            .then_state(|state| {
                assert_eq!(state.stage, BookingStage::Complete);
                assert_eq!(state.error, None);
                assert_eq!(state.confirmation.as_deref(), Some("Payment complete"));
            })
            .run();
    }

    #[test]
    fn any_other_status_stays_paying() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(paying())
            .when_action(BookingAction::PaymentSettled {
                response: PaymentResponse {
                    message: None,
                    final_status: "FAILED".to_string(),
                    booking_id: None,
                },
            })
            .then_state(|state| {
                assert_eq!(state.stage, BookingStage::Paying);
                assert_eq!(
                    state.error,
                    Some(GatewayError::Rejected {
                        message: "Payment failed.".to_string()
                    })
                );
            })
            .run();
    }

    #[test]
    fn payment_transport_failure_stays_paying() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState {
                in_flight: true,
                ..paying()
            })
            .when_action(BookingAction::PaymentFailed {
                error: GatewayError::transport("connection reset"),
            })
            .then_state(|state| {
                assert_eq!(state.stage, BookingStage::Paying);
                assert!(!state.in_flight);
                assert_eq!(state.error.as_ref().unwrap().message(), "connection reset");
            })
            .run();
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    #[tokio::test]
    async fn declined_cancel_changes_nothing() {
        let gateway = MockGateway::new();
        let confirmer = ScriptedConfirmer::declining();
        let env = env_with(&gateway, confirmer.clone());
        let reducer = BookingReducer::new();

        let mut state = paying();
        let actions = collect_actions(reducer.reduce(&mut state, BookingAction::Cancel, &env)).await;
        for action in actions {
            reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state, paying());
        assert_eq!(confirmer.prompts().len(), 1);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn confirmed_cancel_calls_gateway() {
        let gateway = MockGateway::new();
        gateway.respond(Operation::CancelBooking, json!({ "message": "Cancelled" }));
        let env = env_with(&gateway, ScriptedConfirmer::accepting());
        let reducer = BookingReducer::new();

        let mut state = paying();
        let actions = collect_actions(reducer.reduce(&mut state, BookingAction::Cancel, &env)).await;
        assert!(matches!(actions.as_slice(), [BookingAction::Cancelled]));
        for action in actions {
            reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.stage, BookingStage::Cancelled);
        assert_eq!(state.navigate_to, Some(Screen::Performance(PerformanceId::new(7))));
        assert_eq!(
            gateway.last_call(),
            Some(RecordedCall::CancelBooking(BookingId::new("BK1")))
        );
    }

    #[test]
    fn cancel_failure_keeps_stage() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState {
                in_flight: true,
                ..paying()
            })
            .when_action(BookingAction::CancelFailed {
                error: GatewayError::from_status(500, "boom"),
            })
            .then_state(|state| {
                assert_eq!(state.stage, BookingStage::Paying);
                assert_eq!(
                    state.error.as_ref().map(ToString::to_string).as_deref(),
                    Some("Failed to cancel the reservation.")
                );
            })
            .run();
    }

    #[test]
    fn nothing_to_cancel_before_reserving() {
        ReducerTest::new(BookingReducer::new())
            .with_env(env())
            .given_state(BookingState::new(performance(), three()))
            .when_action(BookingAction::Cancel)
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }
}
