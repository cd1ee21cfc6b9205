//! The caller's bookings, newest first, with cancellation.

use super::FeatureState;
use crate::confirm::Confirmer;
use stagepass_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use stagepass_gateway::{Booking, BookingId, BookingStatus, Gateway, GatewayError, ServerTimestamp};
use std::cmp::Reverse;
use std::sync::Arc;

const LOAD_FAILED: &str = "Failed to load bookings.";
const CANCEL_FAILED: &str = "Failed to cancel the booking.";
const NOT_CANCELLABLE: &str = "This booking can no longer be cancelled.";
const UNKNOWN_BOOKING: &str = "Booking not found.";

// ============================================================================
// State
// ============================================================================

/// My-bookings state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MyBookingsState {
    /// Bookings, newest first; undated bookings last
    pub bookings: Vec<Booking>,
    /// A load is waiting on the gateway
    pub loading: bool,
    /// The booking whose cancellation is in progress
    pub cancelling: Option<BookingId>,
    /// Last failure
    pub error: Option<GatewayError>,
}

impl MyBookingsState {
    fn find_mut(&mut self, booking_id: &BookingId) -> Option<&mut Booking> {
        self.bookings
            .iter_mut()
            .find(|booking| &booking.booking_id == booking_id)
    }
}

impl FeatureState for MyBookingsState {
    fn last_error(&self) -> Option<&GatewayError> {
        self.error.as_ref()
    }
}

/// Newest first. `None` is less than any `Some`, so undated bookings end up last.
fn sort_newest_first(bookings: &mut [Booking]) {
    bookings.sort_by_key(|booking| Reverse(booking.created_at.map(ServerTimestamp::at)));
}

// ============================================================================
// Actions
// ============================================================================

/// My-bookings actions
#[derive(Clone, Debug)]
pub enum MyBookingsAction {
    // Commands
    /// Fetch the caller's bookings
    Load,
    /// Cancel one booking, after confirmation
    Cancel {
        /// Which
        booking_id: BookingId,
    },

    // Events
    /// Bookings fetched
    Loaded {
        /// Bookings, in gateway order
        bookings: Vec<Booking>,
    },
    /// Fetch failed
    LoadFailed {
        /// Why
        error: GatewayError,
    },
    /// The user said no
    CancelDeclined,
    /// Booking cancelled
    Cancelled {
        /// Which
        booking_id: BookingId,
    },
    /// Cancellation refused
    CancelFailed {
        /// Why
        error: GatewayError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for my bookings
#[derive(Clone)]
pub struct MyBookingsEnvironment {
    /// Remote gateway
    pub gateway: Arc<dyn Gateway>,
    /// Asks the user before cancelling
    pub confirmer: Arc<dyn Confirmer>,
}

impl MyBookingsEnvironment {
    /// Creates a new `MyBookingsEnvironment`
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self { gateway, confirmer }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for my bookings
#[derive(Clone, Debug, Default)]
pub struct MyBookingsReducer;

impl MyBookingsReducer {
    /// Creates a new `MyBookingsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for MyBookingsReducer {
    type State = MyBookingsState;
    type Action = MyBookingsAction;
    type Environment = MyBookingsEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            MyBookingsAction::Load => {
                state.loading = true;
                state.error = None;
                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.my_bookings().await {
                        Ok(bookings) => MyBookingsAction::Loaded { bookings },
                        Err(error) => MyBookingsAction::LoadFailed { error },
                    })
                }))]
            },

            MyBookingsAction::Loaded { mut bookings } => {
                sort_newest_first(&mut bookings);
                state.loading = false;
                state.bookings = bookings;
                smallvec![]
            },

            MyBookingsAction::LoadFailed { error } => {
                tracing::warn!(%error, "Failed to load bookings");
                state.loading = false;
                state.error = Some(error.or_message(LOAD_FAILED));
                smallvec![]
            },

            MyBookingsAction::Cancel { booking_id } => {
                if state.cancelling.is_some() {
                    return smallvec![];
                }
                let Some(booking) = state.find_mut(&booking_id) else {
                    state.error = Some(GatewayError::NotFound {
                        message: UNKNOWN_BOOKING.to_string(),
                    });
                    return smallvec![];
                };
                if !booking.status.is_cancellable() {
                    state.error = Some(GatewayError::validation(NOT_CANCELLABLE));
                    return smallvec![];
                }
                let prompt = format!(
                    "Cancel booking {booking_id} ({} seats, {})?",
                    booking.quantity, booking.total_amount
                );
                state.cancelling = Some(booking_id.clone());
                state.error = None;

                let gateway = Arc::clone(&env.gateway);
                let confirmer = Arc::clone(&env.confirmer);
                smallvec![Effect::Future(Box::pin(async move {
                    if !confirmer.confirm(prompt).await {
                        return Some(MyBookingsAction::CancelDeclined);
                    }
                    Some(match gateway.cancel_booking(booking_id.clone()).await {
                        Ok(_) => MyBookingsAction::Cancelled { booking_id },
                        Err(error) => MyBookingsAction::CancelFailed { error },
                    })
                }))]
            },

            MyBookingsAction::CancelDeclined => {
                state.cancelling = None;
                smallvec![]
            },

            MyBookingsAction::Cancelled { booking_id } => {
                tracing::info!(%booking_id, "Booking cancelled");
                state.cancelling = None;
                if let Some(booking) = state.find_mut(&booking_id) {
                    booking.status = BookingStatus::Cancelled;
                }
                smallvec![]
            },

            MyBookingsAction::CancelFailed { error } => {
                tracing::warn!(%error, "Cancellation failed");
                state.cancelling = None;
                state.error = Some(error.or_message(CANCEL_FAILED));
                smallvec![]
            },
        }
    }
}
