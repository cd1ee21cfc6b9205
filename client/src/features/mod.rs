//! Feature reducers.
//!
//! Each feature is one reducer with its own state, actions and environment, driven by
//! a [`Store`](stagepass_runtime::Store). Every gateway call is an effect; every
//! failure lands in the feature's state as a user-facing [`GatewayError`].

use stagepass_gateway::GatewayError;

pub mod booking;
pub mod catalog;
pub mod my_bookings;
pub mod reviews;
pub mod session;

/// Common view over feature state
pub trait FeatureState {
    /// True for the session itself, whose authentication errors are about new credentials
    /// rather than the token it holds
    const OWNS_SESSION: bool = false;

    /// The error the last action left behind, if any
    fn last_error(&self) -> Option<&GatewayError>;
}
