//! # Stagepass Core
//!
//! The abstractions every stagepass feature is written against.
//!
//! A feature (session, booking wizard, review list, ...) is a reducer:
//!
//! - **State**: what the screen currently knows (a transient copy of gateway data plus UI flags)
//! - **Action**: user intents and the outcomes of gateway calls
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of I/O to run, never the I/O itself
//! - **Environment**: the collaborators a feature needs (gateway, token store, clock), injected
//!
//! Reducers never talk to the network. They return [`effect::Effect::Future`] values that the
//! runtime executes, and the action each future resolves to is fed back into the same reducer.
//!
//! ## Example
//!
//! ```ignore
//! impl Reducer for BookingReducer {
//!     type State = BookingState;
//!     type Action = BookingAction;
//!     type Environment = BookingEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut BookingState,
//!         action: BookingAction,
//!         env: &BookingEnvironment,
//!     ) -> SmallVec<[Effect<BookingAction>; 4]> {
//!         match action {
//!             BookingAction::Reserve => {
//!                 state.in_flight = true;
//!                 let gateway = Arc::clone(&env.gateway);
//!                 smallvec![Effect::Future(Box::pin(async move {
//!                     Some(match gateway.create_booking(request).await {
//!                         Ok(receipt) => BookingAction::Reserved { receipt },
//!                         Err(error) => BookingAction::ReserveFailed { error },
//!                     })
//!                 }))]
//!             }
//!             _ => SmallVec::new(),
//!         }
//!     }
//! }
//! ```

pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - the trait every feature implements
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Business logic of a feature
    ///
    /// `reduce` must be deterministic: it may read the environment (the clock, a config
    /// value) but all I/O goes into the returned effects.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Apply `action` to `state` and describe the follow-up work
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// A side effect to be executed by the runtime
    ///
    /// Effects are values. Returning one from a reducer does nothing until a store runs it.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation, usually one gateway call
        ///
        /// If it resolves to `Some(action)`, the action is fed back into the reducer.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// True for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - dependency injection traits shared by all features
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Abstracts "now" so reducers stay deterministic under test
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
