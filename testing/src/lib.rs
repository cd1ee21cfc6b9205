//! # Stagepass Testing
//!
//! Testing utilities for stagepass features.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given/When/Then harness for reducers
//! - [`collect_actions`] and [`settle`], to run a reducer's effects without a store
//! - [`MockGateway`], a scripted stand-in for the remote gateway
//! - A deterministic [`FixedClock`]
//! - proptest strategies for gateway models
//!
//! ## Example
//!
//! ```ignore
//! use stagepass_testing::{MockGateway, Operation, test_clock};
//! use stagepass_runtime::Store;
//!
//! #[tokio::test]
//! async fn reserve_moves_to_payment() {
//!     let gateway = MockGateway::new();
//!     gateway.respond(Operation::CreateBooking, json!({ "bookingId": "BK1" }));
//!
//!     let store = Store::new(state, BookingReducer, env);
//!     store.send(BookingAction::Reserve).await.wait().await;
//!
//!     assert_eq!(store.state(|s| s.stage).await, BookingStage::Paying);
//! }
//! ```

use chrono::{DateTime, Utc};
use stagepass_core::environment::Clock;

pub mod mock_gateway;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use stagepass_testing::mocks::FixedClock;
    /// use stagepass_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Property-based testing utilities
///
/// proptest strategies for the gateway's wire models.
pub mod properties {
    use proptest::prelude::*;
    use stagepass_gateway::{Money, Performance, PerformanceCategory, PerformanceId};

    /// Any price the catalog could plausibly quote
    pub fn money() -> impl Strategy<Value = Money> {
        (0u64..10_000_000).prop_map(Money::new)
    }

    /// Any known performance category
    pub fn category() -> impl Strategy<Value = PerformanceCategory> {
        prop_oneof![
            Just(PerformanceCategory::Theater),
            Just(PerformanceCategory::Musical),
            Just(PerformanceCategory::Concert),
            Just(PerformanceCategory::Exhibition),
            Just(PerformanceCategory::Movie),
        ]
    }

    /// A catalog entry with arbitrary id, price and seat counts
    pub fn performance() -> impl Strategy<Value = Performance> {
        (1u64..100_000, "[A-Za-z ]{1,40}", category(), money(), 1u32..5_000).prop_map(
            |(id, title, category, price, total_seats)| Performance {
                id: PerformanceId::new(id),
                title,
                description: String::new(),
                category,
                venue: "Main Hall".to_string(),
                image_url: None,
                price,
                total_seats,
                available_seats: total_seats,
                reserved_seats: None,
                created_at: None,
                updated_at: None,
            },
        )
    }
}

// Re-export commonly used items
pub use mock_gateway::{MockGateway, Operation, RecordedCall};
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions, collect_actions, settle};
