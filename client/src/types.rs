//! Client-side value types shared by features.

use stagepass_gateway::PerformanceId;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Seat quantity
// ============================================================================

/// Seats one booking may hold, 1 to 10 inclusive
///
/// A reservation can only be built from a `SeatQuantity`, so an out-of-range
/// quantity never reaches the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatQuantity(u32);

impl SeatQuantity {
    /// Smallest allowed quantity
    pub const MIN: Self = Self(1);

    /// Largest allowed quantity
    pub const MAX: Self = Self(10);

    /// The seat count
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for SeatQuantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for SeatQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejected seat quantity
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Seat quantity must be between 1 and 10 (requested: {0})")]
pub struct InvalidSeatQuantity(pub u32);

impl TryFrom<u32> for SeatQuantity {
    type Error = InvalidSeatQuantity;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidSeatQuantity(value))
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Where a feature asks the shell to go next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// The entry screen (login/signup)
    Entry,
    /// A performance's detail screen
    Performance(PerformanceId),
}
