//! # Stagepass
//!
//! Ticket booking client for the stagepass API gateway.
//!
//! Two features carry the booking flow:
//!
//! - **Session** ([`features::session`]): signup, login, logout, and the bearer token
//!   every other call presents. A persisted token is restored at startup and trusted
//!   until the gateway rejects it.
//! - **Booking wizard** ([`features::booking`]): reserve seats, pay, or cancel the
//!   held reservation, one gateway call per step.
//!
//! Around them sit the catalog, the caller's bookings and reviews. Each feature is a
//! reducer run by a [`stagepass_runtime::Store`]; [`App`] wires them to one gateway.
//!
//! ## Example
//!
//! ```no_run
//! use stagepass::features::catalog::CatalogAction;
//! use stagepass::{App, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = App::from_config(Config::from_env());
//!     app.start().await;
//!
//!     let catalog = app.catalog();
//!     app.run(&catalog, CatalogAction::LoadAll).await;
//!     for performance in catalog.state(|s| s.performances.clone()).await {
//!         println!("{}", performance.title);
//!     }
//! }
//! ```

pub mod app;
pub mod config;
pub mod confirm;
pub mod features;
pub mod token_store;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use app::App;
pub use config::Config;
pub use confirm::{Confirmer, StdinConfirmer};
pub use features::FeatureState;
pub use token_store::{FileTokenStore, TokenStore, TokenStoreError};
pub use types::{InvalidSeatQuantity, Screen, SeatQuantity};
