//! In-memory implementations of the client's environment traits.
//!
//! Enabled by the default `test-utils` feature.

pub mod confirm;
pub mod token_store;

pub use confirm::ScriptedConfirmer;
pub use token_store::MemoryTokenStore;
