//! Catalog: the performance listing and a single performance's details.

use super::FeatureState;
use stagepass_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use stagepass_gateway::{Gateway, GatewayError, Performance, PerformanceId};
use std::sync::Arc;

const LOAD_ALL_FAILED: &str = "Failed to load performances.";
const LOAD_ONE_FAILED: &str = "Failed to load the performance.";

// ============================================================================
// State
// ============================================================================

/// Catalog state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    /// Every performance, in gateway order
    pub performances: Vec<Performance>,
    /// The performance opened for details
    pub selected: Option<Performance>,
    /// A load is waiting on the gateway
    pub loading: bool,
    /// Last failure
    pub error: Option<GatewayError>,
}

impl FeatureState for CatalogState {
    fn last_error(&self) -> Option<&GatewayError> {
        self.error.as_ref()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Catalog actions
#[derive(Clone, Debug)]
pub enum CatalogAction {
    /// Fetch the listing
    LoadAll,
    /// Listing fetched
    LoadedAll {
        /// Performances
        performances: Vec<Performance>,
    },
    /// Listing failed
    LoadAllFailed {
        /// Why
        error: GatewayError,
    },
    /// Fetch one performance
    LoadOne {
        /// Which
        id: PerformanceId,
    },
    /// Performance fetched
    LoadedOne {
        /// The performance
        performance: Performance,
    },
    /// Performance failed to load
    LoadOneFailed {
        /// Why
        error: GatewayError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the catalog
#[derive(Clone)]
pub struct CatalogEnvironment {
    /// Remote gateway
    pub gateway: Arc<dyn Gateway>,
}

impl CatalogEnvironment {
    /// Creates a new `CatalogEnvironment`
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the catalog
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::LoadAll => {
                state.loading = true;
                state.error = None;
                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.list_performances().await {
                        Ok(performances) => CatalogAction::LoadedAll { performances },
                        Err(error) => CatalogAction::LoadAllFailed { error },
                    })
                }))]
            },

            CatalogAction::LoadedAll { performances } => {
                tracing::debug!(count = performances.len(), "Performances loaded");
                state.loading = false;
                state.performances = performances;
                smallvec![]
            },

            CatalogAction::LoadAllFailed { error } => {
                tracing::warn!(%error, "Failed to load performances");
                state.loading = false;
                state.error = Some(error.or_message(LOAD_ALL_FAILED));
                smallvec![]
            },

            CatalogAction::LoadOne { id } => {
                state.loading = true;
                state.error = None;
                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.get_performance(id).await {
                        Ok(performance) => CatalogAction::LoadedOne { performance },
                        Err(error) => CatalogAction::LoadOneFailed { error },
                    })
                }))]
            },

            CatalogAction::LoadedOne { performance } => {
                state.loading = false;
                state.selected = Some(performance);
                smallvec![]
            },

            CatalogAction::LoadOneFailed { error } => {
                tracing::warn!(%error, "Failed to load performance");
                state.loading = false;
                state.selected = None;
                state.error = Some(error.or_message(LOAD_ONE_FAILED));
                smallvec![]
            },
        }
    }
}
