//! Application wiring.
//!
//! [`App`] holds the shared dependencies, owns the session store for the whole run,
//! and hands out a fresh store per feature screen.

use crate::config::Config;
use crate::confirm::{Confirmer, StdinConfirmer};
use crate::features::FeatureState;
use crate::features::booking::{BookingAction, BookingEnvironment, BookingReducer, BookingState};
use crate::features::catalog::{CatalogAction, CatalogEnvironment, CatalogReducer, CatalogState};
use crate::features::my_bookings::{
    MyBookingsAction, MyBookingsEnvironment, MyBookingsReducer, MyBookingsState,
};
use crate::features::reviews::{
    ReviewScope, ReviewsAction, ReviewsEnvironment, ReviewsReducer, ReviewsState,
};
use crate::features::session::{SessionAction, SessionEnvironment, SessionReducer, SessionState};
use crate::token_store::{FileTokenStore, TokenStore};
use crate::types::SeatQuantity;
use stagepass_core::environment::{Clock, SystemClock};
use stagepass_core::reducer::Reducer;
use stagepass_gateway::{CredentialSlot, Gateway, HttpGateway, Performance};
use stagepass_runtime::Store;
use std::sync::Arc;

/// Store for the session
pub type SessionStore = Store<SessionState, SessionAction, SessionEnvironment, SessionReducer>;

/// Store for one booking
pub type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

/// Store for the catalog
pub type CatalogStore = Store<CatalogState, CatalogAction, CatalogEnvironment, CatalogReducer>;

/// Store for my bookings
pub type MyBookingsStore =
    Store<MyBookingsState, MyBookingsAction, MyBookingsEnvironment, MyBookingsReducer>;

/// Store for reviews
pub type ReviewsStore = Store<ReviewsState, ReviewsAction, ReviewsEnvironment, ReviewsReducer>;

/// The assembled client
pub struct App {
    config: Config,
    gateway: Arc<dyn Gateway>,
    credentials: CredentialSlot,
    token_store: Arc<dyn TokenStore>,
    confirmer: Arc<dyn Confirmer>,
    clock: Arc<dyn Clock>,
    session: SessionStore,
}

impl App {
    /// Assemble from explicit dependencies
    ///
    /// `credentials` must be the slot `gateway` reads its bearer token from.
    #[must_use]
    pub fn new(
        config: Config,
        gateway: Arc<dyn Gateway>,
        credentials: CredentialSlot,
        token_store: Arc<dyn TokenStore>,
        confirmer: Arc<dyn Confirmer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session = Store::new(
            SessionState::default(),
            SessionReducer::new(),
            SessionEnvironment::new(
                Arc::clone(&gateway),
                credentials.clone(),
                Arc::clone(&token_store),
            ),
        );

        Self {
            config,
            gateway,
            credentials,
            token_store,
            confirmer,
            clock,
            session,
        }
    }

    /// Production wiring: HTTP gateway, token file, stdin prompts, wall clock
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        let credentials = CredentialSlot::new();
        let gateway = HttpGateway::new(config.gateway_url.clone(), credentials.clone())
            .with_user_id_header(config.send_user_id_header);
        let token_store = FileTokenStore::new(config.token_path.clone());

        tracing::debug!(
            gateway_url = %config.gateway_url,
            token_path = %config.token_path.display(),
            "Client configured"
        );

        Self::new(
            config,
            Arc::new(gateway),
            credentials,
            Arc::new(token_store),
            Arc::new(StdinConfirmer),
            Arc::new(SystemClock),
        )
    }

    /// Restore a persisted session, if there is one
    pub async fn start(&self) {
        self.session.send(SessionAction::Restore).await.wait().await;
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Credentials the gateway presents
    #[must_use]
    pub const fn credentials(&self) -> &CredentialSlot {
        &self.credentials
    }

    /// Persisted token storage
    #[must_use]
    pub fn token_store(&self) -> &dyn TokenStore {
        self.token_store.as_ref()
    }

    /// The session store
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Whether a session token is held
    pub async fn is_authenticated(&self) -> bool {
        self.session.state(SessionState::is_authenticated).await
    }

    /// A store for booking `quantity` seats of `performance`
    #[must_use]
    pub fn booking(&self, performance: Performance, quantity: SeatQuantity) -> BookingStore {
        let payment_window =
            chrono::Duration::minutes(i64::from(self.config.payment_window_minutes));
        Store::new(
            BookingState::new(performance, quantity),
            BookingReducer::new(),
            BookingEnvironment::new(
                Arc::clone(&self.gateway),
                Arc::clone(&self.confirmer),
                Arc::clone(&self.clock),
                payment_window,
            ),
        )
    }

    /// A store for the catalog
    #[must_use]
    pub fn catalog(&self) -> CatalogStore {
        Store::new(
            CatalogState::default(),
            CatalogReducer::new(),
            CatalogEnvironment::new(Arc::clone(&self.gateway)),
        )
    }

    /// A store for the caller's bookings
    #[must_use]
    pub fn my_bookings(&self) -> MyBookingsStore {
        Store::new(
            MyBookingsState::default(),
            MyBookingsReducer::new(),
            MyBookingsEnvironment::new(Arc::clone(&self.gateway), Arc::clone(&self.confirmer)),
        )
    }

    /// A store for reviews in `scope`
    #[must_use]
    pub fn reviews(&self, scope: ReviewScope) -> ReviewsStore {
        Store::new(
            ReviewsState::new(scope),
            ReviewsReducer::new(),
            ReviewsEnvironment::new(Arc::clone(&self.gateway), Arc::clone(&self.confirmer)),
        )
    }

    /// Send `action` to `store` and wait until it and everything it triggered settle
    ///
    /// A persisted token is trusted at startup without a round trip. When a feature
    /// reports an authentication failure while the session still holds a token, the
    /// token was stale: the session is expired here. Failures reported by the session
    /// store itself (a mistyped password on a second login) leave the held token alone.
    pub async fn run<S, A, E, R>(&self, store: &Store<S, A, E, R>, action: A)
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        S: FeatureState + Send + Sync + 'static,
        A: Send + 'static,
        E: Send + Sync + 'static,
    {
        store.send(action).await.wait().await;
        if S::OWNS_SESSION {
            return;
        }

        let rejected = store
            .state(|state| state.last_error().is_some_and(|e| e.is_authentication()))
            .await;
        if rejected && self.is_authenticated().await {
            self.session.send(SessionAction::Expire).await.wait().await;
        }
    }
}
