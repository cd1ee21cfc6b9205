//! # Stagepass Runtime
//!
//! The [`Store`] that drives a feature reducer.
//!
//! A store owns one feature's state (a screen's worth: the session, one booking wizard,
//! one review list). Sending an action runs the reducer under a write lock, then spawns
//! the returned effects on the tokio runtime. Actions produced by effects go back through
//! the same reducer, in the order their futures resolve.
//!
//! ## Example
//!
//! ```ignore
//! use stagepass_runtime::Store;
//!
//! let store = Store::new(BookingState::new(performance, quantity), BookingReducer, env);
//!
//! let mut handle = store.send(BookingAction::Reserve).await;
//! handle.wait().await;
//!
//! let stage = store.state(|s| s.stage).await;
//! ```

use futures::future::BoxFuture;
use stagepass_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, watch};

/// Handle returned by [`Store::send`]
///
/// Tracks every effect spawned for the action, including effects of the actions those
/// effects feed back. `wait` resolves once all of them have finished.
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };
        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait until every tracked effect has completed
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Counter shared by all effects descending from one `send`
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Decrements the effect counter on drop, so a panicking effect still settles its handle
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Owns a feature's state and runs its reducer
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
        }
    }

    /// Send an action through the reducer and start its effects
    ///
    /// Returns as soon as the reducer has run; use [`EffectHandle::wait`] to wait for the
    /// effects (for example a gateway call and its outcome action) to settle.
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> EffectHandle {
        let (handle, tracking) = EffectHandle::new();
        self.dispatch(action, &tracking).await;
        handle
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let authenticated = store.state(SessionState::is_authenticated).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// The injected environment
    #[must_use]
    pub fn environment(&self) -> &E {
        &self.environment
    }

    async fn dispatch(&self, action: A, tracking: &EffectTracking) {
        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        for effect in effects {
            if effect.is_none() {
                continue;
            }
            self.spawn_effect(effect, tracking.clone());
        }
    }

    fn spawn_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        tracking.increment();
        let guard = DecrementGuard(tracking.clone());
        let store = self.clone();

        tokio::spawn(async move {
            let _guard = guard;
            store.execute(effect, tracking).await;
        });
    }

    fn execute(self, effect: Effect<A>, tracking: EffectTracking) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    if let Some(action) = fut.await {
                        tracing::trace!("Effect::Future produced an action, feeding back");
                        self.dispatch(action, &tracking).await;
                    }
                },
            }
        })
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
        }
    }
}
