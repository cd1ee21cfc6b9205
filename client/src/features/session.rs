//! Session: who is signed in, and with which bearer token.
//!
//! The session owns the token, derives a user id from it, and keeps the shared
//! [`CredentialSlot`] and the persisted token in step with its own state:
//!
//! - `Restore` picks up a persisted token at startup and trusts it until the gateway
//!   says otherwise.
//! - `Login` / `Signup` talk to the gateway; a successful signup logs in with the same
//!   credentials.
//! - `Logout` and `Expire` forget everything locally, with no network call.

use super::FeatureState;
use crate::token_store::TokenStore;
use crate::types::Screen;
use stagepass_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use stagepass_gateway::{
    AuthGrant, BearerToken, CredentialSlot, Credentials, Gateway, GatewayError, LoginRequest,
    SignupRequest,
};
use std::fmt;
use std::sync::Arc;

/// Shown when a previously accepted token is rejected
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

// ============================================================================
// State
// ============================================================================

/// A password on its way to the gateway. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap a password
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// The raw password
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// The signed-in user, as far as the client knows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Login email
    pub email: String,
    /// Display name: the email's local part
    pub name: String,
    /// Account id, if one could be derived
    pub user_id: Option<String>,
}

impl User {
    fn from_email(email: &str, user_id: Option<String>) -> Self {
        let name = email.split('@').next().unwrap_or(email).to_string();
        Self {
            email: email.to_string(),
            name,
            user_id,
        }
    }
}

/// Session state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    /// Bearer token; present iff authenticated
    pub token: Option<BearerToken>,
    /// Known user details (absent after a restore, which only has the token)
    pub user: Option<User>,
    /// Advisory user id read from the token
    pub user_id: Option<String>,
    /// A login or signup is waiting on the gateway
    pub in_flight: bool,
    /// Last failure
    pub error: Option<GatewayError>,
    /// Where the shell should go next
    pub navigate_to: Option<Screen>,
}

impl SessionState {
    /// Whether a token is held
    ///
    /// The token is never verified locally; the gateway may still reject it.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn sign_out(&mut self) {
        self.token = None;
        self.user = None;
        self.user_id = None;
        self.in_flight = false;
        self.error = None;
        self.navigate_to = Some(Screen::Entry);
    }
}

impl FeatureState for SessionState {
    const OWNS_SESSION: bool = true;

    fn last_error(&self) -> Option<&GatewayError> {
        self.error.as_ref()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Session actions
#[derive(Clone, Debug)]
pub enum SessionAction {
    // Commands
    /// Load the persisted token, if any
    Restore,
    /// Log in
    Login {
        /// Email
        email: String,
        /// Password
        password: Password,
    },
    /// Register, then log in
    Signup {
        /// Email
        email: String,
        /// Password
        password: Password,
        /// Display name
        name: String,
    },
    /// Forget the session
    Logout,
    /// The gateway rejected the session's token
    Expire,

    // Events
    /// Persisted token loaded
    Restored {
        /// The token, if one was persisted
        token: Option<BearerToken>,
    },
    /// Login accepted
    LoggedIn {
        /// Email used to log in
        email: String,
        /// What the gateway granted
        grant: AuthGrant,
    },
    /// Login rejected
    LoginFailed {
        /// Why
        error: GatewayError,
    },
    /// Account created
    SignedUp {
        /// Email
        email: String,
        /// Password, reused for the automatic login
        password: Password,
    },
    /// Signup rejected
    SignupFailed {
        /// Why
        error: GatewayError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the session
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Remote gateway
    pub gateway: Arc<dyn Gateway>,
    /// Credentials the transport presents
    pub credentials: CredentialSlot,
    /// Where the token survives between runs
    pub token_store: Arc<dyn TokenStore>,
}

impl SessionEnvironment {
    /// Creates a new `SessionEnvironment`
    #[must_use]
    pub fn new(
        gateway: Arc<dyn Gateway>,
        credentials: CredentialSlot,
        token_store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            gateway,
            credentials,
            token_store,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the session
#[derive(Clone, Debug, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn install(
        env: &SessionEnvironment,
        credentials: Credentials,
        persist: bool,
    ) -> Effect<SessionAction> {
        let slot = env.credentials.clone();
        let token_store = Arc::clone(&env.token_store);
        Effect::Future(Box::pin(async move {
            if persist {
                if let Err(error) = token_store.save(credentials.token.expose()) {
                    tracing::warn!(%error, "Could not persist token");
                }
            }
            slot.install(credentials);
            None
        }))
    }

    fn forget(env: &SessionEnvironment) -> Effect<SessionAction> {
        let slot = env.credentials.clone();
        let token_store = Arc::clone(&env.token_store);
        Effect::Future(Box::pin(async move {
            slot.clear();
            if let Err(error) = token_store.clear() {
                tracing::warn!(%error, "Could not remove persisted token");
            }
            None
        }))
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::Restore => {
                let token_store = Arc::clone(&env.token_store);
                smallvec![Effect::Future(Box::pin(async move {
                    let token = match token_store.load() {
                        Ok(token) => token.and_then(BearerToken::new),
                        Err(error) => {
                            tracing::warn!(%error, "Could not load persisted token");
                            None
                        },
                    };
                    Some(SessionAction::Restored { token })
                }))]
            },

            SessionAction::Restored { token: None } => smallvec![],

            SessionAction::Restored { token: Some(token) } => {
                let credentials = Credentials::from_token(token.clone());
                tracing::info!("Restored persisted session");
                tracing::debug!(user_id = ?credentials.user_id, "Session identity");

                state.user_id.clone_from(&credentials.user_id);
                state.token = Some(token);
                smallvec![Self::install(env, credentials, false)]
            },

            SessionAction::Login { email, password } => {
                if state.in_flight {
                    return smallvec![];
                }
                state.in_flight = true;
                state.error = None;
                state.navigate_to = None;

                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    let request = LoginRequest {
                        email: email.clone(),
                        password: password.expose().to_string(),
                    };
                    Some(match gateway.login(request).await {
                        Ok(grant) => SessionAction::LoggedIn { email, grant },
                        Err(error) => SessionAction::LoginFailed { error },
                    })
                }))]
            },

            SessionAction::LoggedIn { email, grant } => {
                state.in_flight = false;

                let Some(token) = BearerToken::new(grant.token) else {
                    tracing::warn!("Gateway granted an empty token");
                    state.error = Some(GatewayError::authentication("Login failed"));
                    return smallvec![];
                };
                let user_id = token.claimed_user_id().or(grant.user_id);
                tracing::info!("Logged in");
                tracing::debug!(user_id = ?user_id, "Session identity");

                state.user = Some(User::from_email(&email, user_id.clone()));
                state.user_id.clone_from(&user_id);
                state.token = Some(token.clone());
                state.error = None;
                smallvec![Self::install(env, Credentials { token, user_id }, true)]
            },

            SessionAction::LoginFailed { error } => {
                tracing::info!(%error, "Login failed");
                state.in_flight = false;
                state.error = Some(error);
                smallvec![]
            },

            SessionAction::Signup {
                email,
                password,
                name,
            } => {
                if state.in_flight {
                    return smallvec![];
                }
                state.in_flight = true;
                state.error = None;

                let gateway = Arc::clone(&env.gateway);
                smallvec![Effect::Future(Box::pin(async move {
                    let request = SignupRequest {
                        email: email.clone(),
                        password: password.expose().to_string(),
                        name,
                    };
                    Some(match gateway.signup(request).await {
                        Ok(_) => SessionAction::SignedUp { email, password },
                        Err(error) => SessionAction::SignupFailed { error },
                    })
                }))]
            },

            SessionAction::SignedUp { email, password } => {
                tracing::info!("Account created, logging in");
                state.in_flight = false;
                smallvec![Effect::Future(Box::pin(async move {
                    Some(SessionAction::Login { email, password })
                }))]
            },

            SessionAction::SignupFailed { error } => {
                tracing::info!(%error, "Signup failed");
                state.in_flight = false;
                state.error = Some(error);
                smallvec![]
            },

            SessionAction::Logout => {
                tracing::info!("Logged out");
                state.sign_out();
                smallvec![Self::forget(env)]
            },

            SessionAction::Expire => {
                tracing::warn!("Session rejected by gateway");
                state.sign_out();
                state.error = Some(GatewayError::authentication(SESSION_EXPIRED));
                smallvec![Self::forget(env)]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::MemoryTokenStore;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;
    use stagepass_testing::{MockGateway, Operation, RecordedCall, ReducerTest, assertions, collect_actions};

    /// `header.payload.sig` with a base64url JSON payload
    fn token_for(payload: &serde_json::Value) -> String {
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    struct Harness {
        gateway: MockGateway,
        credentials: CredentialSlot,
        token_store: MemoryTokenStore,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                gateway: MockGateway::new(),
                credentials: CredentialSlot::new(),
                token_store: MemoryTokenStore::new(),
            }
        }

        fn env(&self) -> SessionEnvironment {
            SessionEnvironment::new(
                Arc::new(self.gateway.clone()),
                self.credentials.clone(),
                Arc::new(self.token_store.clone()),
            )
        }
    }

    fn login(email: &str) -> SessionAction {
        SessionAction::Login {
            email: email.to_string(),
            password: Password::new("pw"),
        }
    }

    fn signed_in() -> SessionState {
        SessionState {
            token: BearerToken::new("t"),
            user_id: Some("u-1".to_string()),
            ..SessionState::default()
        }
    }

    #[test]
    fn password_debug_is_redacted() {
        assert_eq!(format!("{:?}", Password::new("hunter2")), "Password(<redacted>)");
    }

    #[test]
    fn login_marks_in_flight() {
        ReducerTest::new(SessionReducer::new())
            .with_env(Harness::new().env())
            .given_state(SessionState::default())
            .when_action(login("a@b.com"))
            .then_state(|state| {
                assert!(state.in_flight);
                assert!(!state.is_authenticated());
            })
            .then_effects(assertions::assert_single_future)
            .run();
    }

    #[test]
    fn login_while_in_flight_is_ignored() {
        ReducerTest::new(SessionReducer::new())
            .with_env(Harness::new().env())
            .given_state(SessionState {
                in_flight: true,
                ..SessionState::default()
            })
            .when_action(login("a@b.com"))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[tokio::test]
    async fn login_effect_calls_gateway() {
        let harness = Harness::new();
        harness
            .gateway
            .respond(Operation::Login, json!({ "success": true, "data": { "token": "t-1" } }));

        let mut state = SessionState::default();
        let effects = SessionReducer::new().reduce(&mut state, login("a@b.com"), &harness.env());
        let actions = collect_actions(effects).await;

        assert!(matches!(
            actions.as_slice(),
            [SessionAction::LoggedIn { email, grant }] if email == "a@b.com" && grant.token == "t-1"
        ));
        assert_eq!(
            harness.gateway.last_call(),
            Some(RecordedCall::Login(LoginRequest {
                email: "a@b.com".to_string(),
                password: "pw".to_string(),
            }))
        );
    }

    #[tokio::test]
    async fn logged_in_derives_identity_and_persists() {
        let harness = Harness::new();
        let token = token_for(&json!({ "sub": "user-42" }));

        let mut state = SessionState {
            in_flight: true,
            ..SessionState::default()
        };
        let effects = SessionReducer::new().reduce(
            &mut state,
            SessionAction::LoggedIn {
                email: "ada@example.com".to_string(),
                grant: AuthGrant {
                    token: token.clone(),
                    user_id: Some("ignored".to_string()),
                },
            },
            &harness.env(),
        );

        assert!(state.is_authenticated());
        assert!(!state.in_flight);
        assert_eq!(state.user_id.as_deref(), Some("user-42"));
        let user = state.user.clone().unwrap();
        assert_eq!(user.name, "ada");

        collect_actions(effects).await;
        assert_eq!(harness.token_store.current(), Some(token));
        assert_eq!(
            harness.credentials.current().and_then(|c| c.user_id).as_deref(),
            Some("user-42")
        );
    }

    #[test]
    fn opaque_token_falls_back_to_granted_user_id() {
        ReducerTest::new(SessionReducer::new())
            .with_env(Harness::new().env())
            .given_state(SessionState::default())
            .when_action(SessionAction::LoggedIn {
                email: "a@b.com".to_string(),
                grant: AuthGrant {
                    token: "opaque".to_string(),
                    user_id: Some("u-9".to_string()),
                },
            })
            .then_state(|state| {
                assert_eq!(state.user_id.as_deref(), Some("u-9"));
            })
            .run();
    }

    #[test]
    fn empty_token_is_a_failed_login() {
        ReducerTest::new(SessionReducer::new())
            .with_env(Harness::new().env())
            .given_state(SessionState::default())
            .when_action(SessionAction::LoggedIn {
                email: "a@b.com".to_string(),
                grant: AuthGrant {
                    token: String::new(),
                    user_id: None,
                },
            })
            .then_state(|state| {
                assert!(!state.is_authenticated());
                assert!(state.error.as_ref().unwrap().is_authentication());
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn login_failure_keeps_gateway_message() {
        ReducerTest::new(SessionReducer::new())
            .with_env(Harness::new().env())
            .given_state(SessionState {
                in_flight: true,
                ..SessionState::default()
            })
            .when_action(SessionAction::LoginFailed {
                error: GatewayError::authentication("Invalid email or password"),
            })
            .then_state(|state| {
                assert!(!state.in_flight);
                assert_eq!(
                    state.error.as_ref().map(ToString::to_string).as_deref(),
                    Some("Invalid email or password")
                );
            })
            .run();
    }

    #[tokio::test]
    async fn signed_up_chains_login() {
        let harness = Harness::new();
        let mut state = SessionState {
            in_flight: true,
            ..SessionState::default()
        };
        let effects = SessionReducer::new().reduce(
            &mut state,
            SessionAction::SignedUp {
                email: "a@b.com".to_string(),
                password: Password::new("pw"),
            },
            &harness.env(),
        );
        assert!(!state.in_flight);

        let actions = collect_actions(effects).await;
        assert!(matches!(
            actions.as_slice(),
            [SessionAction::Login { email, password }] if email == "a@b.com" && password.expose() == "pw"
        ));
    }

    fn signup(email: &str) -> SessionAction {
        SessionAction::Signup {
            email: email.to_string(),
            password: Password::new("pw123456"),
            name: "Ada".to_string(),
        }
    }

    #[tokio::test]
    async fn rejected_signup_keeps_gateway_message_and_skips_login() {
        let harness = Harness::new();
        harness.gateway.fail(
            Operation::Signup,
            GatewayError::from_status(409, "Email already registered"),
        );

        ReducerTest::new(SessionReducer::new())
            .with_env(harness.env())
            .given_state(SessionState::default())
            .when_action(signup("ada@example.com"))
            .then_follow_ups(|actions| {
                assert!(matches!(actions, [SessionAction::SignupFailed { .. }]));
            })
            .then_state(|state| {
                assert!(!state.in_flight);
                assert!(!state.is_authenticated());
                assert_eq!(state.error.as_ref().unwrap().message(), "Email already registered");
            })
            .settle()
            .await;

        assert_eq!(harness.gateway.calls_to(Operation::Signup), 1);
        assert_eq!(harness.gateway.calls_to(Operation::Login), 0);
        assert!(!harness.credentials.is_present());
    }

    #[tokio::test]
    async fn signup_then_failed_login_leaves_account_signed_out() {
        let harness = Harness::new();
        harness
            .gateway
            .respond(Operation::Signup, json!({ "success": true, "data": { "userId": "u-9" } }))
            .fail(
                Operation::Login,
                GatewayError::authentication("Invalid email or password"),
            );

        ReducerTest::new(SessionReducer::new())
            .with_env(harness.env())
            .given_state(SessionState::default())
            .when_action(signup("ada@example.com"))
            .then_follow_ups(|actions| {
                assert!(matches!(
                    actions,
                    [
                        SessionAction::SignedUp { .. },
                        SessionAction::Login { .. },
                        SessionAction::LoginFailed { .. },
                    ]
                ));
            })
            .then_state(|state| {
                assert!(!state.in_flight);
                assert!(!state.is_authenticated());
                assert_eq!(
                    state.error,
                    Some(GatewayError::authentication("Invalid email or password"))
                );
            })
            .settle()
            .await;

        assert_eq!(
            harness.gateway.calls(),
            vec![
                RecordedCall::Signup(SignupRequest {
                    email: "ada@example.com".to_string(),
                    password: "pw123456".to_string(),
                    name: "Ada".to_string(),
                }),
                RecordedCall::Login(LoginRequest {
                    email: "ada@example.com".to_string(),
                    password: "pw123456".to_string(),
                }),
            ]
        );
        assert_eq!(harness.token_store.current(), None);
        assert!(!harness.credentials.is_present());
    }

    #[tokio::test]
    async fn logout_forgets_everything() {
        let harness = Harness::new();
        harness.token_store.save("t").unwrap();
        harness
            .credentials
            .install(Credentials::from_token(BearerToken::new("t").unwrap()));

        let mut state = signed_in();
        let effects = SessionReducer::new().reduce(&mut state, SessionAction::Logout, &harness.env());

        assert!(!state.is_authenticated());
        assert_eq!(state.user_id, None);
        assert_eq!(state.navigate_to, Some(Screen::Entry));
        assert_eq!(state.error, None);
        assert!(harness.gateway.calls().is_empty());

        collect_actions(effects).await;
        assert!(!harness.credentials.is_present());
        assert_eq!(harness.token_store.current(), None);
    }

    #[test]
    fn expire_explains_itself() {
        ReducerTest::new(SessionReducer::new())
            .with_env(Harness::new().env())
            .given_state(signed_in())
            .when_action(SessionAction::Expire)
            .then_state(|state| {
                assert!(!state.is_authenticated());
                assert_eq!(state.navigate_to, Some(Screen::Entry));
                assert_eq!(
                    state.error,
                    Some(GatewayError::authentication(SESSION_EXPIRED))
                );
            })
            .run();
    }

    #[tokio::test]
    async fn restore_trusts_persisted_token() {
        let harness = Harness {
            token_store: MemoryTokenStore::with_token(token_for(&json!({ "userId": "u-5" }))),
            ..Harness::new()
        };
        let env = harness.env();

        let mut state = SessionState::default();
        let reducer = SessionReducer::new();
        let actions = collect_actions(reducer.reduce(&mut state, SessionAction::Restore, &env)).await;
        for action in actions {
            collect_actions(reducer.reduce(&mut state, action, &env)).await;
        }

        assert!(state.is_authenticated());
        assert_eq!(state.user_id.as_deref(), Some("u-5"));
        assert!(harness.credentials.is_present());
        assert!(harness.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn restore_without_token_stays_anonymous() {
        let harness = Harness::new();
        let mut state = SessionState::default();
        let reducer = SessionReducer::new();
        let actions = collect_actions(reducer.reduce(&mut state, SessionAction::Restore, &harness.env())).await;

        assert!(matches!(actions.as_slice(), [SessionAction::Restored { token: None }]));
        assert!(!state.is_authenticated());
    }
}
