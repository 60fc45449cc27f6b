//! Application state shared by all handlers.

use crate::backend::{AnyRateLimiter, AnySessionStore, Backend, InMemoryBackend};
use crate::error::AppError;
use event_vibe_auth::memory::{
    InMemoryIdentityProvider, InMemoryProfileRepository, InMemoryRateLimiter, InMemorySessionStore,
};
use event_vibe_auth::providers::EmailProvider;
use event_vibe_auth::{AuthAction, AuthConfig, AuthEnvironment, AuthOutcome, AuthReducer, AuthState};
use event_vibe_core::environment::{Clock, SystemClock};
use event_vibe_events::{
    InMemoryEventRepository, InMemoryRegistrationRepository, RegistrationAction, RegistrationEnvironment,
    RegistrationReducer, RegistrationState,
};
use event_vibe_recommend::{ClaudeRecommendationModel, Recommender};
use event_vibe_runtime::Store;
use std::sync::Arc;
use std::time::Duration;

/// Auth environment for backend `B`.
pub type BackendAuthEnvironment<B> = AuthEnvironment<
    <B as Backend>::Identity,
    <B as Backend>::Profiles,
    <B as Backend>::Email,
    <B as Backend>::Sessions,
    <B as Backend>::RateLimiter,
>;

/// Auth reducer for backend `B`.
pub type BackendAuthReducer<B> = AuthReducer<
    <B as Backend>::Identity,
    <B as Backend>::Profiles,
    <B as Backend>::Email,
    <B as Backend>::Sessions,
    <B as Backend>::RateLimiter,
>;

/// One auth flow.
pub type AuthStore<B> = Store<AuthState, AuthAction, BackendAuthEnvironment<B>, BackendAuthReducer<B>>;

/// One registration flow.
pub type RegistrationStore<B> = Store<
    RegistrationState,
    RegistrationAction,
    RegistrationEnvironment<<B as Backend>::Events, <B as Backend>::Registrations>,
    RegistrationReducer<<B as Backend>::Events, <B as Backend>::Registrations>,
>;

/// How `/ready` decides whether the server can take traffic.
#[derive(Clone, Debug, Default)]
pub enum Readiness {
    /// Nothing external to check.
    #[default]
    Always,
    /// Ping the database.
    #[cfg(feature = "postgres")]
    Postgres(sqlx::PgPool),
}

impl Readiness {
    /// Whether dependencies answer.
    pub async fn check(&self) -> bool {
        match self {
            Self::Always => true,
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
        }
    }
}

/// Shared state: provider handles plus settings.
///
/// Every flow gets a fresh [`Store`] built from clones of these handles, so
/// requests never share flow state.
pub struct AppState<B: Backend> {
    /// Accounts and verification codes.
    pub identity: B::Identity,
    /// Profile documents.
    pub profiles: B::Profiles,
    /// Verification mail.
    pub email: B::Email,
    /// Sessions.
    pub sessions: B::Sessions,
    /// Resend throttling.
    pub rate_limiter: B::RateLimiter,
    /// Published events.
    pub events: B::Events,
    /// Registrations.
    pub registrations: B::Registrations,
    /// Time source for every flow.
    pub clock: Arc<dyn Clock>,
    /// Auth flow settings.
    pub auth_config: AuthConfig,
    /// Recommendation service.
    pub recommender: Recommender<ClaudeRecommendationModel>,
    /// How long a handler waits for a flow to finish.
    pub flow_timeout: Duration,
    /// Readiness check.
    pub readiness: Readiness,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            profiles: self.profiles.clone(),
            email: self.email.clone(),
            sessions: self.sessions.clone(),
            rate_limiter: self.rate_limiter.clone(),
            events: self.events.clone(),
            registrations: self.registrations.clone(),
            clock: Arc::clone(&self.clock),
            auth_config: self.auth_config.clone(),
            recommender: self.recommender.clone(),
            flow_timeout: self.flow_timeout,
            readiness: self.readiness.clone(),
        }
    }
}

/// Default wait for a flow's terminal action.
pub const DEFAULT_FLOW_TIMEOUT: Duration = Duration::from_secs(10);

impl<E> AppState<InMemoryBackend<E>>
where
    E: EmailProvider + Clone + 'static,
{
    /// Everything in memory, all providers reading time from `clock`.
    #[must_use]
    pub fn in_memory(
        email: E,
        clock: Arc<dyn Clock>,
        auth_config: AuthConfig,
        recommender: Recommender<ClaudeRecommendationModel>,
    ) -> Self {
        let identity = InMemoryIdentityProvider::new()
            .with_clock(Arc::clone(&clock))
            .with_code_ttl(auth_config.verification_code_ttl);
        Self {
            identity,
            profiles: InMemoryProfileRepository::new(),
            email,
            sessions: AnySessionStore::Memory(InMemorySessionStore::new().with_clock(Arc::clone(&clock))),
            rate_limiter: AnyRateLimiter::Memory(InMemoryRateLimiter::new().with_clock(Arc::clone(&clock))),
            events: InMemoryEventRepository::new(),
            registrations: InMemoryRegistrationRepository::new(),
            clock,
            auth_config,
            recommender,
            flow_timeout: DEFAULT_FLOW_TIMEOUT,
            readiness: Readiness::Always,
        }
    }

    /// Same, on the wall clock.
    #[must_use]
    pub fn in_memory_system_clock(
        email: E,
        auth_config: AuthConfig,
        recommender: Recommender<ClaudeRecommendationModel>,
    ) -> Self {
        Self::in_memory(email, Arc::new(SystemClock), auth_config, recommender)
    }
}

impl<B: Backend> AppState<B> {
    /// Builder: session store.
    #[must_use]
    pub fn with_sessions(mut self, sessions: B::Sessions) -> Self {
        self.sessions = sessions;
        self
    }

    /// Builder: rate limiter.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: B::RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Builder: flow timeout.
    #[must_use]
    pub const fn with_flow_timeout(mut self, timeout: Duration) -> Self {
        self.flow_timeout = timeout;
        self
    }

    /// A store for one auth flow.
    #[must_use]
    pub fn auth_store(&self) -> AuthStore<B> {
        let env = AuthEnvironment::new(
            self.identity.clone(),
            self.profiles.clone(),
            self.email.clone(),
            self.sessions.clone(),
            self.rate_limiter.clone(),
            Arc::clone(&self.clock),
        );
        Store::new(AuthState::default(), AuthReducer::new(self.auth_config.clone()), env)
    }

    /// Run `action` through a fresh auth flow and return how it ended.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] when the flow does not finish in time. Flow
    /// failures are returned as [`AuthOutcome::Failed`].
    pub async fn run_auth(&self, action: AuthAction) -> Result<AuthOutcome, AppError> {
        let store = self.auth_store();
        let terminal = store
            .send_and_wait_for(action, AuthAction::is_terminal, self.flow_timeout)
            .await?;
        terminal
            .outcome()
            .ok_or_else(|| AppError::internal("An unexpected error occurred. Please try again."))
    }

    /// A store for one registration flow.
    #[must_use]
    pub fn registration_store(&self) -> RegistrationStore<B> {
        let env = RegistrationEnvironment::new(
            self.events.clone(),
            self.registrations.clone(),
            Arc::clone(&self.clock),
        );
        Store::new(RegistrationState::default(), RegistrationReducer::new(), env)
    }

    /// Run `action` through a fresh registration flow.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] when the flow does not finish in time.
    pub async fn run_registration(&self, action: RegistrationAction) -> Result<RegistrationAction, AppError> {
        let store = self.registration_store();
        Ok(store
            .send_and_wait_for(action, RegistrationAction::is_terminal, self.flow_timeout)
            .await?)
    }
}
