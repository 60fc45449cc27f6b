//! # Event Vibe Runtime
//!
//! The [`Store`] owns a flow's state, runs its reducer, executes the returned
//! effects and feeds effect results back in as new actions.
//!
//! HTTP handlers build one store per request and use
//! [`Store::send_and_wait_for`] to turn a command into its terminal result:
//!
//! ```ignore
//! let store = Store::new(RegistrationState::default(), RegistrationReducer::new(), env);
//! let result = store
//!     .send_and_wait_for(
//!         RegistrationAction::Register { user_id, event_id },
//!         RegistrationAction::is_terminal,
//!         Duration::from_secs(5),
//!     )
//!     .await?;
//! ```

use event_vibe_core::effect::Effect;
use event_vibe_core::reducer::Reducer;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Default capacity of the action broadcast channel.
const BROADCAST_CAPACITY: usize = 16;

/// The Store - runtime for a reducer
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
    /// Every action produced by an effect is broadcast here after it has
    /// been reduced, so observers always see state that includes it.
    action_broadcast: broadcast::Sender<A>,
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
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + std::fmt::Debug + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        let (action_broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            action_broadcast,
        }
    }

    /// Send an action to the store
    ///
    /// The action is reduced under the state write lock; the resulting
    /// effects are spawned and run in the background.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) {
        let effects = {
            let mut state = self.state.write().await;
            tracing::trace!(?action, "Reducing action");
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        metrics::counter!("store.actions.processed").increment(1);

        for effect in effects {
            if effect.is_none() {
                continue;
            }
            tokio::spawn(self.execute_effect(effect));
        }
    }

    /// Send an action and wait for a matching result action
    ///
    /// Subscribes to the action broadcast BEFORE sending, then returns the
    /// first effect-produced action for which `predicate` holds.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: Timeout expired before matching action received
    /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        let mut rx = self.subscribe_actions();

        self.send(action).await;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    }
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to all actions produced by effects
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Read the current state
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    fn execute_effect(&self, effect: Effect<A>) -> BoxFuture<'static, ()> {
        let store = self.clone();

        Box::pin(async move {
            match effect {
                Effect::None => {}
                Effect::Future(future) => {
                    metrics::counter!("store.effects.executed").increment(1);
                    if let Some(action) = future.await {
                        store.feed_back(action).await;
                    }
                }
                Effect::Sequential(effects) => {
                    for effect in effects {
                        store.execute_effect(effect).await;
                    }
                }
                Effect::Parallel(effects) => {
                    futures::future::join_all(
                        effects.into_iter().map(|effect| store.execute_effect(effect)),
                    )
                    .await;
                }
            }
        })
    }

    async fn feed_back(&self, action: A) {
        self.send(action.clone()).await;
        // No receivers is fine: nobody is waiting on this flow.
        let _ = self.action_broadcast.send(action);
    }
}
