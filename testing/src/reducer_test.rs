//! Given-When-Then harness for reducers

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use crate::helpers::collect_actions;
use event_vibe_core::{effect::Effect, reducer::Reducer};

type StateAssertion<S> = Box<dyn FnOnce(&S)>;

type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use event_vibe_testing::ReducerTest;
///
/// ReducerTest::new(AuthReducer::new())
///     .with_env(test_environment())
///     .given_state(AuthState::default())
///     .when_action(AuthAction::SignOut { session_id })
///     .then_effects(|effects| assertions::assert_has_future_effect(effects))
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    pub fn run(self) {
        let _ = self.reduce();
    }

    /// Run the assertions, then execute the effects and return the actions
    /// they produce.
    ///
    /// # Panics
    ///
    /// Same as [`ReducerTest::run`].
    pub async fn run_collecting(self) -> Vec<A>
    where
        A: Send + 'static,
    {
        let effects = self.reduce();
        collect_actions(effects).await
    }

    #[allow(clippy::expect_used)] // Test harness
    fn reduce(self) -> Vec<Effect<A>> {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let action = self.action.expect("Action must be set with when_action()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let effects = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.effect_assertions {
            assertion(&effects);
        }

        effects.into_vec()
    }
}

/// Helper assertions for effects
pub mod assertions {
    use event_vibe_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect other than [`Effect::None`] is present.
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found, at any nesting depth.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        fn has_future<A>(effect: &Effect<A>) -> bool {
            match effect {
                Effect::Future(_) => true,
                Effect::Parallel(inner) | Effect::Sequential(inner) => inner.iter().any(has_future),
                Effect::None => false,
            }
        }

        assert!(
            effects.iter().any(has_future),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_vibe_core::{smallvec, SmallVec};

    #[derive(Clone, Debug, PartialEq)]
    enum Light {
        Off,
        On,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Switch {
        Flip,
        Flipped(Light),
    }

    struct SwitchReducer;

    impl Reducer for SwitchReducer {
        type State = Light;
        type Action = Switch;
        type Environment = ();

        fn reduce(&self, state: &mut Light, action: Switch, _env: &()) -> SmallVec<[Effect<Switch>; 4]> {
            match action {
                Switch::Flip => {
                    *state = if *state == Light::Off { Light::On } else { Light::Off };
                    let now = state.clone();
                    smallvec![Effect::future(async move { Some(Switch::Flipped(now)) })]
                }
                Switch::Flipped(_) => smallvec![Effect::None],
            }
        }
    }

    #[test]
    fn test_flip_turns_light_on() {
        ReducerTest::new(SwitchReducer)
            .with_env(())
            .given_state(Light::Off)
            .when_action(Switch::Flip)
            .then_state(|state| assert_eq!(*state, Light::On))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_feedback_action_has_no_effects() {
        ReducerTest::new(SwitchReducer)
            .with_env(())
            .given_state(Light::On)
            .when_action(Switch::Flipped(Light::On))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[tokio::test]
    async fn test_run_collecting_returns_feedback_actions() {
        let actions = ReducerTest::new(SwitchReducer)
            .with_env(())
            .given_state(Light::On)
            .when_action(Switch::Flip)
            .run_collecting()
            .await;

        assert_eq!(actions, vec![Switch::Flipped(Light::Off)]);
    }
}
