//! # Taskdeck Testing
//!
//! Testing utilities and helpers for the taskdeck architecture.
//!
//! This crate provides:
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for effects
//! - Property helpers for reducer purity
//!
//! ## Example
//!
//! ```ignore
//! use taskdeck_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::default())
//!     .given_state(TodoState::default())
//!     .when_action(TodoAction::StartRequest)
//!     .then_state(|state| assert!(state.is_saving))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Property-based testing helpers
pub mod properties {
    use taskdeck_core::reducer::Reducer;

    /// Assert that reducing `action` on two copies of `state` yields equal states
    /// and the same number of effects.
    ///
    /// # Panics
    ///
    /// Panics if the two runs diverge.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_deterministic<R>(
        reducer: &R,
        env: &R::Environment,
        state: &R::State,
        action: &R::Action,
    ) where
        R: Reducer,
        R::State: Clone + PartialEq + std::fmt::Debug,
        R::Action: Clone,
    {
        let mut first = state.clone();
        let mut second = state.clone();

        let first_effects = reducer.reduce(&mut first, action.clone(), env);
        let second_effects = reducer.reduce(&mut second, action.clone(), env);

        assert_eq!(first, second, "reducer produced different states for equal inputs");
        assert_eq!(
            first_effects.len(),
            second_effects.len(),
            "reducer produced different effect counts for equal inputs"
        );
    }
}
