//! # Billetterie Testing
//!
//! Testing utilities for billetterie reducers:
//! - [`ReducerTest`]: Given/When/Then harness
//! - [`assertions`]: effect assertion helpers
//! - [`run_effects`]: execute effects in place and collect their actions
//! - [`FixedClock`]: deterministic time
//!
//! ## Example
//!
//! ```ignore
//! use billetterie_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(AdminAuthReducer::new(GuardPolicy::Verified))
//!     .with_env(environment_with(test_clock()))
//!     .given_state(AuthState::default())
//!     .when_action(AuthAction::Logout { correlation_id, token })
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

use billetterie_core::environment::Clock;
use chrono::{DateTime, Utc};

pub mod effects;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use billetterie_testing::mocks::FixedClock;
    /// use billetterie_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// A clock fixed `by` later than this one
        #[must_use]
        pub fn advanced(&self, by: chrono::Duration) -> Self {
            Self::new(self.time + by)
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(1_735_689_600))
    }
}

// Re-export commonly used items
pub use effects::run_effects;
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};
