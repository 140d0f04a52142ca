use std::{
    fmt,
    sync::atomic::{AtomicU8, Ordering},
};

/// Lifecycle of the entity index.
///
/// `NotStarted → Building → Ready` or `NotStarted → Building → Failed`.
/// `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IndexStatus {
    NotStarted = 0,
    Building = 1,
    Ready = 2,
    Failed = 3,
}

impl IndexStatus {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Building,
            2 => Self::Ready,
            _ => Self::Failed,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Building => "building",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder for [`IndexStatus`].
///
/// Leaving `NotStarted` is a compare-and-swap, so exactly one caller wins the
/// right to build. Completion is a release store; readers load with acquire and
/// therefore see everything the builder published before it.
#[derive(Debug)]
pub struct InitState(AtomicU8);

impl Default for InitState {
    fn default() -> Self {
        Self(AtomicU8::new(IndexStatus::NotStarted as u8))
    }
}

impl InitState {
    pub fn get(&self) -> IndexStatus {
        IndexStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    /// `NotStarted → Building`. Returns `false` if any other caller already
    /// started (or finished) a build.
    pub fn try_begin(&self) -> bool {
        self.0
            .compare_exchange(
                IndexStatus::NotStarted as u8,
                IndexStatus::Building as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// `Building → Ready` or `Building → Failed`. Returns `false` (and leaves
    /// the state untouched) when not currently building.
    pub fn finish(&self, outcome: IndexStatus) -> bool {
        debug_assert!(outcome.is_terminal(), "finish() needs a terminal status");
        self.0
            .compare_exchange(
                IndexStatus::Building as u8,
                outcome as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let state = InitState::default();
        assert_eq!(state.get(), IndexStatus::NotStarted);
        assert!(state.try_begin());
        assert_eq!(state.get(), IndexStatus::Building);
        assert!(state.finish(IndexStatus::Ready));
        assert_eq!(state.get(), IndexStatus::Ready);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let state = InitState::default();
        assert!(state.try_begin());
        assert!(state.finish(IndexStatus::Failed));

        assert!(!state.try_begin());
        assert!(!state.finish(IndexStatus::Ready));
        assert_eq!(state.get(), IndexStatus::Failed);
    }

    #[test]
    fn test_second_begin_is_absorbed() {
        let state = InitState::default();
        assert!(state.try_begin());
        assert!(!state.try_begin());
        assert_eq!(state.get(), IndexStatus::Building);
    }

    #[test]
    fn test_only_one_concurrent_caller_begins() {
        let state = Arc::new(InitState::default());
        let barrier = Arc::new(Barrier::new(8));
        let handles = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    state.try_begin()
                })
            })
            .collect::<Vec<_>>();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(IndexStatus::Ready.to_string(), "ready");
        assert!(!IndexStatus::Building.is_terminal());
        assert!(IndexStatus::Failed.is_terminal());
    }
}
