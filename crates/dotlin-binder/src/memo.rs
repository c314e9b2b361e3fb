//! Set-once cells with an explicit "in progress" state.
//!
//! Analysis of one declaration can trigger analysis of another, which may lead back
//! to the first. A [`Memo`] remembers that its computation has started, so a
//! re-entrant request observes [`MemoState::InProgress`] instead of recursing.

use std::cell::RefCell;

use dotlin_core::{Diagnostic, InternalResult};

/// State of a memoized fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoState<T> {
    /// Not requested yet.
    Unknown,
    /// Being computed further up the call stack.
    InProgress,
    /// Computed; never recomputed.
    Computed(T),
}

/// A fact computed at most once per compilation.
#[derive(Debug)]
pub struct Memo<T> {
    state: RefCell<MemoState<T>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            state: RefCell::new(MemoState::Unknown),
        }
    }
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> MemoState<T> {
        self.state.borrow().clone()
    }

    /// The value, if computed.
    pub fn get(&self) -> Option<T> {
        match &*self.state.borrow() {
            MemoState::Computed(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(*self.state.borrow(), MemoState::InProgress)
    }

    /// Compute the value unless it is known or already being computed.
    ///
    /// Returns `Ok(None)` on re-entry. If `compute` fails the memo returns to
    /// [`MemoState::Unknown`].
    pub fn compute(&self, compute: impl FnOnce() -> InternalResult<T>) -> InternalResult<Option<T>> {
        match self.state() {
            MemoState::Computed(value) => return Ok(Some(value)),
            MemoState::InProgress => return Ok(None),
            MemoState::Unknown => {}
        }

        *self.state.borrow_mut() = MemoState::InProgress;
        match compute() {
            Ok(value) => {
                *self.state.borrow_mut() = MemoState::Computed(value.clone());
                Ok(Some(value))
            }
            Err(err) => {
                *self.state.borrow_mut() = MemoState::Unknown;
                Err(err)
            }
        }
    }
}

/// The three analysis phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Local resolution.
    One,
    /// Typing and dispatch.
    Two,
    /// Deferred validation.
    Three,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::One, Phase::Two, Phase::Three];

    fn slot(self) -> usize {
        match self {
            Phase::One => 0,
            Phase::Two => 1,
            Phase::Three => 2,
        }
    }
}

/// Per-declaration phase results.
///
/// Each phase runs once; later calls get the stored diagnostics back. A phase
/// triggered lazily from elsewhere discards its result there, and the analysis
/// pass picks the stored diagnostics up when it reaches the declaration.
#[derive(Debug, Default)]
pub struct PhaseCache {
    phases: [Memo<Vec<Diagnostic>>; 3],
}

impl PhaseCache {
    /// Run `phase` unless it already ran. `Ok(None)` means the phase is running
    /// further up the call stack.
    pub fn run(
        &self,
        phase: Phase,
        analyse: impl FnOnce() -> InternalResult<Vec<Diagnostic>>,
    ) -> InternalResult<Option<Vec<Diagnostic>>> {
        self.phases[phase.slot()].compute(analyse)
    }

    pub fn is_complete(&self, phase: Phase) -> bool {
        self.phases[phase.slot()].get().is_some()
    }

    pub fn is_running(&self, phase: Phase) -> bool {
        self.phases[phase.slot()].is_in_progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlin_core::InternalError;

    #[test]
    fn computes_once() {
        let memo = Memo::new();
        let mut calls = 0;
        assert_eq!(
            memo.compute(|| {
                calls += 1;
                Ok(7)
            })
            .unwrap(),
            Some(7)
        );
        assert_eq!(memo.compute(|| Ok(8)).unwrap(), Some(7));
        assert_eq!(calls, 1);
        assert_eq!(memo.state(), MemoState::Computed(7));
    }

    #[test]
    fn reentry_observes_in_progress() {
        let memo: Memo<u32> = Memo::new();
        let inner = memo
            .compute(|| {
                assert!(memo.is_in_progress());
                Ok(memo.compute(|| Ok(1))?.unwrap_or(0))
            })
            .unwrap();
        assert_eq!(inner, Some(0));
    }

    #[test]
    fn failure_resets_state() {
        let memo: Memo<u32> = Memo::new();
        let err = memo.compute(|| Err(InternalError::NoTypesGiven)).unwrap_err();
        assert_eq!(err, InternalError::NoTypesGiven);
        assert_eq!(memo.state(), MemoState::Unknown);
        assert_eq!(memo.compute(|| Ok(3)).unwrap(), Some(3));
    }

    #[test]
    fn phase_cache_returns_stored_diagnostics() {
        let cache = PhaseCache::default();
        assert!(!cache.is_complete(Phase::Two));
        let first = cache.run(Phase::Two, || Ok(Vec::new())).unwrap();
        assert_eq!(first, Some(Vec::new()));
        assert!(cache.is_complete(Phase::Two));
        assert!(!cache.is_complete(Phase::One));
    }
}
