//! Stack safety for the recursive evaluator.
//!
//! Script recursion maps onto native recursion, several frames per call.
//! `stacker` grows the native stack on demand so deep but finite recursion
//! completes, and a call depth limit turns runaway recursion into an error
//! value instead of unbounded memory growth.

use std::cell::Cell;

use crate::object::EvaluationError;

/// Deepest nesting of user function calls before evaluation fails.
pub const MAX_CALL_DEPTH: usize = 25_000;

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (100KB red zone).
    const RED_ZONE: usize = 100 * 1024;

    /// Stack space to allocate when growing (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// One level of user function call. Dropping it leaves the level, so the
/// count stays right when an error or `return` unwinds the call.
pub struct CallDepthGuard {
    depth: usize,
}

impl CallDepthGuard {
    pub fn enter() -> Result<Self, EvaluationError> {
        CALL_DEPTH.with(|current| {
            let depth = current.get();
            if depth >= MAX_CALL_DEPTH {
                return Err(EvaluationError::CallDepthExceeded(MAX_CALL_DEPTH));
            }
            current.set(depth + 1);
            Ok(CallDepthGuard { depth: depth + 1 })
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for CallDepthGuard {
    fn drop(&mut self) {
        CALL_DEPTH.with(|current| current.set(current.get().saturating_sub(1)));
    }
}
