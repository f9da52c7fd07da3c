//! Process-wide (thread-local) last-error slot.
//!
//! Mirrors the original API's `zimg_get_last_error`/`zimg_clear_last_error` pair:
//! any fallible entry point that returns an error also stashes it here before
//! returning, so callers that only check a return code can still recover the
//! failure detail afterwards.

use std::cell::RefCell;

use crate::error::{Error, ErrorCode};

thread_local! {
    static LAST_ERROR: RefCell<Option<(ErrorCode, String)>> = const { RefCell::new(None) };
}

/// Records `err` in the calling thread's last-error slot. Called internally
/// by every fallible public entry point; not normally called by users.
pub fn set_last_error(err: &Error) {
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = Some((err.code(), err.to_string()));
    });
}

/// Returns the calling thread's last recorded error, if any.
pub fn last_error() -> Option<(ErrorCode, String)> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Clears the calling thread's last-error slot.
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}
