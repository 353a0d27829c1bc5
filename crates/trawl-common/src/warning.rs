//! Deduplicated parser warnings.
//!
//! Malformed markup tends to repeat itself (a page with one stray label usually
//! has several), so each distinct message is emitted once through `tracing`
//! until [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Emit a warning once per unique `(component, message)` pair.
///
/// # Example
/// ```ignore
/// warn_once("page", "label for 'email' matched no widget");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let first = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if first {
        tracing::warn!(target: "trawl", component, "{message}");
    }
}

/// Whether this exact warning has been emitted since the last clear.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Forget every recorded warning (call when loading a new page).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
