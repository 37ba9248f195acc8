//! In-flight tracking for requests that change backend state.
//!
//! A row toggle or a playlist action is "in flight" from the moment the
//! request is issued until its result comes back.  While in flight the same
//! key cannot start a second request, and the UI renders a pulsing marker
//! instead of flipping anything.  Local state changes only once the backend
//! confirms.
//!
//! Page loads are fenced by a [`MountGuard`]: every mount hands out a
//! [`FetchTicket`], and results carrying an older ticket are dropped.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

/// At most one outstanding request per key.
#[derive(Debug)]
pub struct InFlight<K> {
    pending: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Mark `key` as in flight.  Returns `false` (and changes nothing) when a
    /// request for `key` is already outstanding.
    pub fn try_begin(&mut self, key: K) -> bool {
        if self.pending.contains_key(&key) {
            return false;
        }
        self.pending.insert(key, Instant::now());
        true
    }

    /// Clear `key`.  Returns `true` if it was in flight.
    pub fn finish(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn render_hint(&self, key: &K) -> RenderHint {
        match self.pending.get(key) {
            Some(since) => RenderHint::pulse(*since),
            None => RenderHint::Normal,
        }
    }
}

impl<K: Eq + Hash + Clone> Default for InFlight<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-slot guard for actions that are not tied to a row.
#[derive(Debug, Default)]
pub struct ActionGuard {
    since: Option<Instant>,
}

impl ActionGuard {
    pub fn try_begin(&mut self) -> bool {
        if self.since.is_some() {
            return false;
        }
        self.since = Some(Instant::now());
        true
    }

    pub fn finish(&mut self) {
        self.since = None;
    }

    pub fn is_active(&self) -> bool {
        self.since.is_some()
    }

    pub fn render_hint(&self) -> RenderHint {
        self.since.map_or(RenderHint::Normal, RenderHint::pulse)
    }
}

/// Proof that a fetch was started by a particular mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Generation counter bumped on every mount and unmount.
#[derive(Debug, Default)]
pub struct MountGuard {
    generation: u64,
    mounted: bool,
}

impl MountGuard {
    pub fn mount(&mut self) -> FetchTicket {
        self.generation += 1;
        self.mounted = true;
        FetchTicket {
            generation: self.generation,
        }
    }

    pub fn unmount(&mut self) {
        self.generation += 1;
        self.mounted = false;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when `ticket` belongs to the current mount.
    pub fn accepts(&self, ticket: FetchTicket) -> bool {
        self.mounted && ticket.generation == self.generation
    }
}

/// Where a page's initial fetch stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Not mounted.
    #[default]
    Idle,
    /// Mounted without a session; nothing was requested.
    LoggedOut,
    Loading,
    Loaded,
    Failed(String),
}

/// How to render something that may be waiting on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderHint {
    Normal,
    /// In flight, marker shown (pulse-on frame).
    PendingVisible,
    /// In flight, marker hidden (pulse-off frame).
    PendingHidden,
}

impl RenderHint {
    fn pulse(since: Instant) -> Self {
        // Pulse on/off every 400ms
        if (since.elapsed().as_millis() / 400) % 2 == 0 {
            RenderHint::PendingVisible
        } else {
            RenderHint::PendingHidden
        }
    }

    pub fn is_pending(self) -> bool {
        !matches!(self, RenderHint::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected_until_finish() {
        let mut rows: InFlight<&str> = InFlight::new();
        assert!(rows.try_begin("t1"));
        assert!(!rows.try_begin("t1"));
        assert!(rows.try_begin("t2"));
        assert_eq!(rows.len(), 2);

        assert!(rows.finish(&"t1"));
        assert!(!rows.finish(&"t1"));
        assert!(rows.try_begin("t1"));
    }

    #[test]
    fn test_render_hint_only_for_pending_keys() {
        let mut rows: InFlight<u32> = InFlight::new();
        rows.try_begin(1);
        assert!(rows.render_hint(&1).is_pending());
        assert_eq!(rows.render_hint(&2), RenderHint::Normal);
        rows.clear();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_action_guard() {
        let mut guard = ActionGuard::default();
        assert!(guard.try_begin());
        assert!(!guard.try_begin());
        assert!(guard.is_active());
        guard.finish();
        assert!(!guard.is_active());
        assert!(guard.try_begin());
    }

    #[test]
    fn test_stale_tickets_are_refused() {
        let mut guard = MountGuard::default();
        let first = guard.mount();
        assert!(guard.accepts(first));

        guard.unmount();
        assert!(!guard.accepts(first));

        let second = guard.mount();
        assert!(!guard.accepts(first));
        assert!(guard.accepts(second));
    }
}
