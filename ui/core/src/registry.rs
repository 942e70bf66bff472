//! Window Registry - Top-Level Window Tracking and Stacking
//!
//! The registry tracks every open top-level window and hands out stacking
//! values (z-indices) when a window is brought to the front.
//!
//! # Z-order policy
//!
//! ```text
//!   counter ──► bring_to_front(id) ──► min(counter + 1, ceiling)
//!
//!   registry empties ──► counter = floor - 1   (next window gets `floor`)
//! ```
//!
//! Windows that reach the ceiling share the same z-index; among those the
//! most recently raised window is on top.
//!
//! # Thread Safety
//!
//! The registry is an explicit, shareable state object rather than a global.
//! All state sits behind one `parking_lot::Mutex`, and every operation that
//! reads and then bumps the counter does so under a single lock acquisition.
//! The lock is never held across an `.await`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Stacking value for a window
pub type ZIndex = u32;

/// Lowest z-index handed to a window
pub const DEFAULT_Z_FLOOR: ZIndex = 100;

/// Highest z-index handed to a window
pub const DEFAULT_Z_CEILING: ZIndex = 9999;

/// Unique identifier for an application window
///
/// Assigned once at construction, strictly increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    /// Create a window ID from a raw value (for testing or deserialization)
    #[must_use]
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Floor and ceiling for z-index assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZOrderPolicy {
    /// First z-index given out after the registry empties
    pub floor: ZIndex,
    /// Maximum z-index
    pub ceiling: ZIndex,
}

impl Default for ZOrderPolicy {
    fn default() -> Self {
        Self {
            floor: DEFAULT_Z_FLOOR,
            ceiling: DEFAULT_Z_CEILING,
        }
    }
}

impl ZOrderPolicy {
    /// The nearest usable policy: `1 <= floor <= ceiling`
    ///
    /// A zero ceiling becomes 1, and the floor is clamped into
    /// `1..=ceiling`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let ceiling = self.ceiling.max(1);
        Self {
            floor: self.floor.clamp(1, ceiling),
            ceiling,
        }
    }

    /// Whether the policy is already usable as given
    #[must_use]
    pub fn is_valid(&self) -> bool {
        *self == self.normalized()
    }

    /// Counter value that makes the next raise land exactly on the floor
    fn reset_value(&self) -> ZIndex {
        self.floor.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    z_index: Option<ZIndex>,
    /// Sequence number of the last raise, breaks ties at the ceiling
    raised_at: u64,
}

#[derive(Debug)]
struct RegistryState {
    windows: HashMap<WindowId, Entry>,
    max_z: ZIndex,
    next_id: u64,
    raise_seq: u64,
}

impl RegistryState {
    fn raise(&mut self, id: WindowId, policy: &ZOrderPolicy) -> Option<ZIndex> {
        if !self.windows.contains_key(&id) {
            return None;
        }

        let z = self.max_z.saturating_add(1).min(policy.ceiling);
        self.max_z = z;
        self.raise_seq += 1;

        let seq = self.raise_seq;
        let entry = self.windows.get_mut(&id)?;
        entry.z_index = Some(z);
        entry.raised_at = seq;
        Some(z)
    }
}

/// Snapshot of one registered window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEntry {
    /// Window identifier
    pub id: WindowId,
    /// Assigned z-index, if the window has been raised
    pub z_index: Option<ZIndex>,
}

/// Registry of open top-level windows
///
/// Clones share the same underlying state.
#[derive(Clone)]
pub struct WindowRegistry {
    policy: ZOrderPolicy,
    inner: Arc<Mutex<RegistryState>>,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("WindowRegistry")
            .field("policy", &self.policy)
            .field("open", &state.windows.len())
            .field("max_z", &state.max_z)
            .finish()
    }
}

impl WindowRegistry {
    /// Create a registry with the default z-order policy
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(ZOrderPolicy::default())
    }

    /// Create a registry with an explicit z-order policy
    ///
    /// An unusable policy (zero floor, floor above ceiling) is replaced by
    /// its [`normalized`](ZOrderPolicy::normalized) form.
    #[must_use]
    pub fn with_policy(policy: ZOrderPolicy) -> Self {
        let policy = if policy.is_valid() {
            policy
        } else {
            let normalized = policy.normalized();
            tracing::warn!(
                floor = policy.floor,
                ceiling = policy.ceiling,
                normalized_floor = normalized.floor,
                normalized_ceiling = normalized.ceiling,
                "Invalid z-order policy normalized"
            );
            normalized
        };

        Self {
            policy,
            inner: Arc::new(Mutex::new(RegistryState {
                windows: HashMap::new(),
                max_z: policy.reset_value(),
                next_id: 0,
                raise_seq: 0,
            })),
        }
    }

    /// Z-order policy in effect
    #[must_use]
    pub fn policy(&self) -> ZOrderPolicy {
        self.policy
    }

    /// Hand out the next window ID
    pub fn allocate_id(&self) -> WindowId {
        let mut state = self.inner.lock();
        state.next_id += 1;
        WindowId(state.next_id)
    }

    /// Track a window without assigning a z-index
    ///
    /// Returns false if the window was already registered.
    pub fn register(&self, id: WindowId) -> bool {
        let mut state = self.inner.lock();
        if state.windows.contains_key(&id) {
            return false;
        }
        state.windows.insert(
            id,
            Entry {
                z_index: None,
                raised_at: 0,
            },
        );
        tracing::debug!(window_id = %id, "Window registered");
        true
    }

    /// Stop tracking a window
    ///
    /// When the last window leaves, the counter drops back so the next
    /// window starts at the floor. Returns false if the window was unknown.
    pub fn unregister(&self, id: WindowId) -> bool {
        let mut state = self.inner.lock();
        if state.windows.remove(&id).is_none() {
            return false;
        }

        tracing::debug!(window_id = %id, "Window unregistered");
        if state.windows.is_empty() {
            state.max_z = self.policy.reset_value();
            tracing::debug!("Registry empty, z-order counter reset");
        }
        true
    }

    /// Give `id` the next z-index
    ///
    /// Returns `None` if the window is not registered.
    pub fn bring_to_front(&self, id: WindowId) -> Option<ZIndex> {
        let z = self.inner.lock().raise(id, &self.policy);
        if let Some(z) = z {
            tracing::debug!(window_id = %id, z_index = z, "Window brought to front");
        }
        z
    }

    /// Reset the counter if no windows are open
    ///
    /// Returns true if the reset happened.
    pub fn reset_if_empty(&self) -> bool {
        let mut state = self.inner.lock();
        if state.windows.is_empty() {
            state.max_z = self.policy.reset_value();
            true
        } else {
            false
        }
    }

    /// Register a window and raise it to the front in one step
    ///
    /// Applies the empty-registry reset first, so the first window of a
    /// session always lands on the floor.
    pub fn admit(&self, id: WindowId) -> ZIndex {
        let mut state = self.inner.lock();
        if state.windows.is_empty() {
            state.max_z = self.policy.reset_value();
        }
        state.windows.entry(id).or_insert(Entry {
            z_index: None,
            raised_at: 0,
        });

        let z = state
            .raise(id, &self.policy)
            .unwrap_or(self.policy.floor);
        tracing::debug!(window_id = %id, z_index = z, "Window admitted");
        z
    }

    /// Current z-index of a window
    #[must_use]
    pub fn z_index(&self, id: WindowId) -> Option<ZIndex> {
        self.inner.lock().windows.get(&id).and_then(|e| e.z_index)
    }

    /// Highest z-index handed out since the last reset
    #[must_use]
    pub fn current_z(&self) -> ZIndex {
        self.inner.lock().max_z
    }

    /// Whether a window is registered
    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool {
        self.inner.lock().windows.contains_key(&id)
    }

    /// Number of registered windows
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().windows.len()
    }

    /// Whether no windows are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().windows.is_empty()
    }

    /// Registered windows ordered front to back
    ///
    /// Windows that were never raised sort last, by ID.
    #[must_use]
    pub fn windows(&self) -> Vec<StackEntry> {
        let state = self.inner.lock();
        let mut entries: Vec<(WindowId, Entry)> =
            state.windows.iter().map(|(id, e)| (*id, *e)).collect();

        entries.sort_by(|(a_id, a), (b_id, b)| {
            b.z_index
                .cmp(&a.z_index)
                .then(b.raised_at.cmp(&a.raised_at))
                .then(a_id.cmp(b_id))
        });

        entries
            .into_iter()
            .map(|(id, e)| StackEntry {
                id,
                z_index: e.z_index,
            })
            .collect()
    }

    /// Frontmost window
    #[must_use]
    pub fn front(&self) -> Option<WindowId> {
        self.windows().first().map(|e| e.id)
    }

    /// Backmost window
    #[must_use]
    pub fn back(&self) -> Option<WindowId> {
        self.windows().last().map(|e| e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_strictly_increase() {
        let registry = WindowRegistry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        let c = registry.allocate_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_first_raise_lands_on_floor() {
        let registry = WindowRegistry::new();
        let id = registry.allocate_id();
        registry.register(id);

        assert_eq!(registry.z_index(id), None);
        assert_eq!(registry.bring_to_front(id), Some(DEFAULT_Z_FLOOR));
    }

    #[test]
    fn test_bring_to_front_unknown_window() {
        let registry = WindowRegistry::new();
        assert_eq!(registry.bring_to_front(WindowId::from_raw(7)), None);
        assert_eq!(registry.current_z(), DEFAULT_Z_FLOOR - 1);
    }

    #[test]
    fn test_register_twice() {
        let registry = WindowRegistry::new();
        let id = registry.allocate_id();
        assert!(registry.register(id));
        assert!(!registry.register(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_last_resets_counter() {
        let registry = WindowRegistry::new();
        let w1 = registry.allocate_id();
        assert_eq!(registry.admit(w1), DEFAULT_Z_FLOOR);
        registry.bring_to_front(w1);
        assert!(registry.unregister(w1));

        let w2 = registry.allocate_id();
        assert_eq!(registry.admit(w2), DEFAULT_Z_FLOOR);
    }

    #[test]
    fn test_unregister_unknown() {
        let registry = WindowRegistry::new();
        assert!(!registry.unregister(WindowId::from_raw(1)));
    }

    #[test]
    fn test_counter_clamped_at_ceiling() {
        let registry = WindowRegistry::with_policy(ZOrderPolicy {
            floor: 10,
            ceiling: 12,
        });
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert_eq!(registry.admit(a), 10);
        assert_eq!(registry.admit(b), 11);
        assert_eq!(registry.bring_to_front(a), Some(12));
        assert_eq!(registry.bring_to_front(b), Some(12));
        assert_eq!(registry.current_z(), 12);

        // b was raised last, so it wins the tie
        assert_eq!(registry.front(), Some(b));

        registry.bring_to_front(a);
        assert_eq!(registry.front(), Some(a));
        assert_eq!(registry.back(), Some(b));
    }

    #[test]
    fn test_invalid_policy_is_normalized() {
        let zero_floor = WindowRegistry::with_policy(ZOrderPolicy {
            floor: 0,
            ceiling: 10,
        });
        assert_eq!(zero_floor.policy(), ZOrderPolicy { floor: 1, ceiling: 10 });
        assert_eq!(zero_floor.admit(zero_floor.allocate_id()), 1);

        let inverted = WindowRegistry::with_policy(ZOrderPolicy {
            floor: 50,
            ceiling: 10,
        });
        assert_eq!(inverted.policy(), ZOrderPolicy { floor: 10, ceiling: 10 });
        assert!(inverted.current_z() <= 10);
        assert_eq!(inverted.admit(inverted.allocate_id()), 10);

        assert!(ZOrderPolicy::default().is_valid());
        assert_eq!(ZOrderPolicy::default().normalized(), ZOrderPolicy::default());
    }

    #[test]
    fn test_windows_front_to_back() {
        let registry = WindowRegistry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        let c = registry.allocate_id();
        registry.admit(a);
        registry.admit(b);
        registry.register(c);

        let order: Vec<WindowId> = registry.windows().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, a, c]);
        assert_eq!(registry.windows()[2].z_index, None);
    }

    #[test]
    fn test_reset_if_empty_only_when_empty() {
        let registry = WindowRegistry::new();
        let a = registry.allocate_id();
        registry.admit(a);
        assert!(!registry.reset_if_empty());
        assert_eq!(registry.current_z(), DEFAULT_Z_FLOOR);

        registry.unregister(a);
        assert!(registry.reset_if_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = WindowRegistry::new();
        let shared = registry.clone();
        let id = registry.allocate_id();
        shared.admit(id);
        assert!(registry.contains(id));
        assert_eq!(registry.allocate_id(), WindowId::from_raw(2));
    }
}
