//! The shared entity cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use super::key::{CacheKey, CachedEntry};
use super::patch::Patch;

/// Receives the latest value of a key after every change.
///
/// `None` means the key is not populated (never loaded or invalidated).
pub type Subscription = watch::Receiver<Option<CachedEntry>>;

/// Handle that reverts one [`EntityCache::patch`] call.
///
/// Undo is skipped when the key was re-populated (by a fetch or an
/// authoritative `put`) or invalidated after the patch was taken.
#[derive(Debug)]
#[must_use = "dropping an undo token makes the patch permanent"]
pub struct UndoToken {
    key: CacheKey,
    generation: u64,
    inverse: Vec<Patch>,
}

impl UndoToken {
    /// Key the token belongs to.
    #[must_use]
    pub const fn key(&self) -> &CacheKey {
        &self.key
    }
}

struct Slot {
    entry: CachedEntry,
    generation: u64,
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<CacheKey, Slot>,
    watchers: HashMap<CacheKey, watch::Sender<Option<CachedEntry>>>,
    next_generation: u64,
}

impl CacheState {
    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn publish(&self, key: &CacheKey) {
        if let Some(sender) = self.watchers.get(key) {
            let value = self.slots.get(key).map(|slot| slot.entry.clone());
            sender.send_replace(value);
        }
    }
}

/// Keyed store of server projections shared by every view.
///
/// All mutations go through [`put`](Self::put), [`patch`](Self::patch),
/// [`undo`](Self::undo) and [`invalidate`](Self::invalidate). Subscribers
/// are notified synchronously, before the mutating call returns.
#[derive(Clone, Default)]
pub struct EntityCache {
    inner: Arc<Mutex<CacheState>>,
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("EntityCache")
            .field("keys", &state.slots.len())
            .field("watchers", &state.watchers.len())
            .finish()
    }
}

impl EntityCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value of a key.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<CachedEntry> {
        self.state().slots.get(key).map(|slot| slot.entry.clone())
    }

    /// Returns true if the key is populated.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.state().slots.contains_key(key)
    }

    /// Every populated key.
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        self.state().slots.keys().cloned().collect()
    }

    /// Copies every populated entry.
    #[must_use]
    pub fn entries(&self) -> Vec<(CacheKey, CachedEntry)> {
        self.state()
            .slots
            .iter()
            .map(|(key, slot)| (key.clone(), slot.entry.clone()))
            .collect()
    }

    /// Stores an authoritative value, superseding any outstanding undo tokens.
    pub fn put(&self, key: CacheKey, entry: CachedEntry) {
        let mut state = self.state();
        let generation = state.bump();
        debug!("cache put {} (generation {})", key, generation);
        state.slots.insert(key.clone(), Slot { entry, generation });
        state.publish(&key);
    }

    /// Applies patches to a populated key and returns the token that undoes them.
    ///
    /// Patches against an unpopulated key are dropped. Returns `None` when
    /// nothing changed.
    pub fn patch(
        &self,
        key: &CacheKey,
        patches: impl IntoIterator<Item = Patch>,
    ) -> Option<UndoToken> {
        let mut state = self.state();
        let Some(slot) = state.slots.get_mut(key) else {
            debug!("cache patch on unpopulated {} dropped", key);
            return None;
        };

        let mut inverse: Vec<Patch> = patches
            .into_iter()
            .filter_map(|patch| patch.apply(&mut slot.entry))
            .collect();
        if inverse.is_empty() {
            return None;
        }
        inverse.reverse();
        let generation = slot.generation;

        state.publish(key);
        Some(UndoToken {
            key: key.clone(),
            generation,
            inverse,
        })
    }

    /// Reverts a previous patch.
    ///
    /// Returns false when the key has since been re-populated or invalidated,
    /// in which case the cache is left untouched.
    pub fn undo(&self, token: UndoToken) -> bool {
        self.undo_where(token, |_| true)
    }

    /// Reverts only the parts of a previous patch that `keep` accepts.
    ///
    /// Same staleness rules as [`undo`](Self::undo).
    pub fn undo_where(&self, token: UndoToken, keep: impl Fn(&Patch) -> bool) -> bool {
        let mut state = self.state();
        let Some(slot) = state.slots.get_mut(&token.key) else {
            debug!("undo on unpopulated {} skipped", token.key);
            return false;
        };
        if slot.generation != token.generation {
            debug!("undo on {} skipped: superseded by a newer value", token.key);
            return false;
        }

        for patch in token.inverse.into_iter().filter(|p| keep(p)) {
            // Inverses computed at patch time always apply; a None here only
            // means another action already moved the value the same way.
            let _ = patch.apply(&mut slot.entry);
        }
        state.publish(&token.key);
        true
    }

    /// Drops a key so the next read refetches it.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut state = self.state();
        let removed = state.slots.remove(key).is_some();
        if removed {
            debug!("cache invalidate {}", key);
            state.publish(key);
        }
        removed
    }

    /// Drops every key matching the predicate. Returns how many were dropped.
    pub fn invalidate_where(&self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let mut state = self.state();
        let doomed: Vec<CacheKey> = state.slots.keys().filter(|k| predicate(k)).cloned().collect();
        for key in &doomed {
            state.slots.remove(key);
            state.publish(key);
        }
        if !doomed.is_empty() {
            debug!("cache invalidated {} keys", doomed.len());
        }
        doomed.len()
    }

    /// Subscribes to a key. The receiver starts with the current value.
    #[must_use]
    pub fn subscribe(&self, key: &CacheKey) -> Subscription {
        let mut state = self.state();
        if let Some(sender) = state.watchers.get(key) {
            return sender.subscribe();
        }
        let current = state.slots.get(key).map(|slot| slot.entry.clone());
        let (sender, receiver) = watch::channel(current);
        state.watchers.insert(key.clone(), sender);
        receiver
    }
}
