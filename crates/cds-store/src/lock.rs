use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::layout::ContentId;

/// Per-id async mutual exclusion.
///
/// Slots are held weakly, so an id with no holder and no waiter costs
/// nothing once the map is pruned on the next acquisition.
#[derive(Debug, Default)]
pub struct KeyedLock {
    slots: Mutex<HashMap<ContentId, Weak<AsyncMutex<()>>>>,
}

/// Held for as long as the caller owns the id.
#[derive(Debug)]
pub struct KeyedGuard {
    _guard: OwnedMutexGuard<()>,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, id: &ContentId) -> KeyedGuard {
        let slot = self.slot(id);
        KeyedGuard {
            _guard: slot.lock_owned().await,
        }
    }

    /// Number of ids currently held or waited on.
    #[cfg(test)]
    fn active(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }

    fn slot(&self, id: &ContentId) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock();
        slots.retain(|_, slot| slot.strong_count() > 0);
        if let Some(slot) = slots.get(id).and_then(Weak::upgrade) {
            return slot;
        }
        let slot = Arc::new(AsyncMutex::new(()));
        slots.insert(id.clone(), Arc::downgrade(&slot));
        slot
    }
}
