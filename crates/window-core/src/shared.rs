use crate::bucket::WindowBucketId;
use crate::clock::{Clock, SystemClock};
use crate::config::{PlacementConfig, PlacementKey, WindowConfigSource};
use crate::tracker::WindowedSeenTracker;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-guarded handle to one tracker, for hosts that consult it
/// from more than one thread.
#[derive(Debug)]
pub struct SharedTracker<S = PlacementConfig, C = SystemClock> {
    inner: Arc<Mutex<WindowedSeenTracker<S, C>>>,
}

impl<S, C> Clone for SharedTracker<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: WindowConfigSource, C: Clock> SharedTracker<S, C> {
    pub fn new(tracker: WindowedSeenTracker<S, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn has_reached_limit(&self, key: &PlacementKey) -> bool {
        self.inner.lock().has_reached_limit(key)
    }

    pub fn mark_seen(&self, key: &PlacementKey) {
        self.inner.lock().mark_seen(key);
    }

    /// Returns `true` and marks the placement when it may be shown now.
    pub fn check_and_mark(&self, key: &PlacementKey) -> bool {
        let mut tracker = self.inner.lock();
        if tracker.has_reached_limit(key) {
            return false;
        }
        tracker.mark_seen(key);
        true
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn replace_config(&self, config: S) -> S {
        self.inner.lock().replace_config(config)
    }

    pub fn seen_bucket(&self, key: &PlacementKey) -> Option<WindowBucketId> {
        self.inner.lock().seen_bucket(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
