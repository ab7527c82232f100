use crate::bucket::{compute_bucket, WindowBucketId};
use crate::clock::{Clock, SystemClock};
use crate::config::{PlacementConfig, PlacementKey, WindowConfigSource};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::debug;

/// Remembers, per placement, the last time bucket in which it was shown.
///
/// Buckets are recomputed from the clock on every query; nothing expires in
/// the background. A placement whose window is absent or zero is never
/// limited and is never recorded.
#[derive(Debug)]
pub struct WindowedSeenTracker<S = PlacementConfig, C = SystemClock> {
    config: S,
    clock: C,
    seen: HashMap<PlacementKey, WindowBucketId>,
}

impl<S: WindowConfigSource> WindowedSeenTracker<S, SystemClock> {
    pub fn new(config: S) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<S: WindowConfigSource, C: Clock> WindowedSeenTracker<S, C> {
    pub fn with_clock(config: S, clock: C) -> Self {
        Self {
            config,
            clock,
            seen: HashMap::new(),
        }
    }

    pub fn compute_bucket_id(&self, key: &PlacementKey, at: &NaiveDateTime) -> Option<WindowBucketId> {
        let minutes = self.config.lookup_window_minutes(key)?;
        compute_bucket(at, minutes)
    }

    fn current_bucket(&self, key: &PlacementKey) -> Option<WindowBucketId> {
        self.compute_bucket_id(key, &self.clock.now())
    }

    pub fn has_reached_limit(&self, key: &PlacementKey) -> bool {
        let Some(current) = self.current_bucket(key) else {
            return false;
        };
        self.seen.get(key) == Some(&current)
    }

    pub fn mark_seen(&mut self, key: &PlacementKey) {
        let Some(current) = self.current_bucket(key) else {
            return;
        };
        let previous = self.seen.insert(key.clone(), current);
        if previous != Some(current) {
            debug!(placement = %key, bucket = %current, "placement marked seen");
        }
    }

    pub fn clear(&mut self) {
        debug!(entries = self.seen.len(), "seen registry cleared");
        self.seen.clear();
    }

    /// Installs a new configuration. Stored buckets were computed under the
    /// old window sizes, so the registry is cleared.
    pub fn replace_config(&mut self, config: S) -> S {
        let old = std::mem::replace(&mut self.config, config);
        self.clear();
        old
    }

    pub fn seen_bucket(&self, key: &PlacementKey) -> Option<WindowBucketId> {
        self.seen.get(key).copied()
    }

    pub fn config(&self) -> &S {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
