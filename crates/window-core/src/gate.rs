use crate::clock::{Clock, SystemClock};
use crate::config::{FrequencyPolicy, PlacementConfig, PlacementKey};
use crate::tracker::WindowedSeenTracker;
use tracing::info;

/// Single decision point for placement frequency.
///
/// Time-window placements are limited through a [`WindowedSeenTracker`].
/// Fixed placements are positioned by item count instead and are never
/// time-limited, so they always pass `should_show`.
#[derive(Debug)]
pub struct FrequencyGate<C = SystemClock> {
    tracker: WindowedSeenTracker<PlacementConfig, C>,
}

impl FrequencyGate<SystemClock> {
    pub fn new(config: PlacementConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FrequencyGate<C> {
    pub fn with_clock(config: PlacementConfig, clock: C) -> Self {
        Self {
            tracker: WindowedSeenTracker::with_clock(config, clock),
        }
    }

    pub fn policy(&self, key: &PlacementKey) -> Option<FrequencyPolicy> {
        self.tracker.config().get(key)
    }

    pub fn should_show(&self, key: &PlacementKey) -> bool {
        match self.policy(key) {
            Some(FrequencyPolicy::TimeWindow { .. }) => !self.tracker.has_reached_limit(key),
            Some(FrequencyPolicy::Fixed { .. }) | None => true,
        }
    }

    pub fn record_shown(&mut self, key: &PlacementKey) {
        if let Some(FrequencyPolicy::TimeWindow { .. }) = self.policy(key) {
            self.tracker.mark_seen(key);
        }
    }

    /// Feed indices after which a fixed placement is inserted.
    pub fn fixed_slots(&self, key: &PlacementKey, item_count: usize) -> Vec<usize> {
        match self.policy(key) {
            Some(FrequencyPolicy::Fixed { every }) if every > 0 => slot_indices(every as usize, item_count),
            _ => Vec::new(),
        }
    }

    pub fn reload(&mut self, config: PlacementConfig) {
        info!(placements = config.placements.len(), "placement config reloaded");
        self.tracker.replace_config(config);
    }

    pub fn clear(&mut self) {
        self.tracker.clear();
    }

    pub fn tracker(&self) -> &WindowedSeenTracker<PlacementConfig, C> {
        &self.tracker
    }
}

fn slot_indices(every: usize, item_count: usize) -> Vec<usize> {
    (1..)
        .map(|n| n * every - 1)
        .take_while(|idx| *idx < item_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::util::parse_local_ts;
    use std::sync::Arc;

    fn gate(at: &str) -> (FrequencyGate<Arc<ManualClock>>, Arc<ManualClock>) {
        let mut config = PlacementConfig::default();
        config.upsert("feed_top".into(), FrequencyPolicy::TimeWindow { minutes: 5 });
        config.upsert("feed_inline".into(), FrequencyPolicy::Fixed { every: 4 });
        config.upsert("paused".into(), FrequencyPolicy::Fixed { every: 0 });
        let clock = Arc::new(ManualClock::new(parse_local_ts(at).unwrap()));
        (FrequencyGate::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn time_window_placement_is_gated() {
        let (mut gate, clock) = gate("2026-10-18T10:02");
        let key = PlacementKey::from("feed_top");
        assert!(gate.should_show(&key));
        gate.record_shown(&key);
        assert!(!gate.should_show(&key));
        clock.set(parse_local_ts("2026-10-18T10:05").unwrap());
        assert!(gate.should_show(&key));
    }

    #[test]
    fn fixed_and_unknown_placements_always_show() {
        let (mut gate, _) = gate("2026-10-18T10:02");
        for key in ["feed_inline", "nowhere"] {
            let key = PlacementKey::from(key);
            gate.record_shown(&key);
            assert!(gate.should_show(&key));
        }
        assert!(gate.tracker().is_empty());
    }

    #[test]
    fn fixed_slot_positions() {
        let (gate, _) = gate("2026-10-18T10:02");
        assert_eq!(gate.fixed_slots(&"feed_inline".into(), 10), vec![3, 7]);
        assert_eq!(gate.fixed_slots(&"feed_inline".into(), 8), vec![3, 7]);
        assert_eq!(gate.fixed_slots(&"feed_inline".into(), 3), Vec::<usize>::new());
        assert!(gate.fixed_slots(&"paused".into(), 10).is_empty());
        assert!(gate.fixed_slots(&"feed_top".into(), 10).is_empty());
    }

    #[test]
    fn reload_forgets_marks() {
        let (mut gate, _) = gate("2026-10-18T10:02");
        let key = PlacementKey::from("feed_top");
        gate.record_shown(&key);
        let mut config = PlacementConfig::default();
        config.upsert(key.clone(), FrequencyPolicy::TimeWindow { minutes: 60 });
        gate.reload(config);
        assert!(gate.should_show(&key));
        assert_eq!(gate.policy(&"feed_inline".into()), None);
    }
}
