use crate::bucket::MINUTES_PER_DAY;
use crate::util::atomic_write;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Identifier of a rate-limited placement, e.g. an ad slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementKey(String);

impl PlacementKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlacementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlacementKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for PlacementKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Supplies the window size for a placement. `None` or `Some(0)` means the
/// placement is not time-window limited.
pub trait WindowConfigSource {
    fn lookup_window_minutes(&self, key: &PlacementKey) -> Option<u32>;
}

impl WindowConfigSource for HashMap<PlacementKey, u32> {
    fn lookup_window_minutes(&self, key: &PlacementKey) -> Option<u32> {
        self.get(key).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum FrequencyPolicy {
    /// At most once per fixed bucket of `minutes`.
    TimeWindow { minutes: u32 },
    /// Inserted after every `every` feed items; never time-limited.
    Fixed { every: u32 },
}

impl FrequencyPolicy {
    pub fn window_minutes(&self) -> Option<u32> {
        match self {
            FrequencyPolicy::TimeWindow { minutes } if *minutes > 0 => Some(*minutes),
            _ => None,
        }
    }
}

impl fmt::Display for FrequencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyPolicy::TimeWindow { minutes } => write!(f, "time-window {minutes}m"),
            FrequencyPolicy::Fixed { every } => write!(f, "fixed every {every}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    #[serde(default)]
    pub placements: BTreeMap<PlacementKey, FrequencyPolicy>,
}

impl PlacementConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).context("read placement config")?;
        let parsed = Self::parse(&raw)
            .with_context(|| format!("parse placement config {}", path.display()))?;
        info!(path = %path.display(), placements = parsed.placements.len(), "placement config loaded");
        Ok(parsed)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let parsed = toml::from_str::<PlacementConfig>(raw)?;
        parsed.warn_oversized();
        Ok(parsed)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let data = toml::to_string_pretty(self)?;
        atomic_write(path, data.as_bytes())?;
        info!(path = %path.display(), "placement config saved");
        Ok(())
    }

    pub fn get(&self, key: &PlacementKey) -> Option<FrequencyPolicy> {
        self.placements.get(key).copied()
    }

    pub fn upsert(&mut self, key: PlacementKey, policy: FrequencyPolicy) -> Option<FrequencyPolicy> {
        self.placements.insert(key, policy)
    }

    pub fn remove(&mut self, key: &PlacementKey) -> Option<FrequencyPolicy> {
        self.placements.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlacementKey, &FrequencyPolicy)> {
        self.placements.iter()
    }

    fn warn_oversized(&self) {
        for (key, policy) in &self.placements {
            if let FrequencyPolicy::TimeWindow { minutes } = policy {
                if *minutes > MINUTES_PER_DAY {
                    warn!(placement = %key, minutes, "window exceeds a day, acts as once per day");
                }
            }
        }
    }
}

impl WindowConfigSource for PlacementConfig {
    fn lookup_window_minutes(&self, key: &PlacementKey) -> Option<u32> {
        self.placements.get(key).and_then(FrequencyPolicy::window_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
[placements.feed_top]
policy = "time-window"
minutes = 5

[placements.feed_inline]
policy = "fixed"
every = 4
"#;

    #[test]
    fn parse_both_policies() {
        let config = PlacementConfig::parse(SAMPLE).unwrap();
        assert_eq!(
            config.get(&"feed_top".into()),
            Some(FrequencyPolicy::TimeWindow { minutes: 5 })
        );
        assert_eq!(config.lookup_window_minutes(&"feed_top".into()), Some(5));
        assert_eq!(config.lookup_window_minutes(&"feed_inline".into()), None);
        assert_eq!(config.lookup_window_minutes(&"missing".into()), None);
    }

    #[test]
    fn zero_minute_window_is_unlimited() {
        let mut config = PlacementConfig::default();
        config.upsert("story".into(), FrequencyPolicy::TimeWindow { minutes: 0 });
        assert_eq!(config.lookup_window_minutes(&"story".into()), None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("placements.toml");
        std::fs::write(&path, "placements = 3").unwrap();
        assert!(PlacementConfig::load(&path).is_err());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let config = PlacementConfig::load(&dir.path().join("none.toml")).unwrap();
        assert!(config.placements.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("placements.toml");
        let mut config = PlacementConfig::default();
        config.upsert("feed_top".into(), FrequencyPolicy::TimeWindow { minutes: 30 });
        config.upsert("feed_inline".into(), FrequencyPolicy::Fixed { every: 6 });
        config.save(&path).unwrap();
        let loaded = PlacementConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!path.with_extension("tmp").exists());
    }
}
