pub mod bucket;
pub mod clock;
pub mod config;
pub mod gate;
pub mod shared;
pub mod tracker;
pub mod util;

pub use bucket::{compute_bucket, WindowBucketId, MINUTES_PER_DAY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FrequencyPolicy, PlacementConfig, PlacementKey, WindowConfigSource};
pub use gate::FrequencyGate;
pub use shared::SharedTracker;
pub use tracker::WindowedSeenTracker;
