// Tick rate (matches the original's 50Hz fixed physics step)
pub const TICK_RATE: u32 = 50;
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// Action vector layout: [throttle, steer, brake]
pub const ACTION_SIZE: usize = 3;

// Observation layout building blocks. The full length depends on the
// configured ray counts, see `SimConfig::observation_len`.
pub const BASE_OBS_SIZE: usize = 4; // speed, steering, in-zone, target speed
pub const OBS_PER_LANE_RAY: usize = 2; // hit flag + normalized distance
pub const LANE_SUMMARY_OBS_SIZE: usize = 3; // deviation, center, coverage

// Sentinel written into the lane-distance observation slot when a lane ray
// misses (before normalization).
pub const LANE_MISS_DISTANCE: f32 = -1.0;
