use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{BASE_OBS_SIZE, LANE_SUMMARY_OBS_SIZE, OBS_PER_LANE_RAY};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Startup validation failure. Configurations that would divide by zero or
/// degenerate at runtime are rejected here rather than skipped per tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must be in (0, 1], got {value}")]
    DecayOutOfRange { name: &'static str, value: f32 },
    #[error("obstacle ray count must be nonzero")]
    ZeroRayCount,
    #[error("lane ray count must be an even number >= 4, got {0}")]
    LaneRayCount(usize),
    #[error("spawn bounds invalid: x_min {x_min} > x_max {x_max}")]
    SpawnBounds { x_min: f32, x_max: f32 },
    #[error("minimum speed floor {floor} must be below max speed {max_speed}")]
    FloorAboveMax { floor: f32, max_speed: f32 },
    #[error("zone_overspeed_band must be > 1, got {0}")]
    OverspeedBand(f32),
    #[error("zone_underspeed_band must be in (0, 1), got {0}")]
    UnderspeedBand(f32),
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Vehicle integration strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicsModel {
    /// Scalar-speed kinematic model with nonlinear throttle response and
    /// speed-scaled steering authority. The primary training model.
    Kinematic,
    /// Velocity-vector model applying a constant accelerating force along
    /// the heading, with a magnitude clamp. Kept as an alternative strategy.
    ConstantForce,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub x_min: f32,
    pub x_max: f32,
    pub y: f32,
    pub z: f32,
}

/// Linear schedule for the minimum-non-zone-speed floor, driven by the
/// current episode's cumulative reward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurriculumConfig {
    pub initial_min_speed: f32,
    pub final_min_speed: f32,
    /// Cumulative reward at which the schedule saturates.
    pub progress_scale: f32,
}

impl CurriculumConfig {
    /// Effective speed floor for the given cumulative episode reward.
    pub fn min_speed_floor(&self, cumulative_reward: f32) -> f32 {
        let t = (cumulative_reward / self.progress_scale).clamp(0.0, 1.0);
        self.initial_min_speed + (self.final_min_speed - self.initial_min_speed) * t
    }
}

/// Lane-marking sensor fan and lane geometry. Present only in the advanced
/// preset; its absence disables the lane tracker and lane reward entirely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Total lane rays; split evenly into a front and a back fan.
    pub ray_count: usize,
    /// Angular spread of the front fan, degrees.
    pub front_spread: f32,
    /// Angular spread of the back fan, degrees.
    pub back_spread: f32,
    /// Tilt below horizontal, degrees.
    pub downward_angle: f32,
    pub max_distance: f32,
    /// Ray origin height above the agent position.
    pub height_offset: f32,
    pub lane_width: f32,
    /// Deviation magnitude at which the centering reward bottoms out.
    pub max_reward_deviation: f32,
}

/// Every shaping coefficient in one place. These are tunable parameters of
/// the training setup, not fixed constants of the simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RewardWeights {
    // Zone membership
    pub zone_entry_bonus: f32,
    pub zone_exit_min: f32,
    pub zone_exit_max: f32,

    // Speed term, outside zones
    pub nonzone_gain: f32,
    pub nonzone_exponent: f32,
    pub nonzone_underspeed_slope: f32,

    // Speed term, inside zones
    /// Overspeed kicks in above `target * zone_overspeed_band`.
    pub zone_overspeed_band: f32,
    /// Underspeed kicks in below `target * zone_underspeed_band`.
    pub zone_underspeed_band: f32,
    pub zone_overspeed_slope: f32,
    pub zone_overspeed_floor: f32,
    pub zone_overspeed_ceil: f32,
    pub zone_underspeed_quad: f32,
    pub zone_perfect_band: f32,
    pub zone_perfect_bonus: f32,
    pub zone_band_slope: f32,
    pub zone_band_floor: f32,
    pub zone_band_ceil: f32,

    // Lane keeping
    pub lane_gain: f32,
    pub lane_falloff: f32,

    // Collision risk
    pub collision_base: f32,
    pub collision_near: f32,
    pub collision_steep: f32,
    pub collision_growth: f32,
    pub collision_out_of_zone_scale: f32,
    pub collision_severity_gain: f32,
    pub imminent_distance: f32,

    // Flat penalties
    pub stationary_threshold: f32,
    pub stationary_penalty: f32,
    pub deficit_slope: f32,
    pub drift_threshold: f32,
    pub drift_slope: f32,

    // Terminal rewards
    pub timeout_penalty: f32,
    pub wall_penalty: f32,
    pub npc_penalty: f32,
    pub success_bonus: f32,
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Complete environment configuration. The training phases are presets over
/// this one struct; there is no per-phase type hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub dynamics: DynamicsModel,

    // Movement
    pub max_speed: f32,
    pub acceleration_rate: f32,
    pub steering_rate: f32,
    pub max_steering_angle: f32,
    pub natural_decay: f32,
    pub handbrake_decay: f32,

    // Speed zones
    pub default_speed: f32,

    // Obstacle sensor fan
    pub ray_count: usize,
    pub max_ray_distance: f32,

    // Optional lane capability
    pub lane: Option<LaneConfig>,

    pub spawn: SpawnConfig,
    pub max_episode_duration: f32,
    pub curriculum: CurriculumConfig,
    pub rewards: RewardWeights,
}

impl SimConfig {
    /// Basic preset: no lane sensing, tighter track, curriculum ramps the
    /// speed floor from 8 to 15 over the episode reward.
    pub fn phase_one() -> Self {
        Self {
            dynamics: DynamicsModel::Kinematic,
            max_speed: 50.0,
            acceleration_rate: 20.0,
            steering_rate: 80.0,
            max_steering_angle: 45.0,
            natural_decay: 0.99,
            handbrake_decay: 0.7,
            default_speed: 15.0,
            ray_count: 18,
            max_ray_distance: 20.0,
            lane: None,
            spawn: SpawnConfig {
                x_min: -25.0,
                x_max: 25.0,
                y: 1.25,
                z: -475.0,
            },
            max_episode_duration: 90.0,
            curriculum: CurriculumConfig {
                initial_min_speed: 8.0,
                final_min_speed: 15.0,
                progress_scale: 8.0,
            },
            rewards: RewardWeights {
                nonzone_gain: 0.3,
                nonzone_exponent: 0.8,
                nonzone_underspeed_slope: 0.0,
                wall_penalty: -5.0,
                ..RewardWeights::baseline()
            },
        }
    }

    /// Advanced preset: lane sensing enabled, faster vehicle, long episodes,
    /// static speed floor.
    pub fn phase_two() -> Self {
        Self {
            dynamics: DynamicsModel::Kinematic,
            max_speed: 150.0,
            acceleration_rate: 60.0,
            steering_rate: 80.0,
            max_steering_angle: 45.0,
            natural_decay: 0.98,
            handbrake_decay: 0.7,
            default_speed: 15.0,
            ray_count: 18,
            max_ray_distance: 35.0,
            lane: Some(LaneConfig {
                ray_count: 4,
                front_spread: 75.0,
                back_spread: 75.0,
                downward_angle: 8.5,
                max_distance: 25.0,
                height_offset: 0.5,
                lane_width: 25.0,
                max_reward_deviation: 1.5,
            }),
            spawn: SpawnConfig {
                x_min: -25.0,
                x_max: 25.0,
                y: 2.6,
                z: -475.0,
            },
            max_episode_duration: 600.0,
            curriculum: CurriculumConfig {
                initial_min_speed: 15.0,
                final_min_speed: 15.0,
                progress_scale: 8.0,
            },
            rewards: RewardWeights::baseline(),
        }
    }

    /// Length of the observation vector under this configuration.
    pub fn observation_len(&self) -> usize {
        let lane = self
            .lane
            .map(|l| l.ray_count * OBS_PER_LANE_RAY + LANE_SUMMARY_OBS_SIZE)
            .unwrap_or(0);
        BASE_OBS_SIZE + self.ray_count + lane
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_speed", self.max_speed),
            ("acceleration_rate", self.acceleration_rate),
            ("steering_rate", self.steering_rate),
            ("max_steering_angle", self.max_steering_angle),
            ("default_speed", self.default_speed),
            ("max_ray_distance", self.max_ray_distance),
            ("max_episode_duration", self.max_episode_duration),
            ("curriculum.progress_scale", self.curriculum.progress_scale),
            ("curriculum.initial_min_speed", self.curriculum.initial_min_speed),
            ("curriculum.final_min_speed", self.curriculum.final_min_speed),
            ("spawn.x_max", self.spawn.x_max),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        let decays = [
            ("natural_decay", self.natural_decay),
            ("handbrake_decay", self.handbrake_decay),
        ];
        for (name, value) in decays {
            if value <= 0.0 || value > 1.0 {
                return Err(ConfigError::DecayOutOfRange { name, value });
            }
        }

        if self.ray_count == 0 {
            return Err(ConfigError::ZeroRayCount);
        }
        if self.spawn.x_min > self.spawn.x_max {
            return Err(ConfigError::SpawnBounds {
                x_min: self.spawn.x_min,
                x_max: self.spawn.x_max,
            });
        }

        let floor = self
            .curriculum
            .initial_min_speed
            .max(self.curriculum.final_min_speed);
        if floor >= self.max_speed {
            return Err(ConfigError::FloorAboveMax {
                floor,
                max_speed: self.max_speed,
            });
        }

        if self.rewards.zone_overspeed_band <= 1.0 {
            return Err(ConfigError::OverspeedBand(self.rewards.zone_overspeed_band));
        }
        if self.rewards.zone_underspeed_band <= 0.0 || self.rewards.zone_underspeed_band >= 1.0 {
            return Err(ConfigError::UnderspeedBand(self.rewards.zone_underspeed_band));
        }

        if let Some(lane) = &self.lane {
            if lane.ray_count < 4 || lane.ray_count % 2 != 0 {
                return Err(ConfigError::LaneRayCount(lane.ray_count));
            }
            let positive = [
                ("lane.lane_width", lane.lane_width),
                ("lane.max_distance", lane.max_distance),
                ("lane.max_reward_deviation", lane.max_reward_deviation),
            ];
            for (name, value) in positive {
                if value <= 0.0 {
                    return Err(ConfigError::NonPositive { name, value });
                }
            }
        }

        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::phase_two()
    }
}

impl RewardWeights {
    /// Shared baseline; presets override individual coefficients.
    pub fn baseline() -> Self {
        Self {
            zone_entry_bonus: 0.2,
            zone_exit_min: -0.1,
            zone_exit_max: 0.3,

            nonzone_gain: 0.4,
            nonzone_exponent: 1.5,
            nonzone_underspeed_slope: 0.03,

            zone_overspeed_band: 1.4,
            zone_underspeed_band: 0.8,
            zone_overspeed_slope: 0.04,
            zone_overspeed_floor: -0.05,
            zone_overspeed_ceil: -0.01,
            zone_underspeed_quad: 0.04,
            zone_perfect_band: 0.05,
            zone_perfect_bonus: 0.1,
            zone_band_slope: 0.025,
            zone_band_floor: -0.04,
            zone_band_ceil: 0.12,

            lane_gain: 0.9,
            lane_falloff: 0.2,

            collision_base: 0.015,
            collision_near: 10.0,
            collision_steep: 6.0,
            collision_growth: 1.2,
            collision_out_of_zone_scale: 0.9,
            collision_severity_gain: 2.0,
            imminent_distance: 1.0,

            stationary_threshold: 1.0,
            stationary_penalty: -0.1,
            deficit_slope: 0.05,
            drift_threshold: 0.5,
            drift_slope: 0.02,

            timeout_penalty: -0.5,
            wall_penalty: -100.0,
            npc_penalty: -80.0,
            success_bonus: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        SimConfig::phase_one().validate().unwrap();
        SimConfig::phase_two().validate().unwrap();
    }

    #[test]
    fn test_observation_len() {
        let p1 = SimConfig::phase_one();
        assert_eq!(p1.observation_len(), 4 + 18);

        let p2 = SimConfig::phase_two();
        assert_eq!(p2.observation_len(), 4 + 18 + 4 * 2 + 3);
    }

    #[test]
    fn test_zero_lane_width_rejected() {
        let mut cfg = SimConfig::phase_two();
        cfg.lane.as_mut().unwrap().lane_width = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                name: "lane.lane_width",
                ..
            })
        ));
    }

    #[test]
    fn test_odd_lane_ray_count_rejected() {
        let mut cfg = SimConfig::phase_two();
        cfg.lane.as_mut().unwrap().ray_count = 5;
        assert!(matches!(cfg.validate(), Err(ConfigError::LaneRayCount(5))));
    }

    #[test]
    fn test_degenerate_spawn_rejected() {
        let mut cfg = SimConfig::phase_one();
        cfg.spawn.x_min = 30.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::SpawnBounds { .. })));
    }

    #[test]
    fn test_floor_above_max_rejected() {
        let mut cfg = SimConfig::phase_one();
        cfg.curriculum.final_min_speed = 60.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::FloorAboveMax { .. })));
    }

    #[test]
    fn test_curriculum_lerp() {
        let c = CurriculumConfig {
            initial_min_speed: 8.0,
            final_min_speed: 15.0,
            progress_scale: 8.0,
        };
        assert!((c.min_speed_floor(0.0) - 8.0).abs() < 1e-6);
        assert!((c.min_speed_floor(4.0) - 11.5).abs() < 1e-6);
        assert!((c.min_speed_floor(8.0) - 15.0).abs() < 1e-6);
        // Saturates, including for negative reward
        assert!((c.min_speed_floor(100.0) - 15.0).abs() < 1e-6);
        assert!((c.min_speed_floor(-5.0) - 8.0).abs() < 1e-6);
    }
}
