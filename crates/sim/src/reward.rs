use autodrive_shared::*;
use serde::Serialize;

use crate::lane::LaneTracker;
use crate::zone::ZoneTracker;

/// Per-component readout of one tick's shaping terms. Returned read-only
/// alongside the tick result for display and analysis.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RewardBreakdown {
    pub speed: f32,
    pub lane: f32,
    pub collision: f32,
    pub stationary: f32,
    pub deficit: f32,
    pub drift: f32,
    /// One-time zone enter/exit rewards and terminal-event rewards.
    pub events: f32,
}

impl RewardBreakdown {
    pub fn total(&self) -> f32 {
        self.speed
            + self.lane
            + self.collision
            + self.stationary
            + self.deficit
            + self.drift
            + self.events
    }
}

/// Evaluate all shaping terms for the current tick.
///
/// Returns the breakdown (with `events` left at zero; the caller owns event
/// rewards) and whether an obstacle ray reported an imminent collision,
/// which terminates the episode.
pub fn evaluate(
    cfg: &SimConfig,
    vehicle: &VehicleState,
    obstacle_hits: &[RayHit],
    zone: &ZoneTracker,
    lane: Option<&LaneTracker>,
    speed_floor: f32,
) -> (RewardBreakdown, bool) {
    let w = &cfg.rewards;
    let speed = vehicle.speed;

    let mut breakdown = RewardBreakdown {
        speed: speed_reward(w, speed, zone, cfg.max_speed, speed_floor),
        ..Default::default()
    };

    if let (Some(tracker), Some(lane_cfg)) = (lane, &cfg.lane) {
        breakdown.lane = lane_reward(w, lane_cfg, tracker, speed, zone.target_speed, speed_floor);
    }

    let (collision, imminent) =
        collision_risk(w, obstacle_hits, zone.in_zone, speed, cfg.max_speed);
    breakdown.collision = collision;

    if speed.abs() < w.stationary_threshold {
        breakdown.stationary = w.stationary_penalty;
    }
    if !zone.in_zone && speed < speed_floor {
        breakdown.deficit = -w.deficit_slope * (speed_floor - speed);
    }
    // Steering-drift penalty substitutes for lane keeping in the basic
    // preset; with the lane tracker active it is disabled.
    if lane.is_none() && vehicle.steering_delta.abs() > w.drift_threshold {
        breakdown.drift = -w.drift_slope * (speed / speed_floor);
    }

    (breakdown, imminent)
}

fn speed_reward(
    w: &RewardWeights,
    speed: f32,
    zone: &ZoneTracker,
    max_speed: f32,
    floor: f32,
) -> f32 {
    if !zone.in_zone {
        if speed < floor {
            return -w.nonzone_underspeed_slope * (floor - speed);
        }
        let ratio = ((speed - floor) / (max_speed - floor)).clamp(0.0, 1.0);
        return w.nonzone_gain * ratio.powf(w.nonzone_exponent);
    }

    let target = zone.target_speed;
    let over_limit = target * w.zone_overspeed_band;
    let under_limit = target * w.zone_underspeed_band;

    if speed > over_limit {
        let over_ratio = (speed - target) / (over_limit - target);
        return (-w.zone_overspeed_slope * over_ratio)
            .clamp(w.zone_overspeed_floor, w.zone_overspeed_ceil);
    }
    if speed < under_limit {
        let deficit = (under_limit - speed) / under_limit;
        return -w.zone_underspeed_quad * deficit * deficit;
    }

    let diff = speed - target;
    if diff.abs() <= target * w.zone_perfect_band {
        return w.zone_perfect_bonus;
    }
    (diff * w.zone_band_slope).clamp(w.zone_band_floor, w.zone_band_ceil)
}

fn lane_reward(
    w: &RewardWeights,
    lane_cfg: &LaneConfig,
    tracker: &LaneTracker,
    speed: f32,
    target_speed: f32,
    floor: f32,
) -> f32 {
    let coverage = (tracker.detected_rays as f32 / lane_cfg.ray_count as f32).clamp(0.0, 1.0);
    let norm_dev = (tracker.deviation.abs() / lane_cfg.max_reward_deviation).clamp(0.0, 1.0);
    let center_reward = (-w.lane_falloff * norm_dev * norm_dev).exp();
    // Lane keeping means nothing while crawling.
    let speed_factor = if speed < floor {
        0.0
    } else {
        (speed / target_speed).clamp(0.0, 1.0)
    };
    w.lane_gain * coverage * center_reward * speed_factor
}

fn collision_risk(
    w: &RewardWeights,
    hits: &[RayHit],
    in_zone: bool,
    speed: f32,
    max_speed: f32,
) -> (f32, bool) {
    let mut total = 0.0;
    let mut imminent = false;

    for hit in hits {
        let d = hit.distance;
        if d > 0.0 && d < w.collision_near {
            let factor = if d < w.collision_steep {
                w.collision_growth.powf(w.collision_steep - d)
            } else {
                1.0
            };
            let mut penalty = -w.collision_base * factor;
            if !in_zone {
                penalty *= w.collision_out_of_zone_scale;
            }
            total += penalty;

            if d < w.imminent_distance {
                // Episode ends here; rays after this one are not evaluated.
                imminent = true;
                break;
            }
        }
    }

    let severity = 1.0 + (speed / max_speed) * w.collision_severity_gain;
    (total * severity, imminent)
}
