use autodrive_shared::*;

use crate::lane::LaneTracker;
use crate::sensors::SensorArray;
use crate::zone::ZoneTracker;

/// Assemble the observation vector handed to the policy actor.
///
/// Layout: speed, steering, in-zone flag, target speed, R obstacle
/// distances, then (with the lane capability) per-ray hit flag + distance
/// and the lane summary. All entries are normalized by their configured
/// ranges; a missed lane ray reports the -1 distance sentinel.
pub fn assemble(
    cfg: &SimConfig,
    vehicle: &VehicleState,
    zone: &ZoneTracker,
    sensors: &SensorArray,
    lane: Option<&LaneTracker>,
) -> Observation {
    let mut data = Vec::with_capacity(cfg.observation_len());

    data.push(vehicle.speed / cfg.max_speed);
    data.push(vehicle.steering_angle / cfg.max_steering_angle);
    data.push(if zone.in_zone { 1.0 } else { 0.0 });
    data.push(zone.target_speed / cfg.max_speed);

    for hit in sensors.obstacle() {
        data.push(hit.distance / cfg.max_ray_distance);
    }

    if let (Some(tracker), Some(lane_cfg)) = (lane, &cfg.lane) {
        for hit in sensors.lane() {
            let is_lane = hit.is_lane();
            data.push(if is_lane { 1.0 } else { 0.0 });
            let distance = if is_lane {
                hit.distance
            } else {
                LANE_MISS_DISTANCE
            };
            data.push(distance / lane_cfg.max_distance);
        }
        data.push(tracker.deviation);
        data.push(tracker.lane_center / cfg.spawn.x_max);
        data.push(tracker.detected_rays as f32 / lane_cfg.ray_count as f32);
    }

    Observation { data }
}
