use autodrive_shared::*;
use glam::Vec3;

/// Batched ray-query interface implemented by the geometry collaborator.
///
/// `hits` is the same length as `queries` and arrives pre-filled with the
/// max-range miss sentinel; implementations only write entries for rays
/// that hit something.
pub trait Geometry {
    fn cast_rays(&self, queries: &[RayQuery], hits: &mut [RayHit]);
}

/// Obstacle and lane-marking range sensors.
///
/// Readings are replaced wholesale on every scan. When no geometry
/// collaborator is available for a tick the previous readings are retained
/// unchanged, and a zero-ray group is never queried at all.
pub struct SensorArray {
    obstacle: Vec<RayHit>,
    lane: Vec<RayHit>,
    queries: Vec<RayQuery>,
}

impl SensorArray {
    pub fn new(cfg: &SimConfig) -> Self {
        let lane_count = cfg.lane.map(|l| l.ray_count).unwrap_or(0);
        let lane_range = cfg.lane.map(|l| l.max_distance).unwrap_or(0.0);
        Self {
            obstacle: vec![RayHit::miss(cfg.max_ray_distance); cfg.ray_count],
            lane: vec![RayHit::miss(lane_range); lane_count],
            queries: Vec::with_capacity(cfg.ray_count.max(lane_count)),
        }
    }

    pub fn obstacle(&self) -> &[RayHit] {
        &self.obstacle
    }

    pub fn lane(&self) -> &[RayHit] {
        &self.lane
    }

    /// Restore all readings to the miss sentinel.
    pub fn reset(&mut self, cfg: &SimConfig) {
        for hit in &mut self.obstacle {
            *hit = RayHit::miss(cfg.max_ray_distance);
        }
        if let Some(lane_cfg) = &cfg.lane {
            for hit in &mut self.lane {
                *hit = RayHit::miss(lane_cfg.max_distance);
            }
        }
    }

    /// Refresh all readings: one batched query per ray group.
    pub fn scan(&mut self, pose: &AgentPose, cfg: &SimConfig, geometry: &dyn Geometry) {
        if !self.obstacle.is_empty() {
            self.queries.clear();
            let step = 360.0 / self.obstacle.len() as f32;
            for i in 0..self.obstacle.len() {
                self.queries.push(RayQuery {
                    origin: pose.position,
                    direction: ray_direction(pose.heading + i as f32 * step, 0.0),
                    max_distance: cfg.max_ray_distance,
                    filter: RayFilter::Obstacles,
                });
            }
            for hit in &mut self.obstacle {
                *hit = RayHit::miss(cfg.max_ray_distance);
            }
            geometry.cast_rays(&self.queries, &mut self.obstacle);
        }

        let Some(lane_cfg) = &cfg.lane else {
            return;
        };
        if self.lane.is_empty() {
            return;
        }

        self.queries.clear();
        let origin = pose.position + Vec3::Y * lane_cfg.height_offset;
        let front = self.lane.len() / 2;
        let back = self.lane.len() - front;

        // Front fan, centered on the heading.
        let front_step = lane_cfg.front_spread / (front - 1) as f32;
        let front_start = -lane_cfg.front_spread / 2.0;
        for i in 0..front {
            let yaw = pose.heading + front_start + i as f32 * front_step;
            self.queries.push(RayQuery {
                origin,
                direction: ray_direction(yaw, lane_cfg.downward_angle),
                max_distance: lane_cfg.max_distance,
                filter: RayFilter::LaneMarkings,
            });
        }

        // Back fan, centered on the reverse heading.
        let back_step = lane_cfg.back_spread / (back - 1) as f32;
        let back_start = 180.0 - lane_cfg.back_spread / 2.0;
        for i in 0..back {
            let yaw = pose.heading + back_start + i as f32 * back_step;
            self.queries.push(RayQuery {
                origin,
                direction: ray_direction(yaw, lane_cfg.downward_angle),
                max_distance: lane_cfg.max_distance,
                filter: RayFilter::LaneMarkings,
            });
        }

        for hit in &mut self.lane {
            *hit = RayHit::miss(lane_cfg.max_distance);
        }
        geometry.cast_rays(&self.queries, &mut self.lane);
    }
}

/// Unit direction for a world-frame yaw (degrees) and a tilt below
/// horizontal (degrees).
fn ray_direction(yaw_deg: f32, tilt_down_deg: f32) -> Vec3 {
    let yaw = yaw_deg.to_radians();
    let tilt = tilt_down_deg.to_radians();
    Vec3::new(
        yaw.sin() * tilt.cos(),
        -tilt.sin(),
        yaw.cos() * tilt.cos(),
    )
}
