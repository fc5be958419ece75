use autodrive_shared::*;

/// Lateral position estimate derived from the lane-marking sensor fan.
/// Recomputed wholesale every tick.
#[derive(Debug, Clone, Copy)]
pub struct LaneTracker {
    /// Estimated lane-center x in world coordinates.
    pub lane_center: f32,
    /// Normalized lateral deviation, always in [-1, 1].
    pub deviation: f32,
    /// Lane rays whose current reading is classified as a lane marking.
    pub detected_rays: usize,
}

impl LaneTracker {
    pub fn new(cfg: &LaneConfig, agent_x: f32) -> Self {
        Self {
            lane_center: snap_to_grid(agent_x, cfg.lane_width),
            deviation: 0.0,
            detected_rays: 0,
        }
    }

    pub fn reset(&mut self, cfg: &LaneConfig, agent_x: f32) {
        *self = Self::new(cfg, agent_x);
    }

    /// Re-estimate the lane center from the current lane-ray readings.
    ///
    /// The first half of `hits` are front rays, the second half back rays;
    /// back rays point rearward, so their left/right sense inverts. With no
    /// hits at all the center snaps to the nearest lane grid line, which
    /// keeps the estimate from drifting while the markings are occluded.
    pub fn update(&mut self, agent_x: f32, hits: &[RayHit], cfg: &LaneConfig) {
        let front = hits.len() / 2;
        let mut left_sum = 0.0f32;
        let mut right_sum = 0.0f32;
        let mut valid = 0usize;

        for (i, hit) in hits.iter().enumerate() {
            if !hit.is_lane() {
                continue;
            }
            let lateral = hit.point.x - agent_x;
            let to_left = if i < front {
                lateral < 0.0
            } else {
                lateral >= 0.0
            };
            if to_left {
                left_sum += lateral.abs();
            } else {
                right_sum += lateral.abs();
            }
            valid += 1;
        }

        if valid > 0 {
            let avg_left = left_sum / valid as f32;
            let avg_right = right_sum / valid as f32;
            self.lane_center = agent_x - avg_left + (avg_left + avg_right) / 2.0;
        } else {
            self.lane_center = snap_to_grid(agent_x, cfg.lane_width);
        }

        self.deviation =
            ((agent_x - self.lane_center) / (cfg.lane_width / 2.0)).clamp(-1.0, 1.0);
        self.detected_rays = valid;
    }
}

fn snap_to_grid(x: f32, lane_width: f32) -> f32 {
    (x / lane_width).round() * lane_width
}
