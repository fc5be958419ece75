use autodrive_shared::*;

pub trait Policy: Send {
    fn name(&self) -> &str;
    fn act(&mut self, obs: &Observation) -> Action;
}

/// Policy that does nothing - useful for testing.
pub struct DoNothingPolicy;

impl Policy for DoNothingPolicy {
    fn name(&self) -> &str {
        "do_nothing"
    }

    fn act(&mut self, _obs: &Observation) -> Action {
        Action::none()
    }
}

/// Scripted baseline driver: full throttle on open road, eases off and
/// steers away from whichever side reports the nearest obstacle, and
/// handbrakes when something is dead ahead.
pub struct CruisePolicy {
    ray_count: usize,
}

impl CruisePolicy {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            ray_count: config.ray_count,
        }
    }
}

impl Policy for CruisePolicy {
    fn name(&self) -> &str {
        "cruise"
    }

    fn act(&mut self, obs: &Observation) -> Action {
        let rays = &obs.data[BASE_OBS_SIZE..BASE_OBS_SIZE + self.ray_count];

        // Ray 0 points along the heading; the fan proceeds clockwise, so the
        // first quarter looks right and the last quarter looks left.
        let quarter = (self.ray_count / 4).max(1);
        let forward = rays[0];
        let right_min = rays[1..=quarter]
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);
        let left_min = rays[self.ray_count - quarter..]
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);

        // Positive steering turns right, so steer toward the clearer side.
        let steer = if forward < 0.6 {
            if right_min < left_min {
                -1.0
            } else {
                1.0
            }
        } else {
            ((right_min - left_min) * 2.0).clamp(-1.0, 1.0)
        };

        let throttle = if forward < 0.3 { 0.2 } else { 1.0 };
        let brake = if forward < 0.15 { 1.0 } else { 0.0 };

        Action {
            throttle,
            steer,
            brake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs_with_rays(cfg: &SimConfig, rays: &[f32]) -> Observation {
        let mut data = vec![0.0; cfg.observation_len()];
        data[BASE_OBS_SIZE..BASE_OBS_SIZE + rays.len()].copy_from_slice(rays);
        Observation { data }
    }

    #[test]
    fn test_cruise_full_throttle_on_open_road() {
        let cfg = SimConfig::phase_one();
        let mut policy = CruisePolicy::new(&cfg);
        let obs = obs_with_rays(&cfg, &[1.0; 18]);
        let action = policy.act(&obs);
        assert_eq!(action.throttle, 1.0);
        assert_eq!(action.brake, 0.0);
        assert!(action.steer.abs() < 1e-6);
    }

    #[test]
    fn test_cruise_steers_away_from_blocked_side() {
        let cfg = SimConfig::phase_one();
        let mut policy = CruisePolicy::new(&cfg);

        let mut rays = [1.0; 18];
        rays[0] = 0.4; // something ahead
        rays[2] = 0.2; // and close on the right
        let action = policy.act(&obs_with_rays(&cfg, &rays));
        assert_eq!(action.steer, -1.0, "should swerve left");

        let mut rays = [1.0; 18];
        rays[0] = 0.4;
        rays[16] = 0.2; // close on the left
        let action = policy.act(&obs_with_rays(&cfg, &rays));
        assert_eq!(action.steer, 1.0, "should swerve right");
    }

    #[test]
    fn test_cruise_brakes_when_wall_dead_ahead() {
        let cfg = SimConfig::phase_one();
        let mut policy = CruisePolicy::new(&cfg);
        let mut rays = [1.0; 18];
        rays[0] = 0.1;
        let action = policy.act(&obs_with_rays(&cfg, &rays));
        assert_eq!(action.brake, 1.0);
        assert!(action.throttle < 1.0);
    }
}
