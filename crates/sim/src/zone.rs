use autodrive_shared::*;

/// Speed-zone membership state. Mutated only by zone enter/exit events from
/// the geometry collaborator; persists across ticks.
#[derive(Debug, Clone, Copy)]
pub struct ZoneTracker {
    pub in_zone: bool,
    pub target_speed: f32,
    last_zone_speed: f32,
}

impl ZoneTracker {
    pub fn new(default_speed: f32) -> Self {
        Self {
            in_zone: false,
            target_speed: default_speed,
            last_zone_speed: default_speed,
        }
    }

    pub fn reset(&mut self, default_speed: f32) {
        *self = Self::new(default_speed);
    }

    /// Handle a zone-enter event; returns the one-time entry bonus.
    /// Overlapping zones are not deduplicated: the last event wins.
    pub fn enter(&mut self, zone_target: f32, weights: &RewardWeights) -> f32 {
        self.in_zone = true;
        self.target_speed = zone_target;
        self.last_zone_speed = zone_target;
        weights.zone_entry_bonus
    }

    /// Handle a zone-exit event; returns the one-time exit reward, which
    /// peaks when the current speed matches the zone's required speed.
    pub fn exit(&mut self, speed: f32, default_speed: f32, weights: &RewardWeights) -> f32 {
        self.in_zone = false;
        self.target_speed = default_speed;
        let diff = (speed - self.last_zone_speed).abs();
        (1.0 - diff / self.last_zone_speed).clamp(weights.zone_exit_min, weights.zone_exit_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> RewardWeights {
        RewardWeights::baseline()
    }

    #[test]
    fn test_enter_sets_state_and_pays_bonus() {
        let w = weights();
        let mut zone = ZoneTracker::new(15.0);
        let bonus = zone.enter(20.0, &w);
        assert!(zone.in_zone);
        assert_eq!(zone.target_speed, 20.0);
        assert_eq!(bonus, w.zone_entry_bonus);
    }

    #[test]
    fn test_exit_at_zone_speed_pays_max_bonus() {
        let w = weights();
        let mut zone = ZoneTracker::new(15.0);
        zone.enter(20.0, &w);
        let reward = zone.exit(20.0, 15.0, &w);
        assert!((reward - w.zone_exit_max).abs() < 1e-6);
        assert!(!zone.in_zone);
        assert_eq!(zone.target_speed, 15.0);
    }

    #[test]
    fn test_exit_far_from_zone_speed_is_floored() {
        let w = weights();
        let mut zone = ZoneTracker::new(15.0);
        zone.enter(20.0, &w);
        // |5 - 20| / 20 = 0.75 -> 1 - 0.75 = 0.25, within [min, max]
        let reward = zone.exit(5.0, 15.0, &w);
        assert!((reward - 0.25).abs() < 1e-6);

        zone.enter(20.0, &w);
        // |60 - 20| / 20 = 2.0 -> 1 - 2.0 = -1.0, floored at min
        let reward = zone.exit(60.0, 15.0, &w);
        assert!((reward - w.zone_exit_min).abs() < 1e-6);
    }

    #[test]
    fn test_nested_zones_last_write_wins() {
        let w = weights();
        let mut zone = ZoneTracker::new(15.0);
        zone.enter(20.0, &w);
        zone.enter(30.0, &w);
        assert_eq!(zone.target_speed, 30.0);
        // Exit reward is computed against the most recent zone's speed.
        let reward = zone.exit(30.0, 15.0, &w);
        assert!((reward - w.zone_exit_max).abs() < 1e-6);
    }
}
