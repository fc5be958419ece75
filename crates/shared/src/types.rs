use glam::Vec3;
use serde::{Deserialize, Serialize};

/// World position and heading of the agent.
///
/// Heading is in degrees, 0 = facing +Z, positive = clockwise looking down
/// (rotation about +Y).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AgentPose {
    pub position: Vec3,
    pub heading: f32,
}

impl AgentPose {
    pub fn forward(&self) -> Vec3 {
        let h = self.heading.to_radians();
        Vec3::new(h.sin(), 0.0, h.cos())
    }
}

/// Kinematic state of the vehicle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Signed forward speed, clamped to [-max_speed/2, max_speed].
    pub speed: f32,
    /// Accumulated steering angle in degrees, clamped to
    /// [-max_steering_angle, max_steering_angle]. The pose heading is set
    /// directly from this each tick.
    pub steering_angle: f32,
    /// Steering increment applied this tick (degrees).
    pub steering_delta: f32,
    /// Informational acceleration readout for the last tick.
    pub acceleration: f32,
    /// Velocity vector, used only by the constant-force dynamics model.
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Action {
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
}

impl Action {
    pub fn none() -> Self {
        Self {
            throttle: 0.0,
            steer: 0.0,
            brake: 0.0,
        }
    }

    pub fn from_raw(raw: [f32; 3]) -> Self {
        Self {
            throttle: raw[0].clamp(-1.0, 1.0),
            steer: raw[1].clamp(-1.0, 1.0),
            brake: raw[2].clamp(0.0, 1.0),
        }
    }

    pub fn to_raw(&self) -> [f32; 3] {
        [self.throttle, self.steer, self.brake]
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::none()
    }
}

/// Classification of geometry reported by the collision/raycast collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceTag {
    Wall,
    Lane,
    Npc,
    Finish,
}

/// Layer filter for a batched ray query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayFilter {
    Obstacles,
    LaneMarkings,
}

/// One ray in a batched query against the geometry collaborator.
#[derive(Debug, Clone, Copy)]
pub struct RayQuery {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
    pub filter: RayFilter,
}

/// Result of a single ray query.
///
/// A miss reports `distance == max_distance` and no tag; `point` is only
/// meaningful for hits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub tag: Option<SurfaceTag>,
}

impl RayHit {
    pub fn miss(max_distance: f32) -> Self {
        Self {
            distance: max_distance,
            point: Vec3::ZERO,
            tag: None,
        }
    }

    pub fn is_lane(&self) -> bool {
        self.tag == Some(SurfaceTag::Lane)
    }
}

/// Event emitted by the geometry collaborator when the agent's collision
/// volume overlaps tagged geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    ZoneEntered { zone_id: u32, target_speed: f32 },
    ZoneExited { zone_id: u32 },
    Contact(SurfaceTag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    Timeout,
    WallCollision,
    NpcCollision,
    Success,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Timeout => "Timeout",
            TerminationReason::WallCollision => "WallCollision",
            TerminationReason::NpcCollision => "NPCCollision",
            TerminationReason::Success => "Success",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observation vector handed to the policy actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub data: Vec<f32>,
}

/// Episode-end record consumed by the logging collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: u32,
    pub duration_secs: f32,
    pub reward: f32,
    pub reason: TerminationReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_raw_clamps() {
        let a = Action::from_raw([2.0, -3.0, 1.5]);
        assert_eq!(a.throttle, 1.0);
        assert_eq!(a.steer, -1.0);
        assert_eq!(a.brake, 1.0);

        let b = Action::from_raw([-0.5, 0.25, -0.1]);
        assert_eq!(b.throttle, -0.5);
        assert_eq!(b.steer, 0.25);
        assert_eq!(b.brake, 0.0);
    }

    #[test]
    fn test_forward_vector() {
        let pose = AgentPose {
            position: Vec3::ZERO,
            heading: 0.0,
        };
        let f = pose.forward();
        assert!((f.x - 0.0).abs() < 1e-6);
        assert!((f.z - 1.0).abs() < 1e-6);

        let pose = AgentPose {
            position: Vec3::ZERO,
            heading: 90.0,
        };
        let f = pose.forward();
        assert!((f.x - 1.0).abs() < 1e-6);
        assert!(f.z.abs() < 1e-6);
    }

    #[test]
    fn test_termination_reason_strings() {
        assert_eq!(TerminationReason::Timeout.as_str(), "Timeout");
        assert_eq!(TerminationReason::WallCollision.as_str(), "WallCollision");
        assert_eq!(TerminationReason::NpcCollision.as_str(), "NPCCollision");
        assert_eq!(TerminationReason::Success.as_str(), "Success");
    }

    #[test]
    fn test_observation_serde_round_trip() {
        let obs = Observation {
            data: vec![0.5, -0.25, 1.0],
        };
        let json = serde_json::to_string(&obs).expect("observation should serialize");
        let back: Observation = serde_json::from_str(&json).expect("observation should deserialize");
        assert_eq!(obs, back);
    }
}
