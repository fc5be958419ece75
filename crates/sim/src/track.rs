use autodrive_shared::*;
use glam::Vec3;
use rayon::prelude::*;
use thiserror::Error;

use crate::sensors::Geometry;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("speed zone {zone_id} target speed must be positive, got {target_speed}")]
    NonPositiveZoneSpeed { zone_id: u32, target_speed: f32 },
    #[error("speed zone {zone_id} has empty extent ({z_min}..{z_max})")]
    EmptyZone { zone_id: u32, z_min: f32, z_max: f32 },
    #[error("track half width must be positive, got {0}")]
    NonPositiveHalfWidth(f32),
    #[error("lane width must be positive, got {0}")]
    NonPositiveLaneWidth(f32),
}

// ---------------------------------------------------------------------------
// World interface
// ---------------------------------------------------------------------------

/// A geometry collaborator that also owns its own per-tick motion and emits
/// overlap events for the agent.
pub trait World: Geometry {
    fn advance(&mut self, dt: f32);
    fn poll_events(&mut self, agent_position: Vec3) -> Vec<WorldEvent>;
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// TrackWorld
// ---------------------------------------------------------------------------

/// Speed-restricted stretch of road.
#[derive(Debug, Clone, Copy)]
pub struct SpeedZoneRegion {
    pub id: u32,
    pub z_min: f32,
    pub z_max: f32,
    pub target_speed: f32,
}

/// NPC vehicle: an axis-aligned box moving along -Z at constant speed.
#[derive(Debug, Clone, Copy)]
pub struct NpcVehicle {
    pub position: Vec3,
    pub half_extents: Vec3,
    pub speed: f32,
}

/// Static description of a track; validated into a [`TrackWorld`].
#[derive(Debug, Clone)]
pub struct TrackLayout {
    pub half_width: f32,
    pub z_start: f32,
    pub finish_z: f32,
    pub lane_width: f32,
    /// Half-width of a painted lane line on the ground.
    pub line_half_width: f32,
    pub agent_radius: f32,
    pub zones: Vec<SpeedZoneRegion>,
    pub npcs: Vec<NpcVehicle>,
}

/// Reference geometry collaborator: a straight multi-lane road along +Z
/// with walls at x = ±half_width, lane lines painted every `lane_width`,
/// speed zones over z-intervals, a finish plane, and a fixed set of NPC
/// vehicles that drive toward the agent and wrap around.
pub struct TrackWorld {
    layout: TrackLayout,
    npcs: Vec<NpcVehicle>,
    inside: Vec<bool>,
}

impl TrackWorld {
    pub fn new(layout: TrackLayout) -> Result<Self, TrackError> {
        if layout.half_width <= 0.0 {
            return Err(TrackError::NonPositiveHalfWidth(layout.half_width));
        }
        if layout.lane_width <= 0.0 {
            return Err(TrackError::NonPositiveLaneWidth(layout.lane_width));
        }
        for zone in &layout.zones {
            if zone.target_speed <= 0.0 {
                return Err(TrackError::NonPositiveZoneSpeed {
                    zone_id: zone.id,
                    target_speed: zone.target_speed,
                });
            }
            if zone.z_min >= zone.z_max {
                return Err(TrackError::EmptyZone {
                    zone_id: zone.id,
                    z_min: zone.z_min,
                    z_max: zone.z_max,
                });
            }
        }
        let inside = vec![false; layout.zones.len()];
        let npcs = layout.npcs.clone();
        Ok(Self {
            layout,
            npcs,
            inside,
        })
    }

    /// Canonical layout sized to the given environment configuration: two
    /// speed zones and two oncoming NPC vehicles between spawn and finish.
    pub fn standard(cfg: &SimConfig) -> Result<Self, TrackError> {
        let lane_width = cfg.lane.map(|l| l.lane_width).unwrap_or(25.0);
        Self::new(TrackLayout {
            half_width: cfg.spawn.x_max + lane_width / 2.0,
            z_start: cfg.spawn.z - 25.0,
            finish_z: 500.0,
            lane_width,
            line_half_width: 0.5,
            agent_radius: 2.0,
            zones: vec![
                SpeedZoneRegion {
                    id: 1,
                    z_min: -300.0,
                    z_max: -200.0,
                    target_speed: 20.0,
                },
                SpeedZoneRegion {
                    id: 2,
                    z_min: 0.0,
                    z_max: 100.0,
                    target_speed: 30.0,
                },
            ],
            npcs: vec![
                NpcVehicle {
                    position: Vec3::new(lane_width / 2.0, 1.0, -350.0),
                    half_extents: Vec3::new(2.0, 1.0, 4.0),
                    speed: 8.0,
                },
                NpcVehicle {
                    position: Vec3::new(-lane_width / 2.0, 1.0, -100.0),
                    half_extents: Vec3::new(2.0, 1.0, 4.0),
                    speed: 6.0,
                },
            ],
        })
    }

    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    pub fn npcs(&self) -> &[NpcVehicle] {
        &self.npcs
    }

    fn cast_obstacle(&self, q: &RayQuery) -> RayHit {
        let mut best = RayHit::miss(q.max_distance);

        for wall_x in [-self.layout.half_width, self.layout.half_width] {
            if let Some(t) = plane_x_hit(q.origin, q.direction, wall_x) {
                if t < best.distance {
                    best = RayHit {
                        distance: t,
                        point: q.origin + q.direction * t,
                        tag: Some(SurfaceTag::Wall),
                    };
                }
            }
        }

        for npc in &self.npcs {
            let min = npc.position - npc.half_extents;
            let max = npc.position + npc.half_extents;
            if let Some(t) = ray_aabb(q.origin, q.direction, min, max) {
                if t < best.distance {
                    best = RayHit {
                        distance: t,
                        point: q.origin + q.direction * t,
                        tag: Some(SurfaceTag::Npc),
                    };
                }
            }
        }

        best
    }

    fn cast_lane(&self, q: &RayQuery) -> RayHit {
        let miss = RayHit::miss(q.max_distance);
        // Lane markings are painted on the ground plane y = 0.
        if q.direction.y >= -1e-6 {
            return miss;
        }
        let t = -q.origin.y / q.direction.y;
        if t <= 0.0 || t > q.max_distance {
            return miss;
        }
        let point = q.origin + q.direction * t;
        let nearest_line = (point.x / self.layout.lane_width).round() * self.layout.lane_width;
        if (point.x - nearest_line).abs() <= self.layout.line_half_width {
            RayHit {
                distance: t,
                point,
                tag: Some(SurfaceTag::Lane),
            }
        } else {
            miss
        }
    }
}

impl Geometry for TrackWorld {
    fn cast_rays(&self, queries: &[RayQuery], hits: &mut [RayHit]) {
        // The whole batch resolves against the same world snapshot; rayon
        // only parallelizes the independent per-ray intersections.
        queries
            .par_iter()
            .zip(hits.par_iter_mut())
            .for_each(|(q, hit)| {
                *hit = match q.filter {
                    RayFilter::Obstacles => self.cast_obstacle(q),
                    RayFilter::LaneMarkings => self.cast_lane(q),
                };
            });
    }
}

impl World for TrackWorld {
    fn advance(&mut self, dt: f32) {
        for npc in &mut self.npcs {
            npc.position.z -= npc.speed * dt;
            if npc.position.z < self.layout.z_start {
                npc.position.z = self.layout.finish_z;
            }
        }
    }

    fn poll_events(&mut self, agent_position: Vec3) -> Vec<WorldEvent> {
        let mut events = Vec::new();

        for (i, zone) in self.layout.zones.iter().enumerate() {
            let inside = agent_position.z >= zone.z_min && agent_position.z <= zone.z_max;
            if inside != self.inside[i] {
                self.inside[i] = inside;
                events.push(if inside {
                    WorldEvent::ZoneEntered {
                        zone_id: zone.id,
                        target_speed: zone.target_speed,
                    }
                } else {
                    WorldEvent::ZoneExited { zone_id: zone.id }
                });
            }
        }

        if agent_position.x.abs() + self.layout.agent_radius >= self.layout.half_width {
            events.push(WorldEvent::Contact(SurfaceTag::Wall));
        }
        for npc in &self.npcs {
            let delta = (agent_position - npc.position).abs();
            let reach = npc.half_extents + Vec3::splat(self.layout.agent_radius);
            if delta.x <= reach.x && delta.y <= reach.y && delta.z <= reach.z {
                events.push(WorldEvent::Contact(SurfaceTag::Npc));
            }
        }
        if agent_position.z >= self.layout.finish_z {
            events.push(WorldEvent::Contact(SurfaceTag::Finish));
        }

        events
    }

    fn reset(&mut self) {
        self.npcs.clone_from(&self.layout.npcs);
        for flag in &mut self.inside {
            *flag = false;
        }
    }
}

fn plane_x_hit(origin: Vec3, dir: Vec3, wall_x: f32) -> Option<f32> {
    if dir.x.abs() < 1e-8 {
        return None;
    }
    let t = (wall_x - origin.x) / dir.x;
    (t > 0.0).then_some(t)
}

/// Slab-method ray/AABB intersection; returns the entry distance.
fn ray_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        if dir[axis].abs() < 1e-8 {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
        } else {
            let t1 = (min[axis] - origin[axis]) / dir[axis];
            let t2 = (max[axis] - origin[axis]) / dir[axis];
            let (t1, t2) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far {
                return None;
            }
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> TrackWorld {
        TrackWorld::standard(&SimConfig::phase_two()).unwrap()
    }

    fn query(origin: Vec3, direction: Vec3, max_distance: f32, filter: RayFilter) -> RayQuery {
        RayQuery {
            origin,
            direction,
            max_distance,
            filter,
        }
    }

    #[test]
    fn test_wall_ray_distance() {
        let world = world();
        let half = world.layout().half_width;
        let queries = [query(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::X,
            100.0,
            RayFilter::Obstacles,
        )];
        let mut hits = [RayHit::miss(100.0)];
        world.cast_rays(&queries, &mut hits);
        assert!((hits[0].distance - half).abs() < 1e-4);
        assert_eq!(hits[0].tag, Some(SurfaceTag::Wall));
    }

    #[test]
    fn test_ray_miss_keeps_sentinel() {
        let world = world();
        // Straight up: nothing to hit.
        let queries = [query(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
            50.0,
            RayFilter::Obstacles,
        )];
        let mut hits = [RayHit::miss(50.0)];
        world.cast_rays(&queries, &mut hits);
        assert_eq!(hits[0].distance, 50.0);
        assert!(hits[0].tag.is_none());
    }

    #[test]
    fn test_npc_ray_hit() {
        let world = world();
        let npc = world.npcs()[0];
        let origin = Vec3::new(npc.position.x, npc.position.y, npc.position.z - 20.0);
        let queries = [query(origin, Vec3::Z, 35.0, RayFilter::Obstacles)];
        let mut hits = [RayHit::miss(35.0)];
        world.cast_rays(&queries, &mut hits);
        // Box front face is half_extents.z closer than its center.
        assert!((hits[0].distance - (20.0 - npc.half_extents.z)).abs() < 1e-4);
        assert_eq!(hits[0].tag, Some(SurfaceTag::Npc));
    }

    #[test]
    fn test_lane_ray_hits_painted_line() {
        let world = world();
        let lane_width = world.layout().lane_width;
        // Aim down at 45 degrees from x slightly short of a lane line so the
        // ground intersection lands on the line.
        let origin = Vec3::new(lane_width - 3.0, 3.0, 0.0);
        let direction = Vec3::new(1.0, -1.0, 0.0).normalize();
        let queries = [query(origin, direction, 25.0, RayFilter::LaneMarkings)];
        let mut hits = [RayHit::miss(25.0)];
        world.cast_rays(&queries, &mut hits);
        assert_eq!(hits[0].tag, Some(SurfaceTag::Lane));
        assert!((hits[0].point.x - lane_width).abs() <= world.layout().line_half_width + 1e-4);
        assert!(hits[0].point.y.abs() < 1e-4);
    }

    #[test]
    fn test_lane_ray_between_lines_misses() {
        let world = world();
        let lane_width = world.layout().lane_width;
        // Ground intersection lands mid-lane.
        let origin = Vec3::new(lane_width / 2.0, 3.0, 0.0);
        let direction = Vec3::new(0.0, -1.0, 0.1).normalize();
        let queries = [query(origin, direction, 25.0, RayFilter::LaneMarkings)];
        let mut hits = [RayHit::miss(25.0)];
        world.cast_rays(&queries, &mut hits);
        assert!(hits[0].tag.is_none());
    }

    #[test]
    fn test_zone_enter_and_exit_events() {
        let mut world = world();
        let zone = world.layout().zones[0];

        let outside = Vec3::new(0.0, 2.6, zone.z_min - 10.0);
        assert!(world.poll_events(outside).is_empty());

        let inside = Vec3::new(0.0, 2.6, (zone.z_min + zone.z_max) / 2.0);
        let events = world.poll_events(inside);
        assert_eq!(
            events,
            vec![WorldEvent::ZoneEntered {
                zone_id: zone.id,
                target_speed: zone.target_speed,
            }]
        );
        // Still inside: no repeat event.
        assert!(world.poll_events(inside).is_empty());

        let past = Vec3::new(0.0, 2.6, zone.z_max + 10.0);
        let events = world.poll_events(past);
        assert_eq!(events, vec![WorldEvent::ZoneExited { zone_id: zone.id }]);
    }

    #[test]
    fn test_wall_and_finish_contacts() {
        let mut world = world();
        let half = world.layout().half_width;
        let radius = world.layout().agent_radius;

        let events = world.poll_events(Vec3::new(half - radius, 2.6, -400.0));
        assert!(events.contains(&WorldEvent::Contact(SurfaceTag::Wall)));

        let events = world.poll_events(Vec3::new(0.0, 2.6, world.layout().finish_z));
        assert!(events.contains(&WorldEvent::Contact(SurfaceTag::Finish)));
    }

    #[test]
    fn test_npc_contact_and_reset() {
        let mut world = world();
        let npc = world.npcs()[0];
        let events = world.poll_events(npc.position);
        assert!(events.contains(&WorldEvent::Contact(SurfaceTag::Npc)));

        for _ in 0..100 {
            world.advance(1.0);
        }
        assert!((world.npcs()[0].position.z - npc.position.z).abs() > 1e-3);

        world.reset();
        assert_eq!(world.npcs()[0].position.z, npc.position.z);
    }

    #[test]
    fn test_npcs_wrap_at_track_start() {
        let mut world = world();
        let z_start = world.layout().z_start;
        let finish = world.layout().finish_z;
        for _ in 0..10_000 {
            world.advance(1.0);
            for npc in world.npcs() {
                assert!(npc.position.z >= z_start - 10.0);
                assert!(npc.position.z <= finish + 1e-3);
            }
        }
    }

    #[test]
    fn test_zero_zone_speed_rejected() {
        let mut layout = TrackWorld::standard(&SimConfig::phase_two())
            .unwrap()
            .layout()
            .clone();
        layout.zones[0].target_speed = 0.0;
        assert!(matches!(
            TrackWorld::new(layout),
            Err(TrackError::NonPositiveZoneSpeed { zone_id: 1, .. })
        ));
    }
}
