use autodrive_shared::*;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::dynamics;
use crate::episode::EpisodeState;
use crate::lane::LaneTracker;
use crate::observation;
use crate::reward::{self, RewardBreakdown};
use crate::sensors::{Geometry, SensorArray};
use crate::zone::ZoneTracker;

/// Result of one simulation tick.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f32,
    pub breakdown: RewardBreakdown,
    pub terminal: Option<TerminationReason>,
}

/// The driving environment: one agent, its sensors, and its episode state.
///
/// One call to [`CarEnv::step`] is one atomic tick; the external loop owns
/// scheduling and calls [`CarEnv::reset`] after a terminal outcome.
pub struct CarEnv {
    pub config: SimConfig,
    pub pose: AgentPose,
    pub vehicle: VehicleState,
    pub sensors: SensorArray,
    pub zone: ZoneTracker,
    pub lane: Option<LaneTracker>,
    pub episode: EpisodeState,
    rng: Pcg64,
}

impl CarEnv {
    /// Validates the configuration and spawns the agent for episode 1.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut env = Self {
            pose: AgentPose {
                position: Vec3::ZERO,
                heading: 0.0,
            },
            vehicle: VehicleState::default(),
            sensors: SensorArray::new(&config),
            zone: ZoneTracker::new(config.default_speed),
            lane: config.lane.map(|l| LaneTracker::new(&l, 0.0)),
            episode: EpisodeState::default(),
            rng: Pcg64::seed_from_u64(seed),
            config,
        };
        env.episode.begin_next();
        env.respawn();
        Ok(env)
    }

    /// Begin the next episode; returns the initial observation.
    pub fn reset(&mut self) -> Observation {
        self.episode.begin_next();
        self.respawn();
        self.observe()
    }

    fn respawn(&mut self) {
        let spawn = self.config.spawn;
        let x = self.rng.gen_range(spawn.x_min..=spawn.x_max);
        self.pose = AgentPose {
            position: Vec3::new(x, spawn.y, spawn.z),
            heading: 0.0,
        };
        self.vehicle = VehicleState::default();
        self.zone.reset(self.config.default_speed);
        if let (Some(lane), Some(lane_cfg)) = (&mut self.lane, &self.config.lane) {
            lane.reset(lane_cfg, x);
        }
        self.sensors.reset(&self.config);
    }

    /// Advance one tick: accrue time, apply world events, sense, integrate,
    /// evaluate the reward, and assemble the next observation.
    pub fn step(
        &mut self,
        action: Action,
        events: &[WorldEvent],
        geometry: Option<&dyn Geometry>,
    ) -> StepOutcome {
        let w = self.config.rewards;
        let mut breakdown = RewardBreakdown::default();

        // The tick that crosses the time budget ends the episode before
        // anything else runs.
        if self
            .episode
            .accrue(DT, self.config.max_episode_duration)
        {
            breakdown.events = w.timeout_penalty;
            return self.finish(breakdown, TerminationReason::Timeout);
        }

        // Zone transitions and contacts reported by the geometry collaborator.
        let mut terminal = None;
        for event in events {
            match *event {
                WorldEvent::ZoneEntered { target_speed, .. } => {
                    breakdown.events += self.zone.enter(target_speed, &w);
                }
                WorldEvent::ZoneExited { .. } => {
                    breakdown.events +=
                        self.zone
                            .exit(self.vehicle.speed, self.config.default_speed, &w);
                }
                WorldEvent::Contact(tag) => {
                    let (bonus, reason) = match tag {
                        SurfaceTag::Wall => (w.wall_penalty, TerminationReason::WallCollision),
                        SurfaceTag::Npc => (w.npc_penalty, TerminationReason::NpcCollision),
                        SurfaceTag::Finish => (w.success_bonus, TerminationReason::Success),
                        SurfaceTag::Lane => continue,
                    };
                    breakdown.events += bonus;
                    terminal = Some(reason);
                }
            }
        }
        if let Some(reason) = terminal {
            return self.finish(breakdown, reason);
        }

        // Sense with this tick's world snapshot, then integrate the action.
        if let Some(geometry) = geometry {
            self.sensors.scan(&self.pose, &self.config, geometry);
        }
        dynamics::step(&mut self.vehicle, &mut self.pose, &action, &self.config, DT);
        if let (Some(lane), Some(lane_cfg)) = (&mut self.lane, &self.config.lane) {
            lane.update(self.pose.position.x, self.sensors.lane(), lane_cfg);
        }

        let floor = self
            .config
            .curriculum
            .min_speed_floor(self.episode.cumulative_reward);
        let (shaped, imminent) = reward::evaluate(
            &self.config,
            &self.vehicle,
            self.sensors.obstacle(),
            &self.zone,
            self.lane.as_ref(),
            floor,
        );
        breakdown = RewardBreakdown {
            events: breakdown.events,
            ..shaped
        };

        let total = breakdown.total();
        self.episode.cumulative_reward += total;

        StepOutcome {
            observation: self.observe(),
            reward: total,
            breakdown,
            terminal: imminent.then_some(TerminationReason::WallCollision),
        }
    }

    fn finish(&mut self, breakdown: RewardBreakdown, reason: TerminationReason) -> StepOutcome {
        let total = breakdown.total();
        self.episode.cumulative_reward += total;
        StepOutcome {
            observation: self.observe(),
            reward: total,
            breakdown,
            terminal: Some(reason),
        }
    }

    pub fn observe(&self) -> Observation {
        observation::assemble(
            &self.config,
            &self.vehicle,
            &self.zone,
            &self.sensors,
            self.lane.as_ref(),
        )
    }

    /// Episode-end record for the logging collaborator.
    pub fn episode_record(&self, reason: TerminationReason) -> EpisodeRecord {
        self.episode.record(reason)
    }
}
