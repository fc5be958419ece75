use autodrive_shared::*;
use serde::Serialize;

use crate::env::CarEnv;
use crate::logger::EpisodeSink;
use crate::policy::Policy;
use crate::sensors::Geometry;
use crate::track::World;

/// Aggregate statistics over a training run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunSummary {
    pub episodes: u32,
    pub total_ticks: u64,
    pub mean_reward: f32,
    pub mean_duration_secs: f32,
    pub timeouts: u32,
    pub wall_collisions: u32,
    pub npc_collisions: u32,
    pub successes: u32,
}

/// Drive `policy` through `episodes` complete episodes on `world`, logging
/// each episode-end record to the sink and resetting world and environment
/// between episodes.
pub fn run_training<W: World>(
    env: &mut CarEnv,
    world: &mut W,
    policy: &mut dyn Policy,
    episodes: u32,
    sink: &mut dyn EpisodeSink,
) -> RunSummary {
    let mut summary = RunSummary::default();
    if episodes == 0 {
        return summary;
    }

    let mut reward_sum = 0.0f32;
    let mut duration_sum = 0.0f32;
    let mut obs = env.observe();

    while summary.episodes < episodes {
        let action = policy.act(&obs);
        world.advance(DT);
        let events = world.poll_events(env.pose.position);
        let outcome = {
            let geometry: &dyn Geometry = world;
            env.step(action, &events, Some(geometry))
        };
        summary.total_ticks += 1;

        match outcome.terminal {
            Some(reason) => {
                let record = env.episode_record(reason);
                sink.log_episode_end(&record);
                reward_sum += record.reward;
                duration_sum += record.duration_secs;
                match reason {
                    TerminationReason::Timeout => summary.timeouts += 1,
                    TerminationReason::WallCollision => summary.wall_collisions += 1,
                    TerminationReason::NpcCollision => summary.npc_collisions += 1,
                    TerminationReason::Success => summary.successes += 1,
                }
                summary.episodes += 1;
                world.reset();
                obs = env.reset();
            }
            None => obs = outcome.observation,
        }
    }

    summary.mean_reward = reward_sum / episodes as f32;
    summary.mean_duration_secs = duration_sum / episodes as f32;
    summary
}
