//! The flocking simulation core.
//!
//! Everything that moves lives here: the agent store, the nearest-neighbor
//! search, the three-candidate steering policy, the soft-boundary wrap, and
//! the fixed-timestep step driver. The module knows nothing about windows,
//! schedules, or widgets; the Bevy side reads the population through
//! [`Flock::snapshot`] and advances it with [`Flock::step`].

use std::f32::consts::PI;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::resources::BehaviorFlags;

/// Index of the designated case-study agent. The UI may highlight it and its
/// current nearest neighbor; the simulation treats it like any other agent.
pub const CASE_STUDY_INDEX: usize = 0;

/// Body colors agents are drawn with. The case-study red and the
/// nearest-neighbor green are render-side overrides, never stored here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tint {
    LightBlue,
    Blue,
    DarkBlue,
}

pub const PALETTE: [Tint; 3] = [Tint::LightBlue, Tint::Blue, Tint::DarkBlue];

/// One boid. Positions are normalized arena coordinates ([0,1] per axis,
/// transiently outside until the wrap pass runs); headings are radians.
/// `velocity` is always `speed * (cos heading, sin heading)`: it is
/// re-derived after every heading change and never set on its own.
#[derive(Clone, Copy, Debug)]
pub struct Agent {
    pub position: Vec2,
    pub heading: f32,
    pub velocity: Vec2,
    pub tint: Tint,
}

impl Agent {
    pub fn new(position: Vec2, heading: f32, tint: Tint, config: &SimulationConfig) -> Self {
        Self {
            position,
            heading,
            velocity: config.speed * Vec2::from_angle(heading),
            tint,
        }
    }
}

/// How the steering policy picks among its three candidate headings,
/// resolved once per step from the separation and cohesion flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteeringMode {
    /// Both rules active: flee the neighbor inside the cohesion range,
    /// close back in outside it.
    Spacing,
    /// Separation only: always open distance.
    Avoid,
    /// Cohesion only: close in when outside the cohesion range.
    Seek,
    /// Neither rule active: keep the current heading.
    Hold,
}

impl SteeringMode {
    pub fn from_flags(separation: bool, cohesion: bool) -> Self {
        match (separation, cohesion) {
            (true, true) => SteeringMode::Spacing,
            (true, false) => SteeringMode::Avoid,
            (false, true) => SteeringMode::Seek,
            (false, false) => SteeringMode::Hold,
        }
    }
}

/// Read-only view handed to the renderer: the agents in index order plus
/// the highlight indices.
pub struct Snapshot<'a> {
    pub agents: &'a [Agent],
    pub case_study: usize,
    pub nearest_to_case_study: usize,
}

/// The population and its update rules.
#[derive(Debug, Resource)]
pub struct Flock {
    agents: Vec<Agent>,
    rng: ChaCha8Rng,
}

impl Flock {
    /// Create `count` agents from a seeded RNG stream: positions uniform in
    /// the margin rectangle, headings uniform over the circle, tints uniform
    /// over the palette.
    pub fn new(count: usize, seed: u64, config: &SimulationConfig) -> Result<Self, SimError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let agents = sample_agents(&mut rng, count, config)?;
        Ok(Self { agents, rng })
    }

    /// Build a flock with an exact formation, for scripted setups. Later
    /// resizes draw from a default-seeded stream.
    pub fn from_agents(agents: Vec<Agent>) -> Result<Self, SimError> {
        if agents.is_empty() {
            return Err(SimError::InvalidConfiguration(
                "population size must be at least 1".into(),
            ));
        }
        Ok(Self {
            agents,
            rng: ChaCha8Rng::seed_from_u64(0),
        })
    }

    /// Discard the population and sample a fresh one of `count` agents from
    /// the continuing RNG stream. Total: nothing carries over. On error the
    /// old population is kept untouched.
    pub fn resize(&mut self, count: usize, config: &SimulationConfig) -> Result<(), SimError> {
        self.agents = sample_agents(&mut self.rng, count, config)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn snapshot(&self, config: &SimulationConfig) -> Snapshot<'_> {
        Snapshot {
            agents: &self.agents,
            case_study: CASE_STUDY_INDEX,
            nearest_to_case_study: self.nearest(CASE_STUDY_INDEX, config),
        }
    }

    /// Index of the agent nearest to `index`, or `index` itself when the
    /// population has no other member. Positions are scaled to arena pixels
    /// before measuring: the arena is not square, so the normalized metric
    /// would weight the axes wrong. Ties go to the lowest index.
    pub fn nearest(&self, index: usize, config: &SimulationConfig) -> usize {
        let scale = config.arena_scale();
        let origin = self.agents[index].position * scale;
        let mut best = index;
        let mut best_dist = f32::INFINITY;
        for (i, other) in self.agents.iter().enumerate() {
            if i == index {
                continue;
            }
            let dist = (other.position * scale - origin).length_squared();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        best
    }

    /// Advance the simulation by one fixed timestep.
    ///
    /// Heading updates run per agent in index order, so an agent's alignment
    /// read can see a lower-indexed neighbor's heading from this same step.
    /// Velocities are then re-derived and positions integrated in bulk. The
    /// wrap pass ignores `paused`; everything else is skipped while paused.
    pub fn step(&mut self, config: &SimulationConfig, flags: &BehaviorFlags) {
        if !flags.paused {
            let mode = SteeringMode::from_flags(flags.separation, flags.cohesion);
            for i in 0..self.agents.len() {
                let neighbor = self.nearest(i, config);
                self.agents[i].heading = self.steer(i, neighbor, mode, config);
                if flags.alignment {
                    let diff = self.agents[neighbor].heading - self.agents[i].heading;
                    // a zero difference contributes nothing (sign(0) = 0)
                    if diff != 0.0 {
                        self.agents[i].heading += config.alignment_strength * diff.signum();
                    }
                }
            }

            for agent in &mut self.agents {
                agent.velocity = config.speed * Vec2::from_angle(agent.heading);
            }

            let dt = config.timestep();
            for agent in &mut self.agents {
                agent.position += agent.velocity * dt;
            }
        }

        if flags.loop_around {
            for agent in &mut self.agents {
                agent.position = wrap(agent.position, config);
            }
        }
    }

    /// Pick the next heading for agent `index` from the three candidates
    /// (unchanged, +collision_strength, -collision_strength) by looking one
    /// integration step ahead and comparing distances to the neighbor's
    /// current position. Candidate distances are in normalized units; only
    /// the neighbor search uses the pixel metric.
    fn steer(
        &self,
        index: usize,
        neighbor: usize,
        mode: SteeringMode,
        config: &SimulationConfig,
    ) -> f32 {
        let agent = &self.agents[index];
        let target = self.agents[neighbor].position;
        let dt = config.timestep();

        let candidates = [
            agent.heading,
            agent.heading + config.collision_strength,
            agent.heading - config.collision_strength,
        ];
        let mut distances = [0.0_f32; 3];
        for (dist, heading) in distances.iter_mut().zip(candidates) {
            let next = agent.position + config.speed * Vec2::from_angle(heading) * dt;
            *dist = next.distance(target);
        }

        match mode {
            SteeringMode::Spacing => {
                if distances[0] <= config.cohesion_scale {
                    candidates[arg_max(&distances)]
                } else {
                    candidates[arg_min(&distances)]
                }
            }
            SteeringMode::Avoid => candidates[arg_max(&distances)],
            SteeringMode::Seek if distances[0] > config.cohesion_scale => {
                candidates[arg_min(&distances)]
            }
            SteeringMode::Seek | SteeringMode::Hold => agent.heading,
        }
    }
}

/// Soft-boundary wrap, applied independently per axis: a coordinate past the
/// inner threshold is point-reflected to the far side, nudged inward by
/// `wrap_correction` so a shallow crossing does not immediately re-trigger
/// the opposite threshold.
pub fn wrap(position: Vec2, config: &SimulationConfig) -> Vec2 {
    Vec2::new(wrap_axis(position.x, config), wrap_axis(position.y, config))
}

fn wrap_axis(value: f32, config: &SimulationConfig) -> f32 {
    let threshold = config.margin - config.wrap_buffer;
    if value < threshold {
        1.0 - value - config.wrap_correction
    } else if value > 1.0 - threshold {
        1.0 - value + config.wrap_correction
    } else {
        value
    }
}

fn sample_agents(
    rng: &mut ChaCha8Rng,
    count: usize,
    config: &SimulationConfig,
) -> Result<Vec<Agent>, SimError> {
    if count == 0 {
        return Err(SimError::InvalidConfiguration(
            "population size must be at least 1".into(),
        ));
    }
    let low = config.margin;
    let high = 1.0 - config.margin;
    let mut agents = Vec::with_capacity(count);
    for _ in 0..count {
        let position = Vec2::new(rng.gen_range(low..high), rng.gen_range(low..high));
        let heading = rng.gen_range(-PI..PI);
        let tint = PALETTE[rng.gen_range(0..PALETTE.len())];
        agents.push(Agent::new(position, heading, tint, config));
    }
    Ok(agents)
}

/// First index of the smallest value; ties keep the earliest candidate.
fn arg_min(values: &[f32; 3]) -> usize {
    let mut best = 0;
    for i in 1..values.len() {
        if values[i] < values[best] {
            best = i;
        }
    }
    best
}

fn arg_max(values: &[f32; 3]) -> usize {
    let mut best = 0;
    for i in 1..values.len() {
        if values[i] > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig::default()
    }

    fn flags_off() -> BehaviorFlags {
        BehaviorFlags {
            paused: false,
            loop_around: false,
            separation: false,
            alignment: false,
            cohesion: false,
            case_study: false,
            show_nearest: false,
        }
    }

    #[test]
    fn seeded_spawn_is_deterministic() {
        let config = config();
        let a = Flock::new(40, 1234, &config).unwrap();
        let b = Flock::new(40, 1234, &config).unwrap();
        for (x, y) in a.agents().iter().zip(b.agents()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.heading.to_bits(), y.heading.to_bits());
            assert_eq!(x.tint, y.tint);
        }
    }

    #[test]
    fn spawn_stays_inside_margin_with_derived_velocity() {
        let config = config();
        let flock = Flock::new(60, 7, &config).unwrap();
        for agent in flock.agents() {
            assert!(agent.position.x >= config.margin && agent.position.x < 1.0 - config.margin);
            assert!(agent.position.y >= config.margin && agent.position.y < 1.0 - config.margin);
            assert!(agent.heading >= -PI && agent.heading < PI);
            let expected = config.speed * Vec2::from_angle(agent.heading);
            assert!((agent.velocity - expected).length() < 1e-6);
        }
    }

    #[test]
    fn rejects_zero_population() {
        let config = config();
        let err = Flock::new(0, 1, &config).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration(_)));
    }

    #[test]
    fn resize_is_atomic_and_total() {
        let config = config();
        let mut flock = Flock::new(10, 5, &config).unwrap();
        assert!(flock.resize(0, &config).is_err());
        assert_eq!(flock.len(), 10);

        flock.resize(25, &config).unwrap();
        assert_eq!(flock.len(), 25);
        for agent in flock.agents() {
            assert!(agent.position.x >= config.margin && agent.position.x < 1.0 - config.margin);
            let expected = config.speed * Vec2::from_angle(agent.heading);
            assert!((agent.velocity - expected).length() < 1e-6);
        }
    }

    #[test]
    fn nearest_measures_in_arena_pixels() {
        let config = config();
        // 0.30 wide is 192 px but 0.35 tall is only 168 px on a 640x480 arena
        let flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.8, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.5, 0.85), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        assert_eq!(flock.nearest(0, &config), 2);
    }

    #[test]
    fn nearest_tie_breaks_to_first_index() {
        let config = config();
        let flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.7, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.3, 0.5), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        assert_eq!(flock.nearest(0, &config), 1);
    }

    #[test]
    fn nearest_is_not_symmetric() {
        let config = config();
        let flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.20, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.50, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.72, 0.5), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        assert_eq!(flock.nearest(0, &config), 1);
        assert_eq!(flock.nearest(1, &config), 2);
    }

    #[test]
    fn lone_agent_neighbors_itself_and_steps_safely() {
        let config = config();
        let mut flock = Flock::from_agents(vec![Agent::new(
            Vec2::new(0.5, 0.5),
            1.0,
            Tint::Blue,
            &config,
        )])
        .unwrap();
        assert_eq!(flock.nearest(0, &config), 0);

        let mut flags = flags_off();
        flags.separation = true;
        flags.cohesion = true;
        flags.alignment = true;
        for _ in 0..10 {
            flock.step(&config, &flags);
        }
        let agent = flock.agents()[0];
        assert!(agent.position.is_finite());
        assert!(agent.heading.is_finite());
        // comparing the agent against itself yields a zero angular
        // difference, so alignment never moves the heading
        let drift = (agent.heading - 1.0).abs();
        assert!(drift <= 10.0 * config.collision_strength + 1e-6);
    }

    #[test]
    fn wrap_reflects_across_the_soft_boundary() {
        let config = config(); // threshold at 0.05
        let low = wrap(Vec2::new(0.04, 0.5), &config);
        assert!((low.x - (1.0 - 0.04 - config.wrap_correction)).abs() < 1e-6);
        assert_eq!(low.y, 0.5);

        let high = wrap(Vec2::new(0.5, 0.97), &config);
        assert!((high.y - (1.0 - 0.97 + config.wrap_correction)).abs() < 1e-6);
        assert_eq!(high.x, 0.5);

        let inside = wrap(Vec2::new(0.3, 0.7), &config);
        assert_eq!(inside, Vec2::new(0.3, 0.7));

        // shallow crossings land inside the far threshold and stay put
        let shallow_low = wrap(Vec2::new(0.046, 0.5), &config);
        assert_eq!(wrap(shallow_low, &config), shallow_low);
        let shallow_high = wrap(Vec2::new(0.5, 0.953), &config);
        assert_eq!(wrap(shallow_high, &config), shallow_high);
    }

    #[test]
    fn steering_mode_covers_flag_combinations() {
        assert_eq!(SteeringMode::from_flags(true, true), SteeringMode::Spacing);
        assert_eq!(SteeringMode::from_flags(true, false), SteeringMode::Avoid);
        assert_eq!(SteeringMode::from_flags(false, true), SteeringMode::Seek);
        assert_eq!(SteeringMode::from_flags(false, false), SteeringMode::Hold);
    }

    #[test]
    fn separation_only_always_flees() {
        let config = config();
        let mut flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.56, 0.53), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        let mut flags = flags_off();
        flags.separation = true;
        flock.step(&config, &flags);

        // the neighbor sits up-right of the path, so turning down and away
        // (-collision_strength) maximizes the one-step-ahead distance
        let heading = flock.agents()[0].heading;
        assert!((heading - (-config.collision_strength)).abs() < 1e-6);
    }

    #[test]
    fn cohesion_only_approaches_beyond_the_scale() {
        let config = config();
        let mut flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.5, Tint::Blue, &config),
            Agent::new(Vec2::new(0.6, 0.5), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        let mut flags = flags_off();
        flags.cohesion = true;
        flock.step(&config, &flags);

        // the neighbor sits to the right, so turning down toward it wins
        let heading = flock.agents()[0].heading;
        assert!((heading - (0.5 - config.collision_strength)).abs() < 1e-6);
    }

    #[test]
    fn cohesion_only_holds_inside_the_scale() {
        let config = config();
        let mut flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.5, Tint::Blue, &config),
            Agent::new(Vec2::new(0.52, 0.5), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        let mut flags = flags_off();
        flags.cohesion = true;
        flock.step(&config, &flags);
        assert!((flock.agents()[0].heading - 0.5).abs() < 1e-6);
    }

    #[test]
    fn spacing_flees_inside_and_approaches_outside() {
        let config = config();
        let mut flags = flags_off();
        flags.separation = true;
        flags.cohesion = true;

        let mut close = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.52, 0.51), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        close.step(&config, &flags);
        assert!((close.agents()[0].heading - (-config.collision_strength)).abs() < 1e-6);

        let mut far = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.5, Tint::Blue, &config),
            Agent::new(Vec2::new(0.6, 0.5), 0.5, Tint::Blue, &config),
        ])
        .unwrap();
        far.step(&config, &flags);
        assert!((far.agents()[0].heading - (0.5 - config.collision_strength)).abs() < 1e-6);
    }

    #[test]
    fn alignment_nudges_by_a_fixed_step() {
        let config = config();
        let mut flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.3, 0.3), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.35, 0.3), 1.0, Tint::Blue, &config),
        ])
        .unwrap();
        let mut flags = flags_off();
        flags.alignment = true;
        flock.step(&config, &flags);

        // agent 0 steps toward agent 1's heading; agent 1 then reads agent
        // 0's already-updated heading and steps down toward it
        let agents = flock.agents();
        assert!((agents[0].heading - config.alignment_strength).abs() < 1e-6);
        assert!((agents[1].heading - (1.0 - config.alignment_strength)).abs() < 1e-6);
    }

    #[test]
    fn alignment_ignores_equal_headings() {
        let config = config();
        let mut flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.3, 0.3), 0.7, Tint::Blue, &config),
            Agent::new(Vec2::new(0.4, 0.3), 0.7, Tint::Blue, &config),
        ])
        .unwrap();
        let mut flags = flags_off();
        flags.alignment = true;
        flock.step(&config, &flags);
        assert_eq!(flock.agents()[0].heading, 0.7);
        assert_eq!(flock.agents()[1].heading, 0.7);
    }

    #[test]
    fn paused_state_is_frozen_bit_for_bit() {
        let config = config();
        let mut flock = Flock::new(20, 9, &config).unwrap();
        let mut flags = BehaviorFlags::default();
        for _ in 0..3 {
            flock.step(&config, &flags);
        }
        let before: Vec<(u32, u32, u32)> = flock
            .agents()
            .iter()
            .map(|a| {
                (
                    a.position.x.to_bits(),
                    a.position.y.to_bits(),
                    a.heading.to_bits(),
                )
            })
            .collect();

        flags.paused = true;
        for _ in 0..25 {
            flock.step(&config, &flags);
        }
        let after: Vec<(u32, u32, u32)> = flock
            .agents()
            .iter()
            .map(|a| {
                (
                    a.position.x.to_bits(),
                    a.position.y.to_bits(),
                    a.heading.to_bits(),
                )
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn wrap_runs_even_while_paused() {
        let config = config();
        let mut flock = Flock::from_agents(vec![Agent::new(
            Vec2::new(0.02, 0.5),
            0.0,
            Tint::Blue,
            &config,
        )])
        .unwrap();
        let mut flags = flags_off();
        flags.paused = true;
        flags.loop_around = true;
        flock.step(&config, &flags);

        let agent = flock.agents()[0];
        assert!((agent.position.x - (1.0 - 0.02 - config.wrap_correction)).abs() < 1e-6);
        assert_eq!(agent.heading, 0.0);
    }

    #[test]
    fn snapshot_exposes_case_study_and_its_neighbor() {
        let config = config();
        let flock = Flock::from_agents(vec![
            Agent::new(Vec2::new(0.5, 0.5), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.9, 0.9), 0.0, Tint::Blue, &config),
            Agent::new(Vec2::new(0.55, 0.5), 0.0, Tint::Blue, &config),
        ])
        .unwrap();
        let snapshot = flock.snapshot(&config);
        assert_eq!(snapshot.case_study, CASE_STUDY_INDEX);
        assert_eq!(snapshot.nearest_to_case_study, 2);
        assert_eq!(snapshot.agents.len(), 3);
    }
}
