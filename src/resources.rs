use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::constants::CONTROLS_BOX_SCALE;

/// The per-frame toggle state owned by the control panel. The simulation
/// only ever reads it.
#[derive(Resource, Clone, Copy, Debug)]
pub struct BehaviorFlags {
    pub paused: bool,
    pub loop_around: bool,
    pub separation: bool,
    pub alignment: bool,
    pub cohesion: bool,
    pub case_study: bool,
    pub show_nearest: bool,
}

impl Default for BehaviorFlags {
    fn default() -> Self {
        Self {
            paused: false,
            loop_around: true,
            separation: true,
            alignment: true,
            cohesion: true,
            case_study: false,
            show_nearest: false,
        }
    }
}

/// Population size requested by the panel, applied right before the next
/// step. `reseed` forces a fresh population even at the current size.
#[derive(Resource, Clone, Copy, Debug)]
pub struct PopulationControl {
    pub target: usize,
    pub reseed: bool,
}

/// Mapping from normalized arena coordinates to Bevy world coordinates.
/// The window holds the arena on the left and the control panel on the
/// right; the camera sits at the window center, and the arena's y axis
/// points down while Bevy's points up.
#[derive(Resource, Clone, Copy, Debug)]
pub struct ArenaLayout {
    pub arena_width: f32,
    pub arena_height: f32,
    pub window_width: f32,
    pub window_height: f32,
}

impl ArenaLayout {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            arena_width: config.arena_width,
            arena_height: config.arena_height,
            window_width: config.arena_width * (1.0 + CONTROLS_BOX_SCALE),
            window_height: config.arena_height,
        }
    }

    /// World position of a normalized arena point.
    pub fn to_world(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x * self.arena_width - self.window_width / 2.0,
            self.window_height / 2.0 - position.y * self.arena_height,
        )
    }

    /// World rotation for an arena heading; the y flip mirrors angles.
    pub fn to_world_rotation(&self, heading: f32) -> Quat {
        Quat::from_rotation_z(-heading)
    }
}
