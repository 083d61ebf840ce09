//! Process-wide simulation parameters.
//!
//! Built once at startup from defaults plus an optional JSON override file,
//! then inserted as a read-only resource. Nothing mutates it afterwards; the
//! interactive controls own only the behavior flags and the population size.

use std::fs;
use std::path::Path;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Fixed parameters for one run.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Arena width in pixels.
    pub arena_width: f32,
    /// Arena height in pixels.
    pub arena_height: f32,
    /// Fixed update rate; the step integrates with dt = 1/fps.
    pub fps: f32,
    /// Gap between the window edge and the arena border, as a fraction of
    /// the arena size. Agents are seeded inside the margin rectangle.
    pub margin: f32,
    /// Triangle width as a fraction of the arena width.
    pub boid_size: f32,
    /// Constant agent speed, in normalized arena units per second.
    pub speed: f32,
    /// How far inside the margin the wrap threshold sits.
    pub wrap_buffer: f32,
    /// Inward nudge applied on wrap so the reflected position does not land
    /// past the opposite threshold.
    pub wrap_correction: f32,
    /// Heading offset (radians) between the steering candidates.
    pub collision_strength: f32,
    /// Size (radians) of one alignment nudge.
    pub alignment_strength: f32,
    /// Neighbor distance separating "too close, flee" from "too far,
    /// approach" when both steering rules are active.
    pub cohesion_scale: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arena_width: 640.0,
            arena_height: 480.0,
            fps: 30.0,
            margin: 0.1,
            boid_size: 0.01,
            speed: 0.2,
            wrap_buffer: 0.05,
            wrap_correction: 0.005,
            collision_strength: 0.1,
            alignment_strength: 0.04,
            cohesion_scale: 0.05,
        }
    }
}

impl SimulationConfig {
    pub fn timestep(&self) -> f32 {
        1.0 / self.fps
    }

    /// Per-axis factor turning normalized positions into pixel positions.
    pub fn arena_scale(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height)
    }

    /// Load from a JSON file; fields absent from the file keep their
    /// defaults. The result is validated.
    pub fn from_path(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| SimError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        fn ensure(ok: bool, message: &str) -> Result<(), SimError> {
            if ok {
                Ok(())
            } else {
                Err(SimError::InvalidConfiguration(message.into()))
            }
        }

        ensure(
            self.arena_width > 0.0 && self.arena_height > 0.0,
            "arena dimensions must be positive",
        )?;
        ensure(
            self.fps.is_finite() && self.fps > 0.0,
            "fps must be positive and finite",
        )?;
        ensure(
            self.speed.is_finite() && self.speed > 0.0,
            "speed must be positive and finite",
        )?;
        ensure(
            self.margin > 0.0 && self.margin < 0.5,
            "margin must lie strictly between 0 and 0.5",
        )?;
        ensure(
            self.wrap_buffer >= 0.0 && self.wrap_buffer < self.margin,
            "wrap buffer must be non-negative and smaller than the margin",
        )?;
        ensure(
            self.wrap_correction >= 0.0,
            "wrap correction must be non-negative",
        )?;
        ensure(self.boid_size > 0.0, "boid size must be positive")?;
        ensure(
            self.collision_strength >= 0.0 && self.alignment_strength >= 0.0,
            "steering strengths must be non-negative",
        )?;
        ensure(
            self.cohesion_scale >= 0.0,
            "cohesion scale must be non-negative",
        )?;
        Ok(())
    }
}
