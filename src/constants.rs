//! Seed, population limits, the fixed color palette, and panel layout.

use bevy::prelude::Color;

use crate::flock::Tint;

pub const DEFAULT_SEED: u64 = 1234;
pub const DEFAULT_BOID_COUNT: usize = 50;
pub const MIN_BOID_COUNT: usize = 1;
pub const MAX_BOID_COUNT: usize = 100;

/// Control panel width as a fraction of the arena width.
pub const CONTROLS_BOX_SCALE: f32 = 0.6;

pub fn background_color() -> Color {
    Color::srgb_u8(32, 32, 32)
}

pub fn arena_border_color() -> Color {
    Color::srgb_u8(128, 128, 128)
}

pub fn buffer_border_color() -> Color {
    Color::srgb_u8(255, 255, 255)
}

pub fn case_study_color() -> Color {
    Color::srgb_u8(204, 0, 0)
}

pub fn nearest_color() -> Color {
    Color::srgb_u8(0, 204, 102)
}

pub fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::LightBlue => Color::srgb_u8(153, 204, 255),
        Tint::Blue => Color::srgb_u8(51, 153, 255),
        Tint::DarkBlue => Color::srgb_u8(0, 102, 204),
    }
}
