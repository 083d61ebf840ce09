//! Boid flocking simulation with an interactive Bevy front end.
//!
//! The simulation core ([`flock`]) is plain Rust: a population of
//! constant-speed agents advanced one fixed timestep at a time under
//! separation / alignment / cohesion toggles, inside a soft-boundary
//! wrap-around arena. Each agent steers by testing three candidate headings
//! against the position of its single nearest neighbor, a greedy one-step
//! lookahead rather than a force model.
//!
//! The remaining modules wire the core into a Bevy window: mesh triangles
//! for agents, gizmo borders for the arena, and a control panel of toggle
//! buttons driving [`resources::BehaviorFlags`] and the population size.

pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod flock;
pub mod resources;
pub mod systems;
pub mod ui;
