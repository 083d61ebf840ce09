use bevy::prelude::*;

/// Links a rendered triangle to its index in the flock.
#[derive(Component)]
pub struct BoidSprite {
    pub index: usize,
}

#[derive(Component)]
pub struct FpsText;

/// Which panel control a button belongs to.
#[derive(Component, Clone, Copy, PartialEq, Eq)]
pub enum UiControl {
    PauseToggle,
    CaseStudyToggle,
    NearestToggle,
    EdgesToggle,
    SeparationToggle,
    AlignmentToggle,
    CohesionToggle,
    ResetButton,
}

/// Editable state of the population field. Typing appends digits; Enter
/// commits, clicking elsewhere reverts.
#[derive(Component)]
pub struct PopulationInput {
    pub is_focused: bool,
    pub buffer: String,
    pub cursor_visible: bool,
    pub cursor_timer: Timer,
}

impl PopulationInput {
    pub fn new(initial: usize) -> Self {
        Self {
            is_focused: false,
            buffer: initial.to_string(),
            cursor_visible: true,
            cursor_timer: Timer::from_seconds(0.5, TimerMode::Repeating),
        }
    }
}
