//! The control panel: labeled toggle buttons for the behavior flags, the
//! population field, a reset button, and the FPS readout.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;

use crate::components::{FpsText, PopulationInput, UiControl};
use crate::constants::{CONTROLS_BOX_SCALE, MAX_BOID_COUNT, MIN_BOID_COUNT};
use crate::resources::{BehaviorFlags, PopulationControl};

pub fn setup_ui(mut commands: Commands, control: Res<PopulationControl>) {
    commands
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::FlexEnd,
                ..default()
            },
            ..default()
        })
        .with_children(|parent| {
            // FPS counter over the arena
            parent
                .spawn(NodeBundle {
                    style: Style {
                        position_type: PositionType::Absolute,
                        top: Val::Px(10.0),
                        left: Val::Px(10.0),
                        ..default()
                    },
                    ..default()
                })
                .with_children(|parent| {
                    parent.spawn((
                        TextBundle::from_section(
                            "FPS: --",
                            TextStyle {
                                font_size: 18.0,
                                color: Color::WHITE,
                                ..default()
                            },
                        ),
                        FpsText,
                    ));
                });

            // Control panel fills the right 0.6 arena-widths of the window
            parent
                .spawn(NodeBundle {
                    style: Style {
                        width: Val::Percent(100.0 * CONTROLS_BOX_SCALE / (1.0 + CONTROLS_BOX_SCALE)),
                        height: Val::Percent(100.0),
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(14.0)),
                        row_gap: Val::Px(12.0),
                        border: UiRect::all(Val::Px(3.0)),
                        ..default()
                    },
                    border_color: Color::WHITE.into(),
                    background_color: Color::srgba(0.1, 0.1, 0.1, 0.5).into(),
                    ..default()
                })
                .with_children(|panel| {
                    panel.spawn(TextBundle::from_section(
                        "Controls",
                        TextStyle {
                            font_size: 32.0,
                            color: Color::WHITE,
                            ..default()
                        },
                    ));

                    row(panel, |columns| {
                        spawn_population_input(columns, control.target);
                        spawn_toggle(columns, "Play / Pause", UiControl::PauseToggle);
                    });
                    row(panel, |columns| {
                        spawn_toggle(columns, "Case Study", UiControl::CaseStudyToggle);
                        spawn_toggle(columns, "Nearest", UiControl::NearestToggle);
                    });
                    row(panel, |columns| {
                        spawn_toggle(columns, "Edges", UiControl::EdgesToggle);
                        spawn_toggle(columns, "Separation", UiControl::SeparationToggle);
                    });
                    row(panel, |columns| {
                        spawn_toggle(columns, "Alignment", UiControl::AlignmentToggle);
                        spawn_toggle(columns, "Cohesion", UiControl::CohesionToggle);
                    });
                    spawn_reset_button(panel);
                });
        });
}

fn row(parent: &mut ChildBuilder, build: impl FnOnce(&mut ChildBuilder)) {
    parent
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::SpaceEvenly,
                align_items: AlignItems::FlexEnd,
                ..default()
            },
            ..default()
        })
        .with_children(build);
}

fn spawn_toggle(parent: &mut ChildBuilder, label: &str, control: UiControl) {
    parent
        .spawn(NodeBundle {
            style: Style {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(4.0),
                ..default()
            },
            ..default()
        })
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                label,
                TextStyle {
                    font_size: 16.0,
                    color: Color::WHITE,
                    ..default()
                },
            ));
            parent
                .spawn((
                    ButtonBundle {
                        style: Style {
                            width: Val::Px(64.0),
                            height: Val::Px(26.0),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            ..default()
                        },
                        background_color: Color::srgb_u8(38, 38, 38).into(),
                        ..default()
                    },
                    control,
                ))
                .with_children(|parent| {
                    parent.spawn(TextBundle::from_section(
                        "Off",
                        TextStyle {
                            font_size: 14.0,
                            color: Color::WHITE,
                            ..default()
                        },
                    ));
                });
        });
}

fn spawn_reset_button(parent: &mut ChildBuilder) {
    parent
        .spawn((
            ButtonBundle {
                style: Style {
                    width: Val::Px(120.0),
                    height: Val::Px(36.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    ..default()
                },
                background_color: Color::srgb_u8(38, 38, 38).into(),
                ..default()
            },
            UiControl::ResetButton,
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Reset",
                TextStyle {
                    font_size: 18.0,
                    color: Color::WHITE,
                    ..default()
                },
            ));
        });
}

fn spawn_population_input(parent: &mut ChildBuilder, initial: usize) {
    parent
        .spawn(NodeBundle {
            style: Style {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(4.0),
                ..default()
            },
            ..default()
        })
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Boids #",
                TextStyle {
                    font_size: 16.0,
                    color: Color::WHITE,
                    ..default()
                },
            ));
            parent.spawn((
                TextBundle {
                    text: Text::from_section(
                        initial.to_string(),
                        TextStyle {
                            font_size: 16.0,
                            color: Color::BLACK,
                            ..default()
                        },
                    ),
                    style: Style {
                        width: Val::Px(64.0),
                        height: Val::Px(26.0),
                        padding: UiRect::all(Val::Px(4.0)),
                        ..default()
                    },
                    background_color: Color::WHITE.into(),
                    ..default()
                },
                PopulationInput::new(initial),
                Interaction::default(),
            ));
        });
}

pub fn handle_toggle_buttons(
    mut flags: ResMut<BehaviorFlags>,
    mut control: ResMut<PopulationControl>,
    interaction_query: Query<(&Interaction, &UiControl), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, ui_control) in interaction_query.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match ui_control {
            UiControl::PauseToggle => flags.paused = !flags.paused,
            UiControl::CaseStudyToggle => {
                flags.case_study = !flags.case_study;
                // the nearest highlight only exists relative to the case study
                if !flags.case_study {
                    flags.show_nearest = false;
                }
            }
            UiControl::NearestToggle => {
                if flags.case_study {
                    flags.show_nearest = !flags.show_nearest;
                }
            }
            UiControl::EdgesToggle => flags.loop_around = !flags.loop_around,
            UiControl::SeparationToggle => flags.separation = !flags.separation,
            UiControl::AlignmentToggle => flags.alignment = !flags.alignment,
            UiControl::CohesionToggle => flags.cohesion = !flags.cohesion,
            UiControl::ResetButton => control.reseed = true,
        }
    }
}

/// Repaint toggle buttons whenever the flags change (including on startup).
pub fn refresh_toggle_labels(
    flags: Res<BehaviorFlags>,
    mut buttons: Query<(&UiControl, &Children, &mut BackgroundColor), With<Button>>,
    mut texts: Query<&mut Text>,
) {
    if !flags.is_changed() {
        return;
    }
    for (control, children, mut background) in buttons.iter_mut() {
        let on = match control {
            UiControl::PauseToggle => !flags.paused,
            UiControl::CaseStudyToggle => flags.case_study,
            UiControl::NearestToggle => flags.show_nearest,
            UiControl::EdgesToggle => flags.loop_around,
            UiControl::SeparationToggle => flags.separation,
            UiControl::AlignmentToggle => flags.alignment,
            UiControl::CohesionToggle => flags.cohesion,
            UiControl::ResetButton => continue,
        };
        *background = if on {
            Color::srgb_u8(26, 115, 232).into()
        } else {
            Color::srgb_u8(38, 38, 38).into()
        };
        if let Some(child) = children.first() {
            if let Ok(mut text) = texts.get_mut(*child) {
                text.sections[0].value = if on { "On".to_string() } else { "Off".to_string() };
            }
        }
    }
}

pub fn handle_population_input(
    mut control: ResMut<PopulationControl>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut keyboard_events: EventReader<KeyboardInput>,
    mut query: Query<(
        &mut PopulationInput,
        &mut Text,
        &mut BackgroundColor,
        &Interaction,
    )>,
) {
    // Clicking the field focuses it; clicking anywhere else reverts and
    // drops focus.
    if mouse.just_pressed(MouseButton::Left) {
        for (mut input, mut text, mut background, interaction) in query.iter_mut() {
            input.is_focused = matches!(interaction, Interaction::Pressed);
            if !input.is_focused {
                input.buffer = control.target.to_string();
            }
            *background = if input.is_focused {
                Color::srgb(0.9, 0.9, 1.0).into()
            } else {
                Color::WHITE.into()
            };
            render_input(&input, &mut text);
        }
    }

    for event in keyboard_events.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        for (mut input, mut text, mut background, _) in query.iter_mut() {
            if !input.is_focused {
                continue;
            }
            match event.key_code {
                KeyCode::Backspace => {
                    input.buffer.pop();
                }
                KeyCode::Enter => {
                    let parsed = input.buffer.parse::<usize>().unwrap_or(control.target);
                    let clamped = parsed.clamp(MIN_BOID_COUNT, MAX_BOID_COUNT);
                    if clamped != parsed {
                        warn!("boid count {parsed} clamped to {clamped}");
                    }
                    control.target = clamped;
                    input.buffer = clamped.to_string();
                    input.is_focused = false;
                    *background = Color::WHITE.into();
                }
                key_code => {
                    if let Some(digit) = key_code_to_digit(key_code) {
                        if input.buffer.len() < 3 {
                            input.buffer.push(digit);
                        }
                    }
                }
            }
            render_input(&input, &mut text);
        }
    }
}

fn key_code_to_digit(key_code: KeyCode) -> Option<char> {
    match key_code {
        KeyCode::Digit0 | KeyCode::Numpad0 => Some('0'),
        KeyCode::Digit1 | KeyCode::Numpad1 => Some('1'),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some('2'),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some('3'),
        KeyCode::Digit4 | KeyCode::Numpad4 => Some('4'),
        KeyCode::Digit5 | KeyCode::Numpad5 => Some('5'),
        KeyCode::Digit6 | KeyCode::Numpad6 => Some('6'),
        KeyCode::Digit7 | KeyCode::Numpad7 => Some('7'),
        KeyCode::Digit8 | KeyCode::Numpad8 => Some('8'),
        KeyCode::Digit9 | KeyCode::Numpad9 => Some('9'),
        _ => None,
    }
}

pub fn update_input_cursor(
    time: Res<Time>,
    mut query: Query<(&mut PopulationInput, &mut Text)>,
) {
    for (mut input, mut text) in query.iter_mut() {
        if !input.is_focused {
            continue;
        }
        input.cursor_timer.tick(time.delta());
        if input.cursor_timer.just_finished() {
            input.cursor_visible = !input.cursor_visible;
            render_input(&input, &mut text);
        }
    }
}

fn render_input(input: &PopulationInput, text: &mut Text) {
    text.sections[0].value = if input.is_focused && input.cursor_visible {
        format!("{}|", input.buffer)
    } else {
        input.buffer.clone()
    };
}

pub fn update_fps_text(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
        if let Some(value) = fps.smoothed() {
            for mut text in query.iter_mut() {
                text.sections[0].value = format!("FPS: {value:.1}");
            }
        }
    }
}
