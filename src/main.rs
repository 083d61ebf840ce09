use std::path::PathBuf;
use std::process::ExitCode;

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use clap::{value_parser, Arg, Command};

use bevy_flock::config::SimulationConfig;
use bevy_flock::constants::{
    background_color, CONTROLS_BOX_SCALE, DEFAULT_BOID_COUNT, DEFAULT_SEED, MAX_BOID_COUNT,
    MIN_BOID_COUNT,
};
use bevy_flock::flock::Flock;
use bevy_flock::resources::{BehaviorFlags, PopulationControl};
use bevy_flock::{systems, ui};

fn cli() -> Command {
    Command::new("bevy-flock")
        .about(
            "Simulation of flock behaviors, i.e. boids, with a focus on the \
             graphical user interface and visuals.",
        )
        .after_help(
            "All interaction happens in the window: toggles control pausing, \
             edge wrap-around, the separation/alignment/cohesion rules, and \
             the case-study highlight; the Boids # field resizes the \
             population.",
        )
        .arg(
            Arg::new("boids")
                .long("boids")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Initial number of boids (1-100)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .help("Random seed for the initial population"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("JSON file overriding simulation parameters"),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => match SimulationConfig::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };

    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(DEFAULT_SEED);
    let count = matches
        .get_one::<usize>("boids")
        .copied()
        .unwrap_or(DEFAULT_BOID_COUNT);
    if !(MIN_BOID_COUNT..=MAX_BOID_COUNT).contains(&count) {
        eprintln!(
            "invalid configuration: boid count must be between {MIN_BOID_COUNT} and {MAX_BOID_COUNT}"
        );
        return ExitCode::FAILURE;
    }

    let flock = match Flock::new(count, seed, &config) {
        Ok(flock) => flock,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let window_width = config.arena_width * (1.0 + CONTROLS_BOX_SCALE);
    let window_height = config.arena_height;

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Boid Simulation".to_string(),
                resolution: WindowResolution::new(window_width, window_height),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .insert_resource(ClearColor(background_color()))
        .insert_resource(Time::<Fixed>::from_hz(config.fps as f64))
        .insert_resource(config)
        .insert_resource(flock)
        .insert_resource(BehaviorFlags::default())
        .insert_resource(PopulationControl {
            target: count,
            reseed: false,
        })
        .add_systems(Startup, (systems::setup, ui::setup_ui))
        .add_systems(
            FixedUpdate,
            (systems::apply_population_control, systems::step_flock).chain(),
        )
        .add_systems(
            Update,
            (
                systems::draw_arena,
                systems::sync_boid_sprites,
                ui::handle_toggle_buttons,
                ui::refresh_toggle_labels,
                ui::handle_population_input,
                ui::update_input_cursor,
                ui::update_fps_text,
            ),
        );

    match app.run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(_) => ExitCode::FAILURE,
    }
}
