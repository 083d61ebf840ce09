//! Simulation-side systems: population control, the fixed-timestep step,
//! sprite sync with highlighting, and the arena border gizmos.

use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};

use crate::components::BoidSprite;
use crate::config::SimulationConfig;
use crate::constants::{
    arena_border_color, buffer_border_color, case_study_color, nearest_color, tint_color,
};
use crate::flock::{Flock, Tint};
use crate::resources::{ArenaLayout, BehaviorFlags, PopulationControl};

/// Shared render assets for the boid triangles: one mesh, one material per
/// palette color plus the two highlight colors.
#[derive(Resource)]
pub struct BoidAssets {
    pub mesh: Mesh2dHandle,
    pub light_blue: Handle<ColorMaterial>,
    pub blue: Handle<ColorMaterial>,
    pub dark_blue: Handle<ColorMaterial>,
    pub case_study: Handle<ColorMaterial>,
    pub nearest: Handle<ColorMaterial>,
}

impl BoidAssets {
    pub fn material_for(&self, tint: Tint) -> Handle<ColorMaterial> {
        match tint {
            Tint::LightBlue => self.light_blue.clone(),
            Tint::Blue => self.blue.clone(),
            Tint::DarkBlue => self.dark_blue.clone(),
        }
    }
}

pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<SimulationConfig>,
) {
    commands.spawn(Camera2dBundle::default());
    commands.insert_resource(ArenaLayout::new(&config));

    // Triangle nose forward along +x, 1.5x as long as wide, centroid 30%
    // back from the base.
    let width = config.boid_size * config.arena_width;
    let length = 1.5 * width;
    let mesh = meshes.add(Mesh::from(Triangle2d::new(
        Vec2::new(0.7 * length, 0.0),
        Vec2::new(-0.3 * length, 0.5 * width),
        Vec2::new(-0.3 * length, -0.5 * width),
    )));

    commands.insert_resource(BoidAssets {
        mesh: mesh.into(),
        light_blue: materials.add(ColorMaterial::from(tint_color(Tint::LightBlue))),
        blue: materials.add(ColorMaterial::from(tint_color(Tint::Blue))),
        dark_blue: materials.add(ColorMaterial::from(tint_color(Tint::DarkBlue))),
        case_study: materials.add(ColorMaterial::from(case_study_color())),
        nearest: materials.add(ColorMaterial::from(nearest_color())),
    });
}

/// Apply the panel's population request ahead of the step, so a resize is
/// atomic with respect to the frame.
pub fn apply_population_control(
    mut control: ResMut<PopulationControl>,
    mut flock: ResMut<Flock>,
    config: Res<SimulationConfig>,
) {
    if !control.reseed && control.target == flock.len() {
        return;
    }
    let target = control.target;
    match flock.resize(target, &config) {
        Ok(()) => info!("flock reinitialized with {target} boids"),
        Err(err) => {
            warn!("rejected population change to {target}: {err}");
            control.target = flock.len();
        }
    }
    control.reseed = false;
}

pub fn step_flock(
    mut flock: ResMut<Flock>,
    config: Res<SimulationConfig>,
    flags: Res<BehaviorFlags>,
) {
    flock.step(&config, &flags);
}

/// Keep one triangle entity per agent and refresh transforms and colors.
/// The highlight lookup runs every frame, paused or not; it is presentation
/// state, not simulation state.
pub fn sync_boid_sprites(
    mut commands: Commands,
    flock: Res<Flock>,
    config: Res<SimulationConfig>,
    flags: Res<BehaviorFlags>,
    layout: Res<ArenaLayout>,
    assets: Res<BoidAssets>,
    mut query: Query<(
        Entity,
        &BoidSprite,
        &mut Transform,
        &mut Handle<ColorMaterial>,
    )>,
) {
    if query.iter().count() != flock.len() {
        for (entity, _, _, _) in query.iter() {
            commands.entity(entity).despawn();
        }
        for (index, agent) in flock.agents().iter().enumerate() {
            commands.spawn((
                MaterialMesh2dBundle {
                    mesh: assets.mesh.clone(),
                    material: assets.material_for(agent.tint),
                    transform: Transform::from_translation(
                        layout.to_world(agent.position).extend(0.0),
                    )
                    .with_rotation(layout.to_world_rotation(agent.heading)),
                    ..default()
                },
                BoidSprite { index },
            ));
        }
        return;
    }

    let snapshot = flock.snapshot(&config);
    for (_, sprite, mut transform, mut material) in query.iter_mut() {
        let agent = &snapshot.agents[sprite.index];
        transform.translation = layout.to_world(agent.position).extend(0.0);
        transform.rotation = layout.to_world_rotation(agent.heading);

        let mut handle = assets.material_for(agent.tint);
        if flags.case_study && sprite.index == snapshot.case_study {
            handle = assets.case_study.clone();
        }
        if flags.case_study && flags.show_nearest && sprite.index == snapshot.nearest_to_case_study
        {
            handle = assets.nearest.clone();
        }
        *material = handle;
    }
}

/// Arena border at the margin rectangle, wrap-threshold border just outside.
pub fn draw_arena(mut gizmos: Gizmos, config: Res<SimulationConfig>, layout: Res<ArenaLayout>) {
    let center = layout.to_world(Vec2::splat(0.5));

    let inner = 1.0 - 2.0 * config.margin;
    gizmos.rect_2d(
        center,
        0.0,
        Vec2::new(inner * config.arena_width, inner * config.arena_height),
        arena_border_color(),
    );

    let threshold = config.margin - config.wrap_buffer;
    let outer = 1.0 - 2.0 * threshold;
    gizmos.rect_2d(
        center,
        0.0,
        Vec2::new(outer * config.arena_width, outer * config.arena_height),
        buffer_border_color(),
    );
}
