//! Demo scene: particles that drift, freeze at the arena edge and expire.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tessera_core::ecs::{Callbacks, Entity, Listener, Phase, Removal, System, World};

pub const POSITION: &str = "position";
pub const VELOCITY: &str = "velocity";
pub const LIFETIME: &str = "lifetime";
pub const FROZEN: &str = "frozen";

const ARENA_HALF_WIDTH: f64 = 50.0;
const PARTICLE_LIFETIME: f64 = 3.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

fn read<T: for<'de> Deserialize<'de>>(world: &World, entity: Entity, name: &str) -> Option<T> {
    let data = world.component(entity, name)?;
    T::deserialize(data).ok()
}

fn write<T: Serialize>(world: &mut World, entity: Entity, name: &str, value: &T) {
    if let (Some(slot), Ok(data)) = (world.component_mut(entity, name), serde_json::to_value(value)) {
        *slot = data;
    }
}

pub fn spawn_particle(world: &mut World, position: Vec2, velocity: Vec2) -> Entity {
    let entity = world.create_entity();
    world.add_component(entity, POSITION, json!(position));
    world.add_component(entity, VELOCITY, json!(velocity));
    world.add_component(entity, LIFETIME, json!(PARTICLE_LIFETIME));
    entity
}

/// Seed the world with a ring of particles.
pub fn populate(world: &mut World) {
    for i in 0..16 {
        let angle = i as f64 * std::f64::consts::TAU / 16.0;
        let velocity = Vec2 {
            x: angle.cos() * 20.0,
            y: angle.sin() * 20.0,
        };
        spawn_particle(world, Vec2::default(), velocity);
    }
}

pub fn register_systems(world: &mut World) {
    world.add_system(|_| Movement);
    world.add_system(|_| Bounds);
    world.add_system(|_| Expiry);
    world.add_system(|world| Spawner::new(world.entities().len()));
    world.add_system(|_| {
        Callbacks::new("reporter").on(Phase::PostUpdate, |world, _dt| {
            let spawned = world.get_entities(&[POSITION], Some(Listener::Added)).len();
            let removed = world.get_entities(&[POSITION], Some(Listener::Removed)).len();
            if spawned > 0 || removed > 0 {
                tracing::debug!(spawned, removed, "particles changed");
            }
        })
    });
}

/// Integrates velocity into position for every particle that is not frozen.
pub struct Movement;

impl System for Movement {
    fn fixed_update(&mut self, world: &mut World, dt: f64) {
        for entity in world.get_entities(&[POSITION, VELOCITY, "!frozen"], None) {
            let (Some(mut position), Some(velocity)) = (
                read::<Vec2>(world, entity, POSITION),
                read::<Vec2>(world, entity, VELOCITY),
            ) else {
                continue;
            };
            position.x += velocity.x * dt;
            position.y += velocity.y * dt;
            write(world, entity, POSITION, &position);
        }
    }
}

/// Freezes particles that reach the arena edge.
pub struct Bounds;

impl System for Bounds {
    fn post_fixed_update(&mut self, world: &mut World, _dt: f64) {
        for entity in world.get_entities(&[POSITION, "!frozen"], None) {
            let Some(position) = read::<Vec2>(world, entity, POSITION) else {
                continue;
            };
            if position.x.abs() >= ARENA_HALF_WIDTH || position.y.abs() >= ARENA_HALF_WIDTH {
                world.add_tag(entity, FROZEN);
                world.remove_component(entity, VELOCITY, Removal::Deferred);
            }
        }
    }
}

/// Counts lifetimes down and removes expired particles at the end of the
/// frame.
pub struct Expiry;

impl System for Expiry {
    fn fixed_update(&mut self, world: &mut World, dt: f64) {
        for entity in world.get_entities(&[LIFETIME], None) {
            if world.is_removal_pending(entity) {
                continue;
            }
            let remaining = read::<f64>(world, entity, LIFETIME).unwrap_or(0.0) - dt;
            if remaining <= 0.0 {
                world.remove_entity(entity, Removal::Deferred);
            } else {
                write(world, entity, LIFETIME, &remaining);
            }
        }
    }
}

/// Keeps the particle population topped up.
pub struct Spawner {
    target: usize,
    emitted: u64,
}

impl Spawner {
    fn new(target: usize) -> Self {
        Self { target, emitted: 0 }
    }
}

impl System for Spawner {
    fn pre_update(&mut self, world: &mut World, _dt: f64) {
        let live = world.stats().entity_count();
        for _ in live..self.target {
            let angle = self.emitted as f64 * 0.618 * std::f64::consts::TAU;
            let velocity = Vec2 {
                x: angle.cos() * 15.0,
                y: angle.sin() * 15.0,
            };
            spawn_particle(world, Vec2::default(), velocity);
            self.emitted += 1;
        }
    }
}
