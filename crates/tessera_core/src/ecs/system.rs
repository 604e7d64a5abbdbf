//! Systems and the phases they run in
//!
//! A system is created once by a factory that receives the world, then gets
//! called in each of the six per-frame phases. Every phase callback
//! defaults to a no-op.
//!
//! Systems run in the order they were added, one at a time.

use crate::ecs::World;

/// The six per-frame update stages, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    PreFixedUpdate,
    FixedUpdate,
    PostFixedUpdate,
    PreUpdate,
    Update,
    PostUpdate,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::PreFixedUpdate,
        Phase::FixedUpdate,
        Phase::PostFixedUpdate,
        Phase::PreUpdate,
        Phase::Update,
        Phase::PostUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::PreFixedUpdate => "pre_fixed_update",
            Phase::FixedUpdate => "fixed_update",
            Phase::PostFixedUpdate => "post_fixed_update",
            Phase::PreUpdate => "pre_update",
            Phase::Update => "update",
            Phase::PostUpdate => "post_update",
        }
    }
}

/// A system driven by the world's phase pipeline.
///
/// `dt` is whatever elapsed-time value the frame loop passes in.
#[allow(unused_variables)]
pub trait System {
    /// Name used in stats. Defaults to the short type name.
    fn name(&self) -> String {
        short_system_name(std::any::type_name::<Self>())
    }

    fn pre_fixed_update(&mut self, world: &mut World, dt: f64) {}
    fn fixed_update(&mut self, world: &mut World, dt: f64) {}
    fn post_fixed_update(&mut self, world: &mut World, dt: f64) {}
    fn pre_update(&mut self, world: &mut World, dt: f64) {}
    fn update(&mut self, world: &mut World, dt: f64) {}
    fn post_update(&mut self, world: &mut World, dt: f64) {}

    /// Dispatch to the callback for `phase`.
    fn run(&mut self, phase: Phase, world: &mut World, dt: f64) {
        match phase {
            Phase::PreFixedUpdate => self.pre_fixed_update(world, dt),
            Phase::FixedUpdate => self.fixed_update(world, dt),
            Phase::PostFixedUpdate => self.post_fixed_update(world, dt),
            Phase::PreUpdate => self.pre_update(world, dt),
            Phase::Update => self.update(world, dt),
            Phase::PostUpdate => self.post_update(world, dt),
        }
    }
}

type Hook = Box<dyn FnMut(&mut World, f64)>;

/// Closure-based system, for when a struct is overkill.
///
/// ```ignore
/// world.add_system(|_world| {
///     Callbacks::new("gravity").on(Phase::FixedUpdate, |world, dt| {
///         for entity in world.get_entities(&["velocity"], None) {
///             // ...
///         }
///     })
/// });
/// ```
pub struct Callbacks {
    name: String,
    hooks: [Hook; 6],
}

impl Callbacks {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: std::array::from_fn(|_| Box::new(|_: &mut World, _: f64| {}) as Hook),
        }
    }

    /// Set the callback for `phase`, replacing any previous one.
    pub fn on<F>(mut self, phase: Phase, hook: F) -> Self
    where
        F: FnMut(&mut World, f64) + 'static,
    {
        self.hooks[phase as usize] = Box::new(hook);
        self
    }
}

impl System for Callbacks {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn run(&mut self, phase: Phase, world: &mut World, dt: f64) {
        (self.hooks[phase as usize])(world, dt);
    }
}

/// Strip the module path from a fully-qualified type name, keeping only the
/// last meaningful segment (e.g. `game::systems::Movement` → `Movement`,
/// `{{closure}}` → `<closure>`).
pub(crate) fn short_system_name(full: &str) -> String {
    // Drop generic arguments before splitting on the path separator
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    if name.contains("closure") || name.is_empty() {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}
