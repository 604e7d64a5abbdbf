// schedule.rs - System registration and the six-phase frame pipeline

use crate::ecs::{Phase, System, SystemHandle, World};
use tessera_metrics::measure;

impl World {
    /// Register a system.
    ///
    /// `factory` runs once, right away, with the world; the system it
    /// returns is called in every phase from then on, after all systems
    /// registered before it.
    pub fn add_system<F, S>(&mut self, factory: F) -> SystemHandle
    where
        F: FnOnce(&mut World) -> S,
        S: System + 'static,
    {
        let system = factory(self);
        let name = system.name();
        let handle = SystemHandle::new(self.stats.systems().len());

        tracing::debug!(system = %name, %handle, "system registered");
        self.stats.register_system(name);
        self.systems.push(Box::new(system));
        handle
    }

    pub fn system_count(&self) -> usize {
        self.stats.systems().len()
    }

    pub fn pre_fixed_update(&mut self, dt: f64) {
        self.run_phase(Phase::PreFixedUpdate, dt);
    }

    pub fn fixed_update(&mut self, dt: f64) {
        self.run_phase(Phase::FixedUpdate, dt);
    }

    pub fn post_fixed_update(&mut self, dt: f64) {
        self.run_phase(Phase::PostFixedUpdate, dt);
    }

    pub fn pre_update(&mut self, dt: f64) {
        self.run_phase(Phase::PreUpdate, dt);
    }

    pub fn update(&mut self, dt: f64) {
        self.run_phase(Phase::Update, dt);
    }

    pub fn post_update(&mut self, dt: f64) {
        self.run_phase(Phase::PostUpdate, dt);
    }

    /// Run all six phases with the same `dt`, then [`World::cleanup`].
    pub fn run_frame(&mut self, dt: f64) {
        for phase in Phase::ALL {
            self.run_phase(phase, dt);
        }
        self.cleanup();
    }

    /// Call every system's callback for `phase`, in registration order.
    ///
    /// Each call is timed into the system's stats, and queries made during
    /// it are attributed to that system.
    pub fn run_phase(&mut self, phase: Phase, dt: f64) {
        self.stats.apply_pending_reset();

        // Systems are moved out so each one can borrow the world mutably
        let mut systems = std::mem::take(&mut self.systems);
        for (index, system) in systems.iter_mut().enumerate() {
            self.stats.enter_system(index);
            let ((), elapsed) = measure(|| system.run(phase, self, dt));
            self.stats.exit_system(elapsed);
        }

        // Systems added while the phase ran go after the existing ones
        systems.append(&mut self.systems);
        self.systems = systems;
        tracing::trace!(phase = phase.as_str(), dt, "phase complete");
    }
}

#[cfg(test)]
mod tests {
    use crate::ecs::{Callbacks, Listener, Phase, Removal, System, World};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn update_mutates_component_and_counts_filter() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, "pos", json!({ "x": 0 }));

        world.add_system(|_world| {
            Callbacks::new("mover").on(Phase::Update, |world, _dt| {
                for entity in world.get_entities(&["pos"], None) {
                    if let Some(pos) = world.component_mut(entity, "pos") {
                        pos["x"] = json!(pos["x"].as_i64().unwrap_or(0) + 5);
                    }
                }
            })
        });

        world.update(16.0);

        assert_eq!(world.component(entity, "pos"), Some(&json!({ "x": 5 })));
        assert_eq!(world.stats().systems()[0].filter_count("pos"), 1);
        assert_eq!(world.stats().filter_invocations("pos"), 1);
    }

    #[test]
    fn phases_and_systems_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();

        for name in ["first", "second"] {
            let log = log.clone();
            world.add_system(move |_world| {
                let mut system = Callbacks::new(name);
                for phase in Phase::ALL {
                    let log = log.clone();
                    system = system.on(phase, move |_, _| {
                        log.borrow_mut().push(format!("{}:{}", phase.as_str(), name))
                    });
                }
                system
            });
        }

        world.pre_fixed_update(1.0);
        world.fixed_update(1.0);
        world.post_fixed_update(1.0);
        world.pre_update(1.0);
        world.update(1.0);
        world.post_update(1.0);

        let expected: Vec<String> = Phase::ALL
            .iter()
            .flat_map(|phase| {
                ["first", "second"]
                    .into_iter()
                    .map(move |name| format!("{}:{}", phase.as_str(), name))
            })
            .collect();
        assert_eq!(*log.borrow(), expected);
    }

    #[test]
    fn factory_receives_world() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_tag(entity, "spawned");

        let handle = world.add_system(|world| {
            let seen = world.get_entities(&["spawned"], None).len();
            Callbacks::new(format!("saw_{}", seen))
        });

        assert_eq!(handle.index(), 0);
        assert_eq!(world.stats().system(handle).map(|s| s.name()), Some("saw_1"));
        assert_eq!(world.system_count(), 1);
    }

    #[test]
    fn omitted_callbacks_are_no_ops() {
        struct OnlyUpdate(Rc<RefCell<u32>>);
        impl System for OnlyUpdate {
            fn update(&mut self, _world: &mut World, _dt: f64) {
                *self.0.borrow_mut() += 1;
            }
        }

        let calls = Rc::new(RefCell::new(0));
        let mut world = World::new();
        let shared = calls.clone();
        world.add_system(move |_| OnlyUpdate(shared));

        world.run_frame(16.0);
        world.run_frame(16.0);
        assert_eq!(*calls.borrow(), 2);
        assert_eq!(world.stats().systems()[0].name(), "OnlyUpdate");
    }

    #[test]
    fn later_systems_see_earlier_mutations() {
        let mut world = World::new();
        let entity = world.create_entity();

        world.add_system(move |_| {
            Callbacks::new("tagger").on(Phase::Update, move |world, _| {
                world.add_tag(entity, "tagged");
            })
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        world.add_system(move |_| {
            Callbacks::new("reader").on(Phase::Update, move |world, _| {
                sink.borrow_mut()
                    .push(world.get_entities(&["tagged"], Some(Listener::Added)));
            })
        });

        world.update(16.0);
        assert_eq!(*seen.borrow(), vec![vec![entity]]);
        assert_eq!(world.stats().systems()[1].filter_count("tagged"), 1);
        assert_eq!(world.stats().systems()[0].filter_count("tagged"), 0);
    }

    #[test]
    fn system_added_during_phase_runs_next_phase() {
        let mut world = World::new();
        let calls = Rc::new(RefCell::new(0));

        let counter = calls.clone();
        world.add_system(move |_| {
            let mut spawned = false;
            Callbacks::new("spawner").on(Phase::Update, move |world, _| {
                if !spawned {
                    spawned = true;
                    let counter = counter.clone();
                    world.add_system(move |_| {
                        Callbacks::new("late").on(Phase::PostUpdate, move |_, _| {
                            *counter.borrow_mut() += 1;
                        })
                    });
                }
            })
        });

        world.update(16.0);
        world.post_update(16.0);

        assert_eq!(world.system_count(), 2);
        assert_eq!(world.stats().systems()[1].name(), "late");
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn frame_stats_reset_before_next_frame() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_tag(entity, "pos");
        world.add_system(|_| {
            Callbacks::new("reader").on(Phase::Update, |world, _| {
                world.get_entities(&["pos"], None);
                std::thread::sleep(Duration::from_millis(1));
            })
        });

        world.run_frame(16.0);
        // The finished frame stays readable after cleanup
        assert_eq!(world.stats().filter_invocations("pos"), 1);
        assert_eq!(world.stats().systems()[0].filter_count("pos"), 1);

        // The next query clears the per-frame counters before counting itself
        world.get_entities(&["pos"], None);
        assert_eq!(world.stats().filter_invocations("pos"), 1);
        assert_eq!(world.stats().systems()[0].filter_count("pos"), 0);
        assert_eq!(world.stats().systems()[0].time_elapsed(), Duration::ZERO);
        assert_eq!(world.stats().current_system(), None);
        assert_eq!(world.stats().entity_count(), 1);
    }

    #[test]
    fn empty_frame_leaves_zeroed_stats() {
        let mut world = World::new();
        world.add_system(|_| Callbacks::new("idle"));

        world.run_frame(16.0);
        let first_query = world.get_entities(&["anything"], None);

        assert!(first_query.is_empty());
        assert_eq!(world.stats().filter_invocations("anything"), 1);
        assert_eq!(world.stats().systems()[0].time_elapsed(), Duration::ZERO);
        assert_eq!(world.stats().systems()[0].filters().total(), 0);
    }

    #[test]
    fn deferred_removals_wait_for_cleanup() {
        let mut world = World::new();
        let doomed = world.create_entity();
        world.add_tag(doomed, "mortal");

        world.add_system(|_| {
            Callbacks::new("reaper").on(Phase::Update, |world, _| {
                for entity in world.get_entities(&["mortal"], None) {
                    world.remove_entity(entity, Removal::Deferred);
                }
            })
        });
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = observed.clone();
        world.add_system(move |_| {
            Callbacks::new("witness").on(Phase::PostUpdate, move |world, _| {
                sink.borrow_mut().push(world.get_entities(&["mortal"], None).len());
            })
        });

        world.run_frame(16.0);
        assert_eq!(*observed.borrow(), vec![1]);
        assert!(!world.contains(doomed));
        assert!(world.entities().is_empty());
    }
}
