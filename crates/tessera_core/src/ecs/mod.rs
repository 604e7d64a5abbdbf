//! Entity Component System core types.
//!
//! Entities are open sets of named components holding opaque JSON data.
//! Systems look entities up through filters, component-name lists with
//! optional `!` negations, whose results are memoized per filter and kept
//! current by every mutation. Each filter can also report which entities
//! started or stopped matching during the current frame.
//!
//! Removals can be deferred to the end-of-frame [`World::cleanup`] so all
//! systems in a frame observe the same state. Systems run through six fixed
//! phases; see [`Phase`].

mod component;
mod entity;
mod filter;
mod listener;
mod removal;
mod schedule;
mod stats;
mod system;
mod system_handle;
mod world;

pub use component::{empty_component, ComponentData, ComponentId};
pub use entity::Entity;
pub use filter::{FilterKey, Term};
pub use listener::Listener;
pub use removal::Removal;
pub use stats::{
    StatsEvent, StatsObserver, StatsSnapshot, SystemSnapshot, SystemStats, WorldStats,
};
pub use system::{Callbacks, Phase, System};
pub use system_handle::SystemHandle;
pub use world::{World, WorldConfig, DEFAULT_PUBLISH_INTERVAL};
