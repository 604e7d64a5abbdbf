// component.rs - Runtime component name registry
//
// Components are identified by name at the API surface and by interned u32
// IDs internally. Payloads are opaque JSON values so scripted and Rust-side
// systems can share them.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Opaque payload attached to an entity under a component name.
pub type ComponentData = Value;

/// Interned component name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

#[derive(Default)]
struct Registry {
    ids: HashMap<Arc<str>, ComponentId>,
    names: Vec<Arc<str>>,
}

/// Global registry shared by every world in the process.
static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::default()));

impl ComponentId {
    /// Intern `name`, allocating a new id on first sight.
    pub fn intern(name: &str) -> Self {
        if let Some(id) = Self::lookup(name) {
            return id;
        }

        let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have won the race between the two locks
        if let Some(&id) = registry.ids.get(name) {
            return id;
        }
        let id = ComponentId(registry.names.len() as u32);
        let name: Arc<str> = Arc::from(name);
        registry.names.push(name.clone());
        registry.ids.insert(name, id);
        id
    }

    /// Look up an already interned name without registering it.
    pub fn lookup(name: &str) -> Option<Self> {
        REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ids
            .get(name)
            .copied()
    }

    /// The name this id was interned from.
    pub fn name(self) -> Arc<str> {
        REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .get(self.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from("<unknown>"))
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Payload used when a component is added without data.
pub fn empty_component() -> ComponentData {
    Value::Object(Map::new())
}
