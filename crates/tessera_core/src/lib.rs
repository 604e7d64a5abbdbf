//! Tessera Engine Core
//!
//! Contains the fundamental simulation pieces:
//! - Entity Component System (ECS) with memoized filters and change lists
//! - Six-phase system pipeline with per-system stats
//! - Fixed-step simulation time

pub mod ecs;
pub mod time;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
