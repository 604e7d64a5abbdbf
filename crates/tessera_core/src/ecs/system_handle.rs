use std::fmt;

/// Handle returned when a system is added to a world.
///
/// Doubles as the index of the system's entry in
/// [`WorldStats::systems`](crate::ecs::WorldStats::systems).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SystemHandle(u32);

impl SystemHandle {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Return the raw index backing this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}
