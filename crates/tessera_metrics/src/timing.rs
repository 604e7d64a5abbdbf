//! Wall-clock measurement of a single call

use std::time::Duration;

/// Run `f` and report how long it took.
///
/// Reads the clock only with the `metrics` feature; otherwise the reported
/// duration is always zero.
#[inline]
pub fn measure<F, R>(f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    #[cfg(feature = "metrics")]
    {
        let start = std::time::Instant::now();
        let result = f();
        (result, start.elapsed())
    }
    #[cfg(not(feature = "metrics"))]
    {
        (f(), Duration::ZERO)
    }
}
