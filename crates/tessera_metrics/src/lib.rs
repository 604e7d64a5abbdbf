//! Tessera Metrics - Common utilities for per-frame bookkeeping
//!
//! Provides the small building blocks the world's stats pipeline is made of:
//!
//! - [`Counter`] - keyed counters with zero-preserving resets
//! - [`Throttle`] - rate limiter for best-effort publishing
//! - [`measure`] - wall-clock timing of a closure
//!
//! # Feature Flags
//!
//! - `metrics` - Enable wall-clock measurement (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use tessera_metrics::{measure, Counter};
//!
//! let mut calls = Counter::new();
//! let (_, elapsed) = measure(|| calls.increment("update", 1));
//! println!("took {:?}", elapsed);
//! ```
//!
//! Without the `metrics` feature, [`measure`] never reads the clock and
//! reports a zero duration.

mod counter;
mod throttle;
mod timing;

pub use counter::Counter;
pub use throttle::Throttle;
pub use timing::measure;

