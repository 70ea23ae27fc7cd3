//! Generation-file rotation engine.
//!
//! A *generation* is one file in a rotating series behind a stable stream
//! name: `loopstats.20240301`, `loopstats.20240302`, and so on, with an
//! optional hard link keeping the bare `loopstats` name pointed at the live
//! file. This crate provides:
//! - suffix construction per rotation policy, with validity windows over
//!   wrapping 32-bit NTP-era stamps
//! - collision handling that never destroys the only copy of existing data
//! - the rotation engine itself (`rotate`, `tick`, `configure`)
//! - a name-keyed registry owning the stream descriptors
//!
//! Nothing in here reads the clock, the process id, or any global state;
//! callers supply `now`, `pivot`, and `pid` so behavior is replayable.

pub mod collision;
pub mod engine;
pub mod generation;
pub mod registry;
pub mod suffix;
pub mod validity;

pub use collision::{CollisionAction, CollisionResolver, CollisionWarning};
pub use engine::{configure, rotate, tick};
pub use generation::{validate_file_ref, GenFlags, Generation, RotationPolicy, ValidationError};
pub use registry::{FilegenRegistry, RegistryError};
pub use suffix::{build_suffix, GenSuffix, SUFFIX_SEP};
pub use validity::Validity;
