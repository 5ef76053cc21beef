//! gzbuild - build-time support for the Gazebo simulator
//!
//! This crate provides the pieces an outer build calls into:
//! capability probes for optional native libraries, generation of the
//! `gazebo.pc` descriptor and the `gazeborc` runtime configuration, and
//! packaging of versioned source releases.

pub mod ops;
pub mod util;

pub use ops::{LinkConfig, Probe, ProbeResult, ReleaseOptions, ReleaseStep};
pub use util::context::GlobalContext;

/// Version identifier of the distributable release.
pub const VERSION: &str = "0.8-pre1";
