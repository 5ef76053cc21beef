//! High-level operations.
//!
//! This module contains the implementation of gzbuild commands.

pub mod gazeborc;
pub mod pkg_config;
pub mod probe;
pub mod release;

pub use gazeborc::{
    generate_runtime_config, install_user_config, render_runtime_config, FixedPluginDir,
    PkgConfigQuery, PluginDirSource, UserConfigInstall,
};
pub use pkg_config::{generate_discovery_descriptor, render_discovery_descriptor};
pub use probe::{run_probe, LinkConfig, Probe, ProbeError, ProbeResult, ProbeToolchain};
pub use release::{
    create_release, PruneTolerance, ReleaseError, ReleaseOptions, ReleaseReport, ReleaseStep,
};
