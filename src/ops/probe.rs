//! Capability probes for optional native libraries.
//!
//! A probe compiles and links a tiny program against one library and reports
//! whether that worked. The outer build uses the answer to decide whether to
//! compile optional features (ODE trimesh collision support, for example).
//!
//! The caller's [`LinkConfig`] is only ever borrowed. The probe links against
//! a configuration of its own, so nothing the caller owns changes, whatever
//! the outcome.
//!
//! A library that is missing and a library that lacks the probed symbol
//! both fail at link time. They are reported the same way: not available.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::util::process::{find_cxx_compiler, ProcessBuilder};
use crate::util::Shell;

/// Test program exercising ODE's trimesh support.
pub const ODE_PROBE_SOURCE: &str = "\
#include <ode/ode.h>
int main()
{
  dGeomTriMeshDataCreate();
  return 0;
}
";

const PROBE_STEM: &str = "conftest";

/// Error that prevents a probe from running at all.
///
/// A failed compile or link is *not* an error; it is a negative
/// [`ProbeResult`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no C++ compiler found (tried $CXX, c++, g++, clang++)")]
    NoCompiler,

    #[error("failed to prepare probe scratch directory")]
    Scratch(#[source] std::io::Error),

    #[error("failed to run compiler `{}`", compiler.display())]
    Spawn {
        compiler: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Compile and link settings owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkConfig {
    /// Libraries linked by default (`-l<name>`)
    pub libs: Vec<String>,
    /// Library search directories (`-L<dir>`)
    pub lib_dirs: Vec<PathBuf>,
    /// Include directories (`-I<dir>`)
    pub include_dirs: Vec<PathBuf>,
    /// Extra compiler flags
    pub cflags: Vec<String>,
    /// Extra linker flags
    pub ldflags: Vec<String>,
}

impl LinkConfig {
    /// A copy of this configuration that links only `library`.
    pub fn with_only_lib(&self, library: &str) -> LinkConfig {
        LinkConfig {
            libs: vec![library.to_string()],
            ..self.clone()
        }
    }
}

/// A single compile+link check.
#[derive(Debug, Clone)]
pub struct Probe {
    /// Label shown to the user ("ODE")
    pub label: String,
    /// Library to link against ("ode")
    pub library: String,
    /// Program source
    pub source: String,
    /// Source file extension, selects the language (".cpp")
    pub extension: String,
}

impl Probe {
    /// The ODE trimesh probe.
    pub fn ode() -> Self {
        Probe {
            label: "ODE".to_string(),
            library: "ode".to_string(),
            source: ODE_PROBE_SOURCE.to_string(),
            extension: ".cpp".to_string(),
        }
    }

    /// The `Checking for ...` line announced before the result.
    pub fn message(&self) -> String {
        format!("Checking for {}...", self.label)
    }
}

/// Outcome of a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub label: String,
    pub available: bool,
}

impl std::fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Checking for {}... {}",
            self.label,
            if self.available { "yes" } else { "no" }
        )
    }
}

/// Compiler driver used for probes.
#[derive(Debug, Clone)]
pub struct ProbeToolchain {
    cxx: PathBuf,
}

impl ProbeToolchain {
    /// Use a specific compiler driver.
    pub fn new(cxx: impl Into<PathBuf>) -> Self {
        ProbeToolchain { cxx: cxx.into() }
    }

    /// Use the configured compiler, or search `$CXX` and `PATH`.
    pub fn detect(configured: Option<&Path>) -> Result<Self, ProbeError> {
        if let Some(cxx) = configured {
            return Ok(Self::new(cxx));
        }
        find_cxx_compiler()
            .map(Self::new)
            .ok_or(ProbeError::NoCompiler)
    }

    pub fn compiler(&self) -> &Path {
        &self.cxx
    }

    /// Build the one-shot compile+link command for `source`.
    pub fn link_command(&self, source: &Path, output: &Path, config: &LinkConfig) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cxx).args(&config.cflags);

        for dir in &config.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd = cmd.arg(source).arg("-o").arg(output);

        for dir in &config.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        cmd = cmd.args(&config.ldflags);

        for lib in &config.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        // Keep compiler diagnostics stable for the debug log
        cmd.env("LC_ALL", "C")
    }
}

/// Compile and link `probe` against its library.
///
/// `config` supplies search paths and flags. Its `libs` are replaced by the
/// probe's library in a probe-local copy.
pub fn run_probe(
    toolchain: &ProbeToolchain,
    probe: &Probe,
    config: &LinkConfig,
) -> Result<ProbeResult, ProbeError> {
    let scratch = tempfile::Builder::new()
        .prefix("gzbuild-probe-")
        .tempdir()
        .map_err(ProbeError::Scratch)?;

    let source = scratch.path().join(format!("{}{}", PROBE_STEM, probe.extension));
    std::fs::write(&source, &probe.source).map_err(ProbeError::Scratch)?;
    let binary = scratch.path().join(PROBE_STEM);

    let probe_config = config.with_only_lib(&probe.library);
    let output = toolchain
        .link_command(&source, &binary, &probe_config)
        .cwd(scratch.path())
        .exec()
        .map_err(|err| ProbeError::Spawn {
            compiler: toolchain.compiler().to_path_buf(),
            source: err,
        })?;

    let available = output.status.success();
    if !available {
        tracing::debug!(
            "probe for {} failed:\n{}",
            probe.label,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    Ok(ProbeResult {
        label: probe.label.clone(),
        available,
    })
}

/// Run `probe` and report it through `shell` as `Checking for X... yes|no`.
///
/// A probe that cannot run at all is reported as `no` before the error is
/// returned.
pub fn check(
    shell: &Shell,
    toolchain: &ProbeToolchain,
    probe: &Probe,
    config: &LinkConfig,
) -> Result<ProbeResult, ProbeError> {
    shell.message(probe.message());
    let result = run_probe(toolchain, probe, config);
    report(
        shell,
        &probe.label,
        result.as_ref().is_ok_and(|r| r.available),
    );
    result
}

/// Complete a pending probe message with its outcome.
pub fn report(shell: &Shell, label: &str, available: bool) {
    shell.result(available);
    shell.json_event(&serde_json::json!({
        "reason": "probe-result",
        "label": label,
        "available": available,
    }));
}
