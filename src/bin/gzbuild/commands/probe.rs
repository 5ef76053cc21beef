//! `gzbuild probe` command

use anyhow::{bail, Result};

use crate::cli::ProbeArgs;
use gzbuild::ops::probe::{self, LinkConfig, Probe, ProbeToolchain};
use gzbuild::util::{GlobalContext, Shell};

pub fn execute(args: ProbeArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let settings = &ctx.config().probe;

    let mut link = LinkConfig {
        libs: Vec::new(),
        lib_dirs: settings.lib_dirs.clone(),
        include_dirs: settings.include_dirs.clone(),
        cflags: settings.cflags.clone(),
        ldflags: settings.ldflags.clone(),
    };
    link.lib_dirs.extend(args.lib_dirs.iter().map(|d| ctx.resolve(d)));
    link.include_dirs.extend(args.include_dirs.iter().map(|d| ctx.resolve(d)));

    let ode = Probe::ode();
    let cxx = args.cxx.as_deref().or(settings.cxx.as_deref());

    let available = match ProbeToolchain::detect(cxx)
        .and_then(|toolchain| probe::check(shell, &toolchain, &ode, &link))
    {
        Ok(result) => result.available,
        Err(e) => {
            // Detection failed before `check` could announce the probe
            if matches!(e, probe::ProbeError::NoCompiler) {
                shell.message(ode.message());
                probe::report(shell, &ode.label, false);
            }
            shell.warn(format!("{:#}", anyhow::Error::new(e)));
            false
        }
    };

    if args.require && !available {
        bail!("{} is required but not available", ode.label);
    }

    Ok(())
}
