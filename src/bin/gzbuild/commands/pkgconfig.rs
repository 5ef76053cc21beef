//! `gzbuild pkgconfig` command

use anyhow::Result;

use crate::cli::PkgconfigArgs;
use gzbuild::ops::generate_discovery_descriptor;
use gzbuild::util::shell::Status;
use gzbuild::util::{GlobalContext, Shell};

pub fn execute(args: PkgconfigArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let target = ctx.resolve(&args.output);

    generate_discovery_descriptor(&target, &args.prefix, ctx.config().version())?;
    shell.status(Status::Created, target.display());

    Ok(())
}
