//! `gzbuild release` command

use anyhow::Result;

use crate::cli::ReleaseArgs;
use gzbuild::ops::{create_release, ReleaseOptions};
use gzbuild::util::shell::Status;
use gzbuild::util::{GlobalContext, Shell};

pub fn execute(args: ReleaseArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let config = ctx.config();
    let version = args
        .version
        .unwrap_or_else(|| config.version().to_string());

    let mut opts = ReleaseOptions::from_config(&config.release, version, ctx.cwd());
    if let Some(dir) = &args.output_dir {
        opts = opts.with_output_dir(ctx.resolve(dir));
    }
    if args.no_clean {
        opts = opts.without_clean();
    }

    let report = create_release(&opts, shell)?;

    shell.status(Status::Finished, report.archive.display());
    shell.status(Status::Info, format!("sha256 {}", report.sha256));

    Ok(())
}
