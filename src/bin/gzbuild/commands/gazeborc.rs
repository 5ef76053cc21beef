//! `gzbuild gazeborc` command

use anyhow::Result;

use crate::cli::GazeborcArgs;
use gzbuild::ops::{
    generate_runtime_config, FixedPluginDir, PkgConfigQuery, PluginDirSource, UserConfigInstall,
};
use gzbuild::util::process::find_pkg_config;
use gzbuild::util::shell::Status;
use gzbuild::util::{GlobalContext, Shell};

pub fn execute(args: GazeborcArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let settings = &ctx.config().runtime;
    let target = ctx.resolve(&args.output);
    let home = ctx.home()?;

    let fixed = args.ogre_path.or_else(|| settings.ogre_path.clone());
    let plugins: Box<dyn PluginDirSource> = match fixed {
        Some(dir) => Box::new(FixedPluginDir(dir)),
        None => {
            let tool = settings.pkg_config.clone().unwrap_or_else(find_pkg_config);
            Box::new(PkgConfigQuery::new(tool, settings.plugin_package.as_str()))
        }
    };

    let outcome = generate_runtime_config(&target, &args.prefix, plugins.as_ref(), home)?;
    shell.status(Status::Created, target.display());

    match outcome {
        UserConfigInstall::Installed(path) => {
            shell.status(Status::Installed, path.display());
        }
        UserConfigInstall::AlreadyPresent(path) => {
            shell.status(
                Status::Skipped,
                format!("{} already exists, not overwriting", path.display()),
            );
        }
    }

    Ok(())
}
