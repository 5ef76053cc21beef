//! gzbuild CLI - build-time support for the Gazebo simulator

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use gzbuild::util::{GlobalContext, Shell};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; GZBUILD_LOG overrides the flag-derived filter
    let filter = EnvFilter::try_from_env("GZBUILD_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("gzbuild=debug")
        } else {
            EnvFilter::new("gzbuild=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let json = matches!(&cli.command, Commands::Probe(args) if args.json);
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color, json);

    let ctx = match cli.directory {
        Some(dir) => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            GlobalContext::with_cwd(cwd.join(dir))?
        }
        None => GlobalContext::new()?,
    };

    // Execute command
    match cli.command {
        Commands::Probe(args) => commands::probe::execute(args, &ctx, &shell),
        Commands::Pkgconfig(args) => commands::pkgconfig::execute(args, &ctx, &shell),
        Commands::Gazeborc(args) => commands::gazeborc::execute(args, &ctx, &shell),
        Commands::Release(args) => commands::release::execute(args, &ctx, &shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
