//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use gzbuild::util::shell::ColorChoice;

/// gzbuild - build-time support for the Gazebo simulator
#[derive(Parser)]
#[command(name = "gzbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether ODE with trimesh support can be linked
    Probe(ProbeArgs),

    /// Generate the gazebo.pc discovery descriptor
    Pkgconfig(PkgconfigArgs),

    /// Generate the gazeborc runtime configuration and install it for the user
    Gazeborc(GazeborcArgs),

    /// Package a versioned source release tarball
    Release(ReleaseArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ProbeArgs {
    /// C++ compiler driver to use
    #[arg(long, env = "CXX")]
    pub cxx: Option<PathBuf>,

    /// Additional library search directory
    #[arg(short = 'L', long = "lib-dir")]
    pub lib_dirs: Vec<PathBuf>,

    /// Additional include directory
    #[arg(short = 'I', long = "include-dir")]
    pub include_dirs: Vec<PathBuf>,

    /// Exit with an error when the library is not available
    #[arg(long)]
    pub require: bool,

    /// Print the result as a JSON event
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PkgconfigArgs {
    /// Install prefix
    #[arg(long)]
    pub prefix: String,

    /// Output file
    #[arg(short, long, default_value = "gazebo.pc")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct GazeborcArgs {
    /// Install prefix
    #[arg(long)]
    pub prefix: String,

    /// Output file in the build tree
    #[arg(short, long, default_value = "gazeborc")]
    pub output: PathBuf,

    /// OGRE plugin directory (skips the pkg-config query)
    #[arg(long)]
    pub ogre_path: Option<String>,
}

#[derive(Args)]
pub struct ReleaseArgs {
    /// Release version (defaults to the project version)
    #[arg(long = "release-version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Directory receiving the tarball
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Skip the clean step
    #[arg(long)]
    pub no_clean: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
