//! Release packaging.
//!
//! Produces `gazebo-<version>.tar.gz` from a fixed list of project paths.
//! The work runs as an ordered pipeline of [`ReleaseStep`]s:
//!
//! 1. **Clean** - run the build's own clean command
//! 2. **Stage** - create the `gazebo-<version>` staging directory
//! 3. **Populate** - copy the release contents into it
//! 4. **Prune** - delete version-control metadata directories
//! 5. **Archive** - write the gzip-compressed tarball
//! 6. **Sweep** - remove the staging directory
//!
//! The first failing step aborts the run and nothing is retried. The
//! returned [`ReleaseError`] names that step. When a step after Stage
//! fails, the staging directory and any partial archive are removed on a
//! best-effort basis.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;
use walkdir::WalkDir;

use crate::util::config::ReleaseConfig;
use crate::util::fs::{copy_path, ensure_dir, remove_dir_all_if_exists, remove_file_if_exists};
use crate::util::hash::sha256_file;
use crate::util::process::ProcessBuilder;
use crate::util::shell::{Shell, Status};

/// Paths copied into every release, relative to the project root.
pub const DEFAULT_CONTENTS: &[&str] = &[
    "server",
    "Media",
    "doc",
    "examples",
    "libgazebo",
    "player",
    "worlds",
    "SConstruct",
    "AUTHORS",
    "ChangeLog",
    "NEWS",
    "README",
    "TODO",
    "build.py",
];

/// Version-control metadata directory removed from the release tree.
pub const DEFAULT_VCS_MARKER: &str = ".svn";

/// Prefix of the staging directory and archive names.
pub const DIST_PREFIX: &str = "gazebo-";

/// One stage of the release pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleaseStep {
    Clean,
    Stage,
    Populate,
    Prune,
    Archive,
    Sweep,
}

impl ReleaseStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStep::Clean => "clean",
            ReleaseStep::Stage => "stage",
            ReleaseStep::Populate => "populate",
            ReleaseStep::Prune => "prune",
            ReleaseStep::Archive => "archive",
            ReleaseStep::Sweep => "sweep",
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A release pipeline step failed.
#[derive(Debug, Error)]
#[error("release step `{step}` failed")]
pub struct ReleaseError {
    pub step: ReleaseStep,
    #[source]
    pub source: anyhow::Error,
}

/// Which errors the Prune step accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruneTolerance {
    /// A metadata entry that vanished before it could be removed is fine.
    #[default]
    MissingEntries,
    /// Every error fails the step.
    Strict,
}

impl PruneTolerance {
    fn accepts(&self, err: &io::Error) -> bool {
        *self == PruneTolerance::MissingEntries && err.kind() == io::ErrorKind::NotFound
    }
}

/// Inputs of a release run.
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Version embedded in directory and archive names
    pub version: String,
    /// Directory the release contents are copied from
    pub project_root: PathBuf,
    /// Directory receiving the staging tree and the archive
    pub output_dir: PathBuf,
    /// Paths copied into the release, relative to `project_root`
    pub contents: Vec<String>,
    /// Name of version-control metadata directories to prune
    pub vcs_marker: String,
    /// Clean command run in `project_root`; empty skips the step
    pub clean_command: Vec<String>,
    pub prune_tolerance: PruneTolerance,
}

impl ReleaseOptions {
    /// Defaults: built-in contents, `.svn` pruning, `scons -c`, output into
    /// the project root.
    pub fn new(version: impl Into<String>, project_root: impl Into<PathBuf>) -> Self {
        Self::from_config(&ReleaseConfig::default(), version, project_root)
    }

    /// Options from the `[release]` section of the project config.
    pub fn from_config(
        config: &ReleaseConfig,
        version: impl Into<String>,
        project_root: impl Into<PathBuf>,
    ) -> Self {
        let project_root = project_root.into();
        ReleaseOptions {
            version: version.into(),
            output_dir: project_root.clone(),
            project_root,
            contents: config.contents.clone(),
            vcs_marker: config.vcs_marker.clone(),
            clean_command: config.clean_command.clone(),
            prune_tolerance: PruneTolerance::default(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Disable the Clean step.
    pub fn without_clean(mut self) -> Self {
        self.clean_command.clear();
        self
    }

    /// `gazebo-<version>`
    pub fn dist_name(&self) -> String {
        format!("{}{}", DIST_PREFIX, self.version)
    }

    pub fn stage_dir(&self) -> PathBuf {
        self.output_dir.join(self.dist_name())
    }

    /// `gazebo-<version>.tar.gz` in the output directory
    pub fn archive_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.tar.gz", self.dist_name()))
    }
}

/// Result of a successful release run.
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub archive: PathBuf,
    /// Number of metadata entries removed by Prune
    pub pruned: usize,
    /// Hex SHA-256 of the archive
    pub sha256: String,
}

/// Run the release pipeline.
pub fn create_release(opts: &ReleaseOptions, shell: &Shell) -> Result<ReleaseReport, ReleaseError> {
    run_pipeline(opts, shell).map_err(|err| {
        tracing::error!("release aborted at step `{}`: {:#}", err.step, err.source);
        cleanup_after_failure(opts, err.step);
        err
    })
}

fn run_pipeline(opts: &ReleaseOptions, shell: &Shell) -> Result<ReleaseReport, ReleaseError> {
    let stage = opts.stage_dir();
    let archive = opts.archive_path();

    run_step(ReleaseStep::Clean, || clean(opts, shell))?;
    run_step(ReleaseStep::Stage, || create_stage(&stage, shell))?;
    run_step(ReleaseStep::Populate, || {
        populate(&opts.project_root, &stage, &opts.contents, shell)
    })?;
    let pruned = run_step(ReleaseStep::Prune, || {
        prune(&stage, &opts.vcs_marker, opts.prune_tolerance, shell)
    })?;
    let sha256 = run_step(ReleaseStep::Archive, || {
        write_archive(&stage, &opts.dist_name(), &archive, shell)?;
        sha256_file(&archive)
    })?;
    run_step(ReleaseStep::Sweep, || sweep(&stage, shell))?;

    Ok(ReleaseReport {
        archive,
        pruned,
        sha256,
    })
}

fn run_step<T>(step: ReleaseStep, f: impl FnOnce() -> Result<T>) -> Result<T, ReleaseError> {
    tracing::info!("release step: {}", step);
    f().map_err(|source| ReleaseError { step, source })
}

/// Remove what a failed run left behind. Only steps after Stage own the
/// staging directory; an existing directory that made Stage fail is kept.
fn cleanup_after_failure(opts: &ReleaseOptions, failed: ReleaseStep) {
    if failed <= ReleaseStep::Stage {
        return;
    }

    if let Err(e) = remove_dir_all_if_exists(&opts.stage_dir()) {
        tracing::warn!("cleanup after failed release: {:#}", e);
    }

    if failed == ReleaseStep::Archive {
        if let Err(e) = remove_file_if_exists(&opts.archive_path()) {
            tracing::warn!("cleanup after failed release: {:#}", e);
        }
    }
}

fn clean(opts: &ReleaseOptions, shell: &Shell) -> Result<()> {
    let Some((program, args)) = opts.clean_command.split_first() else {
        shell.status(Status::Skipped, "clean (no clean command configured)");
        return Ok(());
    };

    let cmd = ProcessBuilder::new(program)
        .args(args)
        .cwd(&opts.project_root);
    shell.status(Status::Cleaning, cmd.display_command());
    cmd.exec_and_check()?;
    Ok(())
}

fn create_stage(stage: &Path, shell: &Shell) -> Result<()> {
    if stage.exists() {
        bail!(
            "staging directory `{}` already exists; remove it and retry",
            stage.display()
        );
    }
    if let Some(parent) = stage.parent() {
        ensure_dir(parent)?;
    }

    fs::create_dir(stage)
        .with_context(|| format!("failed to create staging directory: {}", stage.display()))?;
    shell.status(Status::Staging, stage.display());
    Ok(())
}

fn populate(root: &Path, stage: &Path, contents: &[String], shell: &Shell) -> Result<()> {
    for entry in contents {
        let src = root.join(entry);
        if !src.exists() {
            bail!("release path `{}` not found in {}", entry, root.display());
        }

        let dst = stage.join(entry);
        if let Some(parent) = dst.parent() {
            ensure_dir(parent)?;
        }

        tracing::debug!("copying {}", src.display());
        copy_path(&src, &dst)?;
    }

    shell.status(Status::Copying, format!("{} paths", contents.len()));
    Ok(())
}

/// Delete every entry named `marker` under `stage`; returns how many went.
fn prune(stage: &Path, marker: &str, tolerance: PruneTolerance, shell: &Shell) -> Result<usize> {
    let mut targets = Vec::new();
    let mut walker = WalkDir::new(stage).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.io_error().is_some_and(|io| tolerance.accepts(io)) => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("failed to scan {}", stage.display()))
            }
        };

        if entry.file_name() == marker {
            let is_dir = entry.file_type().is_dir();
            targets.push((entry.into_path(), is_dir));
            if is_dir {
                walker.skip_current_dir();
            }
        }
    }

    let mut pruned = 0;
    for (path, is_dir) in targets {
        let removed = if is_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        match removed {
            Ok(()) => pruned += 1,
            Err(e) if tolerance.accepts(&e) => {
                tracing::debug!("already gone: {}", path.display());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to remove {}", path.display()))
            }
        }
    }

    shell.status(
        Status::Pruning,
        format!("removed {} `{}` entries", pruned, marker),
    );
    Ok(pruned)
}

/// Modification time stamped on every archive entry.
const ARCHIVE_MTIME: u64 = 0;

/// Write `stage` as a gzip tarball whose single top-level directory is
/// `dist_name`.
///
/// Entries are sorted and their headers carry a fixed mtime and root
/// ownership, so the same tree always yields the same bytes.
fn write_archive(stage: &Path, dist_name: &str, archive: &Path, shell: &Shell) -> Result<()> {
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string());
    shell.status(Status::Packaging, format!("Creating tarball {}", file_name));

    let entries = WalkDir::new(stage)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to scan {}", stage.display()))?;

    let file = File::create(archive)
        .with_context(|| format!("failed to create {}", archive.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut progress = shell.progress(entries.len() as u64, "Archiving");
    for entry in &entries {
        let rel = entry.path().strip_prefix(stage)?;
        let name = if rel.as_os_str().is_empty() {
            PathBuf::from(dist_name)
        } else {
            Path::new(dist_name).join(rel)
        };

        append_entry(&mut builder, entry, &name)
            .with_context(|| format!("failed to add {} to archive", entry.path().display()))?;

        progress.inc(1, name.display());
    }
    progress.finish();

    let mut writer = builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .with_context(|| format!("failed to finish {}", archive.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", archive.display()))?;

    Ok(())
}

fn entry_header(entry_type: tar::EntryType, mode: u32, size: u64) -> tar::Header {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_size(size);
    header.set_mtime(ARCHIVE_MTIME);
    header.set_uid(0);
    header.set_gid(0);
    header
}

fn append_entry<W: Write>(
    builder: &mut tar::Builder<W>,
    entry: &walkdir::DirEntry,
    name: &Path,
) -> Result<()> {
    let ty = entry.file_type();

    if ty.is_symlink() {
        let target = fs::read_link(entry.path())?;
        let mut header = entry_header(tar::EntryType::Symlink, 0o777, 0);
        builder.append_link(&mut header, name, &target)?;
    } else if ty.is_dir() {
        let mut header = entry_header(tar::EntryType::Directory, 0o755, 0);
        builder.append_data(&mut header, name, io::empty())?;
    } else if ty.is_file() {
        let file = File::open(entry.path())?;
        let meta = file.metadata()?;
        let mut header = entry_header(tar::EntryType::Regular, file_mode(&meta), meta.len());
        builder.append_data(&mut header, name, file)?;
    } else {
        bail!("unsupported file type: {}", entry.path().display());
    }

    Ok(())
}

/// Keep the executable bit, drop everything else that varies per host.
#[cfg(unix)]
fn file_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    if meta.permissions().mode() & 0o111 != 0 {
        0o755
    } else {
        0o644
    }
}

#[cfg(not(unix))]
fn file_mode(_meta: &fs::Metadata) -> u32 {
    0o644
}

fn sweep(stage: &Path, shell: &Shell) -> Result<()> {
    fs::remove_dir_all(stage)
        .with_context(|| format!("failed to remove staging directory: {}", stage.display()))?;
    shell.status(Status::Removed, stage.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    /// Lay out a project tree with every default release path plus
    /// scattered `.svn` metadata.
    fn fake_project(root: &Path) {
        for dir in ["server", "Media", "doc", "examples", "libgazebo", "player", "worlds"] {
            fs::create_dir_all(root.join(dir).join(".svn/text-base")).unwrap();
            fs::write(root.join(dir).join(".svn/entries"), "10\n").unwrap();
            fs::write(root.join(dir).join(".svn/text-base/x.svn-base"), "x").unwrap();
            fs::write(root.join(dir).join("SConscript"), format!("# {}\n", dir)).unwrap();
        }
        fs::create_dir_all(root.join("server/physics/ode/.svn")).unwrap();
        fs::write(root.join("server/physics/ode/ODEPhysics.cc"), "// ode\n").unwrap();
        fs::write(root.join("server/physics/ode/.svn/entries"), "10\n").unwrap();
        fs::create_dir_all(root.join(".svn")).unwrap();

        for file in ["SConstruct", "AUTHORS", "ChangeLog", "NEWS", "README", "TODO", "build.py"] {
            fs::write(root.join(file), format!("{}\n", file)).unwrap();
        }

        // Not part of the release
        fs::write(root.join("config.log"), "junk").unwrap();
    }

    fn options(root: &Path) -> ReleaseOptions {
        ReleaseOptions::new("0.8-pre1", root).without_clean()
    }

    fn unpack(archive: &Path, dest: &Path) {
        let file = File::open(archive).unwrap();
        tar::Archive::new(GzDecoder::new(file)).unpack(dest).unwrap();
    }

    #[test]
    fn test_step_order() {
        assert!(ReleaseStep::Clean < ReleaseStep::Stage);
        assert!(ReleaseStep::Stage < ReleaseStep::Populate);
        assert!(ReleaseStep::Populate < ReleaseStep::Prune);
        assert!(ReleaseStep::Prune < ReleaseStep::Archive);
        assert!(ReleaseStep::Archive < ReleaseStep::Sweep);
        assert_eq!(ReleaseStep::Populate.to_string(), "populate");
    }

    #[test]
    fn test_option_paths() {
        let opts = ReleaseOptions::new("0.8-pre1", "/src/gazebo").with_output_dir("/tmp/out");
        assert_eq!(opts.dist_name(), "gazebo-0.8-pre1");
        assert_eq!(opts.stage_dir(), PathBuf::from("/tmp/out/gazebo-0.8-pre1"));
        assert_eq!(
            opts.archive_path(),
            PathBuf::from("/tmp/out/gazebo-0.8-pre1.tar.gz")
        );
        assert_eq!(opts.clean_command, vec!["scons", "-c"]);
        assert!(opts.without_clean().clean_command.is_empty());
    }

    #[test]
    fn test_end_to_end_release() {
        let tmp = TempDir::new().unwrap();
        fake_project(tmp.path());

        let report = create_release(&options(tmp.path()), &Shell::silent()).unwrap();

        assert_eq!(report.archive, tmp.path().join("gazebo-0.8-pre1.tar.gz"));
        assert!(report.archive.is_file());
        assert!(!tmp.path().join("gazebo-0.8-pre1").exists());
        // 7 top-level dirs + the nested ode one; the root .svn is not copied
        assert_eq!(report.pruned, 8);
        assert_eq!(report.sha256, sha256_file(&report.archive).unwrap());

        let archives: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tar.gz"))
            .collect();
        assert_eq!(archives.len(), 1);

        let out = TempDir::new().unwrap();
        unpack(&report.archive, out.path());

        let top: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(top, vec!["gazebo-0.8-pre1"]);

        let tree = out.path().join("gazebo-0.8-pre1");
        assert_eq!(fs::read_to_string(tree.join("build.py")).unwrap(), "build.py\n");
        assert!(tree.join("server/physics/ode/ODEPhysics.cc").is_file());
        assert!(tree.join("worlds/SConscript").is_file());
        assert!(!tree.join("config.log").exists());

        for entry in WalkDir::new(out.path()) {
            let entry = entry.unwrap();
            assert_ne!(entry.file_name(), ".svn", "found {}", entry.path().display());
        }
    }

    #[test]
    fn test_populate_failure_stops_pipeline() {
        let tmp = TempDir::new().unwrap();
        fake_project(tmp.path());
        fs::remove_file(tmp.path().join("ChangeLog")).unwrap();
        let opts = options(tmp.path());

        let err = create_release(&opts, &Shell::silent()).unwrap_err();

        assert_eq!(err.step, ReleaseStep::Populate);
        assert!(format!("{:#}", anyhow::Error::new(err)).contains("ChangeLog"));
        assert!(!opts.archive_path().exists());
        assert!(!opts.stage_dir().exists());
    }

    #[test]
    fn test_existing_stage_is_kept() {
        let tmp = TempDir::new().unwrap();
        fake_project(tmp.path());
        let opts = options(tmp.path());
        fs::create_dir(opts.stage_dir()).unwrap();
        fs::write(opts.stage_dir().join("keep.txt"), "mine").unwrap();

        let err = create_release(&opts, &Shell::silent()).unwrap_err();

        assert_eq!(err.step, ReleaseStep::Stage);
        assert_eq!(
            fs::read_to_string(opts.stage_dir().join("keep.txt")).unwrap(),
            "mine"
        );
        assert!(!opts.archive_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_failure_aborts_before_stage() {
        let tmp = TempDir::new().unwrap();
        fake_project(tmp.path());
        let mut opts = options(tmp.path());
        opts.clean_command = vec!["false".to_string()];

        let err = create_release(&opts, &Shell::silent()).unwrap_err();

        assert_eq!(err.step, ReleaseStep::Clean);
        assert_eq!(err.to_string(), "release step `clean` failed");
        assert!(!opts.stage_dir().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_command_runs_in_project_root() {
        let tmp = TempDir::new().unwrap();
        fake_project(tmp.path());
        let mut opts = options(tmp.path());
        opts.clean_command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "rm -f config.log".to_string(),
        ];

        create_release(&opts, &Shell::silent()).unwrap();

        assert!(!tmp.path().join("config.log").exists());
    }

    #[test]
    fn test_output_dir_elsewhere() {
        let project = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fake_project(project.path());
        let opts = options(project.path()).with_output_dir(out.path().join("dist"));

        let report = create_release(&opts, &Shell::silent()).unwrap();

        assert_eq!(report.archive, out.path().join("dist/gazebo-0.8-pre1.tar.gz"));
        assert!(!project.path().join("gazebo-0.8-pre1.tar.gz").exists());
        assert!(!out.path().join("dist/gazebo-0.8-pre1").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_release_keeps_directory_symlinks() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        fake_project(tmp.path());
        fs::create_dir_all(tmp.path().join("server/real")).unwrap();
        fs::write(tmp.path().join("server/real/World.cc"), "// world\n").unwrap();
        symlink("real", tmp.path().join("server/link")).unwrap();

        let report = create_release(&options(tmp.path()), &Shell::silent()).unwrap();

        let out = TempDir::new().unwrap();
        unpack(&report.archive, out.path());
        let server = out.path().join("gazebo-0.8-pre1/server");

        assert!(fs::symlink_metadata(server.join("link"))
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(fs::read_link(server.join("link")).unwrap(), Path::new("real"));
        assert_eq!(
            fs::read_to_string(server.join("link/World.cc")).unwrap(),
            "// world\n"
        );
    }

    #[test]
    fn test_archive_is_reproducible() {
        let project = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fake_project(project.path());

        let first = create_release(
            &options(project.path()).with_output_dir(out.path().join("a")),
            &Shell::silent(),
        )
        .unwrap();
        let second = create_release(
            &options(project.path()).with_output_dir(out.path().join("b")),
            &Shell::silent(),
        )
        .unwrap();

        assert_eq!(first.sha256, second.sha256);

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&first.archive).unwrap()));
        for entry in archive.entries().unwrap() {
            let entry = entry.unwrap();
            let header = entry.header();
            assert_eq!(header.mtime().unwrap(), ARCHIVE_MTIME);
            assert_eq!(header.uid().unwrap(), 0);
            assert_eq!(header.gid().unwrap(), 0);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_failure_removes_partial_tarball() {
        use std::os::unix::net::UnixListener;

        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path());
        let stage = opts.stage_dir();
        fs::create_dir_all(stage.join("server")).unwrap();
        fs::write(stage.join("README"), "README\n").unwrap();
        // Sockets cannot be archived; README is already written by then
        let _socket = UnixListener::bind(stage.join("server/gz.sock")).unwrap();

        let err = write_archive(&stage, &opts.dist_name(), &opts.archive_path(), &Shell::silent())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("unsupported file type"));
        assert!(opts.archive_path().exists());

        cleanup_after_failure(&opts, ReleaseStep::Archive);

        assert!(!opts.archive_path().exists());
        assert!(!stage.exists());
    }

    #[test]
    fn test_failure_before_archive_keeps_existing_tarball() {
        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path());
        fs::create_dir_all(opts.stage_dir()).unwrap();
        fs::write(opts.archive_path(), "previous release").unwrap();

        cleanup_after_failure(&opts, ReleaseStep::Prune);

        assert!(!opts.stage_dir().exists());
        assert_eq!(
            fs::read_to_string(opts.archive_path()).unwrap(),
            "previous release"
        );
    }

    #[test]
    fn test_prune_removes_marker_files_and_dirs() {
        let tmp = TempDir::new().unwrap();
        let stage = tmp.path();
        fs::create_dir_all(stage.join("a/.svn/.svn")).unwrap();
        fs::create_dir_all(stage.join("b")).unwrap();
        fs::write(stage.join("b/.svn"), "file marker").unwrap();
        fs::write(stage.join("b/keep.c"), "int x;").unwrap();

        let pruned = prune(stage, ".svn", PruneTolerance::default(), &Shell::silent()).unwrap();

        // The nested a/.svn/.svn goes with its parent
        assert_eq!(pruned, 2);
        assert!(!stage.join("a/.svn").exists());
        assert!(!stage.join("b/.svn").exists());
        assert!(stage.join("b/keep.c").exists());
    }

    #[test]
    fn test_prune_tolerance() {
        let missing = io::Error::from(io::ErrorKind::NotFound);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);

        assert!(PruneTolerance::MissingEntries.accepts(&missing));
        assert!(!PruneTolerance::MissingEntries.accepts(&denied));
        assert!(!PruneTolerance::Strict.accepts(&missing));
    }
}
