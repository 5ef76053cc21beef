//! Generation of the `gazeborc` runtime configuration.
//!
//! The file records where the simulator's shared data lives and where OGRE
//! keeps its render plugins. It is written into the build tree and then
//! mirrored to `$HOME/.gazeborc` unless the user already has one.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::context::USER_CONFIG_FILE_NAME;
use crate::util::fs::write_string;
use crate::util::process::ProcessBuilder;

/// Source of the rendering engine's plugin directory.
pub trait PluginDirSource {
    /// Return the plugin directory, used verbatim.
    fn plugin_dir(&self) -> Result<String>;
}

/// Queries `pkg-config --variable=plugindir <package>`.
#[derive(Debug, Clone)]
pub struct PkgConfigQuery {
    pub tool: PathBuf,
    pub package: String,
}

impl PkgConfigQuery {
    pub fn new(tool: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        PkgConfigQuery {
            tool: tool.into(),
            package: package.into(),
        }
    }
}

impl PluginDirSource for PkgConfigQuery {
    fn plugin_dir(&self) -> Result<String> {
        let output = ProcessBuilder::new(&self.tool)
            .arg("--variable=plugindir")
            .arg(&self.package)
            .exec_and_check()
            .with_context(|| {
                format!(
                    "`{}` failed to report the {} plugin directory",
                    self.tool.display(),
                    self.package
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// A plugin directory known up front.
#[derive(Debug, Clone)]
pub struct FixedPluginDir(pub String);

impl PluginDirSource for FixedPluginDir {
    fn plugin_dir(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Outcome of mirroring the runtime configuration into the home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserConfigInstall {
    /// The file was copied to this path.
    Installed(PathBuf),
    /// A file already existed at this path and was left alone.
    AlreadyPresent(PathBuf),
}

/// Render the runtime configuration document.
pub fn render_runtime_config(prefix: &str, plugin_dir: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n\
         <gazeborc>\n\
         \x20 <gazeboPath>{prefix}/share/gazebo</gazeboPath>\n\
         \x20 <ogrePath>{plugin_dir}</ogrePath>\n\
         </gazeborc>\n"
    )
}

/// Write the runtime configuration to `target` and mirror it into `home`.
///
/// The plugin directory is taken from `plugins` without checking that it
/// exists.
pub fn generate_runtime_config(
    target: &Path,
    prefix: &str,
    plugins: &dyn PluginDirSource,
    home: &Path,
) -> Result<UserConfigInstall> {
    let plugin_dir = plugins.plugin_dir()?;
    tracing::debug!("plugin directory: {}", plugin_dir);

    write_string(target, &render_runtime_config(prefix, &plugin_dir))?;

    install_user_config(target, home)
}

/// Copy `source` to `home/.gazeborc` if no file exists there yet.
///
/// The existence check and the copy are two separate operations, so another
/// process can create the file in between. The destination is opened with
/// `create_new`, which turns that case into [`UserConfigInstall::AlreadyPresent`]
/// rather than an overwrite.
pub fn install_user_config(source: &Path, home: &Path) -> Result<UserConfigInstall> {
    let dest = home.join(USER_CONFIG_FILE_NAME);

    if dest.exists() {
        tracing::debug!("{} exists, leaving it alone", dest.display());
        return Ok(UserConfigInstall::AlreadyPresent(dest));
    }

    if !home.is_dir() {
        bail!("home directory does not exist: {}", home.display());
    }

    let mut reader = std::fs::File::open(source)
        .with_context(|| format!("failed to open {}", source.display()))?;

    let mut writer = match OpenOptions::new().write(true).create_new(true).open(&dest) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!("{} appeared during install, leaving it alone", dest.display());
            return Ok(UserConfigInstall::AlreadyPresent(dest));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create {}", dest.display()));
        }
    };

    if let Err(e) = io::copy(&mut reader, &mut writer) {
        // A partial file would read as AlreadyPresent on every later run
        drop(writer);
        if let Err(rm) = std::fs::remove_file(&dest) {
            tracing::warn!("failed to remove partial {}: {}", dest.display(), rm);
        }
        return Err(e).with_context(|| {
            format!("failed to copy {} to {}", source.display(), dest.display())
        });
    }

    Ok(UserConfigInstall::Installed(dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingSource;

    impl PluginDirSource for FailingSource {
        fn plugin_dir(&self) -> Result<String> {
            bail!("OGRE not installed")
        }
    }

    #[test]
    fn test_render_exact_layout() {
        let xml = render_runtime_config("/usr/local", "/usr/lib/OGRE");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n\
             <gazeborc>\n\
             \x20 <gazeboPath>/usr/local/share/gazebo</gazeboPath>\n\
             \x20 <ogrePath>/usr/lib/OGRE</ogrePath>\n\
             </gazeborc>\n"
        );
        assert_eq!(xml.lines().count(), 5);
    }

    #[test]
    fn test_gazebo_path_ignores_plugin_dir() {
        for plugin_dir in ["", "/usr/lib/OGRE", "not/a/real/path", "<odd>"] {
            let xml = render_runtime_config("/opt/gz", plugin_dir);
            assert!(xml.contains("<gazeboPath>/opt/gz/share/gazebo</gazeboPath>"));
            assert!(xml.contains(&format!("<ogrePath>{}</ogrePath>", plugin_dir)));
        }
    }

    #[test]
    fn test_generate_installs_when_absent() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        std::fs::create_dir(&home).unwrap();
        let target = tmp.path().join("build/gazeborc");

        let outcome = generate_runtime_config(
            &target,
            "/usr/local",
            &FixedPluginDir("/usr/lib/OGRE".to_string()),
            &home,
        )
        .unwrap();

        let dest = home.join(".gazeborc");
        assert_eq!(outcome, UserConfigInstall::Installed(dest.clone()));
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            std::fs::read_to_string(&target).unwrap()
        );
    }

    #[test]
    fn test_generate_never_overwrites_user_config() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().to_path_buf();
        let dest = home.join(".gazeborc");
        std::fs::write(&dest, "sentinel").unwrap();
        let target = tmp.path().join("gazeborc");

        let outcome = generate_runtime_config(
            &target,
            "/usr",
            &FixedPluginDir("/usr/lib/OGRE".to_string()),
            &home,
        )
        .unwrap();

        assert_eq!(outcome, UserConfigInstall::AlreadyPresent(dest.clone()));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "sentinel");
        // The build-tree copy is still regenerated
        assert!(std::fs::read_to_string(&target).unwrap().contains("/usr/share/gazebo"));
    }

    #[test]
    fn test_query_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("gazeborc");

        let err = generate_runtime_config(&target, "/usr", &FailingSource, tmp.path()).unwrap_err();

        assert!(err.to_string().contains("OGRE"));
        assert!(!target.exists());
        assert!(!tmp.path().join(".gazeborc").exists());
    }

    #[test]
    fn test_missing_home_is_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("gazeborc");
        std::fs::write(&source, "x").unwrap();

        let result = install_user_config(&source, &tmp.path().join("no-such-home"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_leaves_no_user_config() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        std::fs::create_dir(&home).unwrap();
        // Opens fine, but reading a directory fails
        let unreadable = tmp.path().join("gazeborc.d");
        std::fs::create_dir(&unreadable).unwrap();

        assert!(install_user_config(&unreadable, &home).is_err());
        assert!(!home.join(".gazeborc").exists());

        let good = tmp.path().join("gazeborc");
        std::fs::write(&good, "<gazeborc/>\n").unwrap();
        let outcome = install_user_config(&good, &home).unwrap();

        assert_eq!(outcome, UserConfigInstall::Installed(home.join(".gazeborc")));
        assert_eq!(
            std::fs::read_to_string(home.join(".gazeborc")).unwrap(),
            "<gazeborc/>\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_pkg_config_query_uses_stdout_verbatim() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let tool = tmp.path().join("fake-pkg-config");
        std::fs::write(
            &tool,
            "#!/bin/sh\n\
             [ \"$1\" = \"--variable=plugindir\" ] && [ \"$2\" = \"OGRE\" ] || exit 1\n\
             echo '/opt/ogre/lib/OGRE'\n",
        )
        .unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let dir = PkgConfigQuery::new(&tool, "OGRE").plugin_dir().unwrap();
        assert_eq!(dir, "/opt/ogre/lib/OGRE");

        let err = PkgConfigQuery::new(&tool, "CEGUI").plugin_dir().unwrap_err();
        assert!(format!("{:#}", err).contains("CEGUI"));
    }
}
