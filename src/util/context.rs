//! Global context for gzbuild operations.
//!
//! Provides centralized access to the project root, the user's home
//! directory and the loaded project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{Config, CONFIG_FILE_NAME};

/// File name of the per-user runtime configuration.
pub const USER_CONFIG_FILE_NAME: &str = ".gazeborc";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Project root (current working directory unless overridden)
    cwd: PathBuf,

    /// User home directory
    home: Option<PathBuf>,

    /// Project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::with_cwd(cwd)
    }

    /// Create a GlobalContext with a specific project root.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let config = Config::load_or_default(&cwd.join(CONFIG_FILE_NAME))?;

        Ok(GlobalContext {
            cwd,
            home: home_dir(),
            config,
        })
    }

    /// Override the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = Some(home);
        self
    }

    /// Get the project root.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the user's home directory.
    pub fn home(&self) -> Result<&Path> {
        self.home
            .as_deref()
            .context("could not determine home directory (is $HOME set?)")
    }

    /// Get the project configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a possibly relative path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Resolve the home directory: `$HOME` first, then the platform lookup.
pub fn home_dir() -> Option<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .unwrap()
            .with_home(home.clone());

        assert_eq!(ctx.cwd(), tmp.path());
        assert_eq!(ctx.home().unwrap(), home.as_path());
        assert_eq!(ctx.resolve(Path::new("gazebo.pc")), tmp.path().join("gazebo.pc"));
        assert_eq!(ctx.resolve(Path::new("/abs/gazebo.pc")), PathBuf::from("/abs/gazebo.pc"));
    }

    #[test]
    fn test_context_loads_project_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[package]\nversion = \"0.9\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert_eq!(ctx.config().version(), "0.9");
    }
}
