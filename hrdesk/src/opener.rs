//! Opening generated documents with the desktop's default application.
//!
//! Workflows never open files themselves; they return the path and the front end
//! decides whether to hand it to a [`FileOpener`].

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::Error;

#[async_trait]
pub trait FileOpener: Send + Sync {
    async fn open(&self, path: &Path) -> Result<(), Error>;
}

/// Delegates to the operating system's file association handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellOpener;

impl ShellOpener {
    fn command(path: &Path) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg("start").arg("").arg(path);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

#[async_trait]
impl FileOpener for ShellOpener {
    async fn open(&self, path: &Path) -> Result<(), Error> {
        log::debug!("opening {}", path.display());
        let status = Self::command(path).status().await?;
        if !status.success() {
            log::warn!("file opener exited with {} for {}", status, path.display());
        }
        Ok(())
    }
}
