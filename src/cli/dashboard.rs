use std::{path::Path, process::Stdio};

use anyhow::{bail, Result};
use tracing::{debug, warn};

/// Opens a local file in whatever the desktop considers the default browser.
#[cfg_attr(test, mockall::automock)]
pub trait BrowserLauncher {
    fn open(&self, target: &Path) -> Result<()>;
}

/// Launches through `open` on macOS, `cmd /C start` on Windows and `xdg-open` elsewhere.
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, target: &Path) -> Result<()> {
        let mut command = {
            #[cfg(target_os = "macos")]
            {
                std::process::Command::new("open")
            }
            #[cfg(windows)]
            {
                let mut command = std::process::Command::new("cmd");
                command.args(["/C", "start", ""]);
                command
            }
            #[cfg(not(any(target_os = "macos", windows)))]
            {
                std::process::Command::new("xdg-open")
            }
        };
        command.arg(target);
        command.stdin(Stdio::null());
        command.stdout(Stdio::null());
        command.stderr(Stdio::null());

        debug!("Launching {command:?}");
        let status = command.status()?;
        if !status.success() {
            bail!("Browser launcher exited with {status}");
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DashboardOutcome {
    Opened,
    Missing,
    LaunchFailed,
}

/// Best effort: a missing page or a failing launcher is reported, never an error.
pub fn open_dashboard(path: &Path, launcher: &dyn BrowserLauncher) -> DashboardOutcome {
    if !path.exists() {
        warn!("Dashboard {path:?} doesn't exist");
        println!("Dashboard not found at {}", path.display());
        return DashboardOutcome::Missing;
    }

    match launcher.open(path) {
        Ok(()) => {
            println!("Opened {}", path.display());
            DashboardOutcome::Opened
        }
        Err(e) => {
            warn!("Failed to open dashboard {path:?}: {e:?}");
            println!("Couldn't launch a browser, open {} manually", path.display());
            DashboardOutcome::LaunchFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use tempfile::tempdir;

    use super::{open_dashboard, DashboardOutcome, MockBrowserLauncher};

    #[test]
    fn test_opens_existing_dashboard() -> Result<()> {
        let dir = tempdir()?;
        let page = dir.path().join("index.html");
        std::fs::write(&page, "<html></html>")?;

        let mut launcher = MockBrowserLauncher::new();
        let expected = page.clone();
        launcher
            .expect_open()
            .withf(move |target| target.to_path_buf() == expected)
            .times(1)
            .returning(|_| Ok(()));

        assert_eq!(open_dashboard(&page, &launcher), DashboardOutcome::Opened);
        Ok(())
    }

    #[test]
    fn test_missing_dashboard_skips_launcher() -> Result<()> {
        let dir = tempdir()?;
        let mut launcher = MockBrowserLauncher::new();
        launcher.expect_open().times(0);

        assert_eq!(
            open_dashboard(&dir.path().join("index.html"), &launcher),
            DashboardOutcome::Missing
        );
        Ok(())
    }

    #[test]
    fn test_launch_failure_is_not_fatal() -> Result<()> {
        let dir = tempdir()?;
        let page = dir.path().join("index.html");
        std::fs::write(&page, "<html></html>")?;

        let mut launcher = MockBrowserLauncher::new();
        launcher
            .expect_open()
            .returning(|_| Err(anyhow!("no display")));

        assert_eq!(open_dashboard(&page, &launcher), DashboardOutcome::LaunchFailed);
        Ok(())
    }
}
