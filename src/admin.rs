//! Optional "open the broker admin console" action.
//!
//! Best effort: failures are logged and never affect the run. The opener
//! process is reaped by a background task.

use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Ask the desktop to open `url` in a browser.
///
/// Must be called from within the tokio runtime.
pub fn open_admin_console(url: &str) {
    match launch(opener_command(url)) {
        Ok(_) => info!(url, "Opened broker admin console"),
        Err(e) => warn!(url, error = %e, "Could not open broker admin console"),
    }
}

/// Spawn `cmd` and wait on it in the background.
fn launch(mut cmd: Command) -> std::io::Result<JoinHandle<()>> {
    let mut child = cmd.spawn()?;
    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if !status.success() => debug!(%status, "Browser opener exited"),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Could not wait on browser opener"),
        }
    }))
}

/// Platform command that opens `url` with the default handler.
fn opener_command(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    }
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}
