use crate::error::Error;
use std::process::Command;
use tracing::debug;

/// Command that hands `target` (a magnet URI or a file path) to the OS default handler.
pub fn opener_command(target: &str) -> Command {
    let mut command = if cfg!(target_os = "windows") {
        // explorer resolves protocol handlers without a shell, so '&' in magnets is safe.
        Command::new("explorer")
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command.arg(target);
    command
}

/// Open a magnet URI or saved torrent file in the user's torrent client.
pub fn open_with_default_handler(target: &str) -> crate::Result<()> {
    let mut command = opener_command(target);
    debug!("Running {:?}", command);

    let io_error = |source| Error::Io {
        operation: "open",
        path: target.to_string(),
        source,
    };

    let status = command.status().map_err(io_error)?;

    // explorer exits non-zero even when it succeeds.
    if !status.success() && !cfg!(target_os = "windows") {
        return Err(io_error(std::io::Error::other(format!(
            "{:?} exited with {}",
            command.get_program(),
            status
        ))));
    }

    Ok(())
}
