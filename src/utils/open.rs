// Open a report artifact with the platform's default handler

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(windows) {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

/// Launch the default viewer for `path`. Does not wait for it to exit.
pub fn open_artifact(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Report file does not exist: {}", path.display());
    }

    let (program, args) = opener();
    Command::new(program)
        .args(args)
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to launch '{}'", program))?;

    Ok(())
}
