// ============================================================================
// SHELL — reveal folders with the OS file manager
// ============================================================================

use std::path::Path;

/// Open `dir` in the platform file manager (output folder, log folder).
pub fn open_folder(dir: &Path) -> Result<(), String> {
    open_with_os(dir).map_err(|e| format!("Failed to open {}: {}", dir.display(), e))
}

#[cfg(target_os = "windows")]
fn open_with_os(path: &Path) -> std::io::Result<()> {
    std::process::Command::new("explorer").arg(path).spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn open_with_os(path: &Path) -> std::io::Result<()> {
    std::process::Command::new("open").arg(path).spawn()?;
    Ok(())
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_with_os(path: &Path) -> std::io::Result<()> {
    std::process::Command::new("xdg-open").arg(path).spawn()?;
    Ok(())
}
