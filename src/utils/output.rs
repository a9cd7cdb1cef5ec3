use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::compile::Artifacts;

/// Write every artifact into `dir`, creating it if needed.
///
/// Callers only get here with a complete [`Artifacts`], so a failed compile
/// never leaves partial output behind.
pub fn write_artifacts(artifacts: &Artifacts, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .context(format!("Failed to create output directory: {}", dir.display()))?;

    for (name, content) in artifacts.files() {
        let path = dir.join(name);
        fs::write(&path, content)
            .context(format!("Failed to write artifact: {}", path.display()))?;
        info!("Wrote {} ({} bytes)", path.display(), content.len());
    }
    Ok(())
}
