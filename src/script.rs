//! Batch loading of script files.
//!
//! A script is translated as one buffer, so multi-line brackets, strings and indented
//! suites behave exactly as when typed at the console.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a script file into memory, dropping a leading byte order mark.
pub fn read_script(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    debug!(path = %path.display(), bytes = source.len(), "read script");
    Ok(match source.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_script_strips_bom() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bom.py");
        fs::write(&path, "\u{feff}pos x 1\n")?;
        assert_eq!(read_script(&path)?, "pos x 1\n");
        Ok(())
    }

    #[test]
    fn test_read_script_missing_file_has_context() {
        let err = read_script(Path::new("/nonexistent/run.py")).unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to read script /nonexistent/run.py"));
    }
}
