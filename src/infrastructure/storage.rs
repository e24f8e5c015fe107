use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::onboarding::DatasetNaming;
use crate::domain::template::GeneratedScripts;

/// Write each non-empty script as `<dir>/<source>_<dataset>_<kind>.sql`
pub fn save_scripts(
    dir: &Path,
    naming: &DatasetNaming,
    scripts: &GeneratedScripts,
) -> std::io::Result<Vec<PathBuf>> {
    ensure_dir(dir)?;

    let mut written = Vec::new();
    for (kind, script) in scripts.iter() {
        let path = dir.join(naming.script_file_name(kind));
        if script.is_empty() {
            warn!(path = %path.display(), "Skipped empty script");
            continue;
        }
        fs::write(&path, script)?;
        info!(path = %path.display(), "Saved script");
        written.push(path);
    }
    Ok(written)
}

pub fn write_archive(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, bytes)
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_scripts_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("temp");
        let scripts = GeneratedScripts {
            land: "CREATE TABLE land.a_b_t (\nx VARCHAR(255)\n);".to_string(),
            stage: String::new(),
            rds: "-- No data to insert into app_mgmt.x".to_string(),
        };

        let written = save_scripts(&out, &DatasetNaming::new("a", "b"), &scripts).unwrap();

        assert_eq!(written.len(), 2);
        assert!(out.join("a_b_land.sql").exists());
        assert!(!out.join("a_b_stage.sql").exists());
        assert_eq!(
            fs::read_to_string(out.join("a_b_rds.sql")).unwrap(),
            scripts.rds
        );
    }
}
