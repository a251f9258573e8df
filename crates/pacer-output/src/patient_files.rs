//! Per-patient JSON documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pacer_model::PatientGroup;
use tracing::{info, info_span, warn};

/// File stem for a registration identifier.
///
/// Keeps alphanumeric characters (any script), space, period and
/// underscore, then trims.
pub fn safe_file_stem(registration_id: &str) -> String {
    registration_id
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Write `{stem}.json` for every patient into `dir`.
///
/// Returns the written paths in identifier order.
pub fn write_patient_files(
    dir: &Path,
    groups: &BTreeMap<String, PatientGroup>,
) -> Result<Vec<PathBuf>> {
    let span = info_span!("output", dir = %dir.display());
    let _guard = span.enter();

    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output directory {}", dir.display()))?;

    let mut written: Vec<PathBuf> = Vec::with_capacity(groups.len());
    for group in groups.values() {
        let path = dir.join(format!("{}.json", safe_file_stem(&group.registration_id)));
        if written.contains(&path) {
            warn!(
                file = %path.display(),
                "registration identifiers collide after sanitising; later patient overwrites"
            );
        }
        let json = serde_json::to_string_pretty(group).context("serialize patient document")?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }

    info!(count = written.len(), "patient files written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_stem_drops_path_characters() {
        assert_eq!(safe_file_stem("0001"), "0001");
        assert_eq!(safe_file_stem(" ../病案/0002 "), "..病案0002");
        assert_eq!(safe_file_stem("A-12_3.4"), "A12_3.4");
        assert_eq!(safe_file_stem("///"), "");
    }
}
